use anyhow::Result;
use seqs_types::{
    cancer_type_code, hospital_research_center_code, sequencing_type_code, tissue_type_code,
    ImportRecord,
};

/// Encode the structured sample ID for one incoming record.
///
/// Layout, hyphen-delimited and human-decodable:
/// `{hospital:3}-{patient_id:05}-{cancer:2}{tissue:2}-{assay:1}-{vial}{vial_seq:02}-{patient_seq:02}`
/// e.g. `001-00001-0102-E-X01-02`. The encoding is deterministic; any
/// category value without a code mapping is an `UnknownCategory` error.
pub fn encode_sample_id(
    incoming: &ImportRecord,
    patient_id: u32,
    patient_sequencing_number: u32,
) -> Result<String> {
    let hospital = hospital_research_center_code(&incoming.hospital_research_center)?;
    let cancer = cancer_type_code(&incoming.cancer_type)?;
    let tissue = tissue_type_code(&incoming.tissue_type)?;
    let assay = sequencing_type_code(&incoming.sequencing_type)?;
    Ok(format!(
        "{hospital}-{patient_id:05}-{cancer}{tissue}-{assay}-{vial}{vial_seq:02}-{patient_seq:02}",
        vial = incoming.vial,
        vial_seq = incoming.vial_sequencing_number,
        patient_seq = patient_sequencing_number,
    ))
}
