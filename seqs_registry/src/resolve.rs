use seqs_types::{ImportRecord, SampleRecord};

/// Patient identity and accession rank assigned to one incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub patient_id: u32,
    pub patient_sequencing_number: u32,
}

/// Decide how an incoming record relates to the registry as it stands.
///
/// Returns `None` when the `(Lab, Lab Patient ID, Lab Sample ID)` triple
/// already exists — the caller must skip the row, this is deliberate
/// de-duplication, not an error. Otherwise the patient keeps their existing
/// `Patient ID` (same `(Lab, Lab Patient ID)` pair) or receives `max + 1`,
/// and the sequencing number is the 1-based accession rank within that
/// patient.
pub fn resolve(records: &[SampleRecord], incoming: &ImportRecord) -> Option<ResolvedIdentity> {
    let same_patient = |r: &&SampleRecord| {
        r.lab == incoming.lab && r.lab_patient_id == incoming.lab_patient_id
    };

    let existing_sample = records
        .iter()
        .filter(same_patient)
        .any(|r| r.lab_sample_id == incoming.lab_sample_id);
    if existing_sample {
        return None;
    }

    let patient_id = match records.iter().find(same_patient) {
        Some(r) => r.patient_id,
        None => records
            .iter()
            .map(|r| r.patient_id)
            .max()
            .map_or(1, |max| max + 1),
    };

    let patient_sequencing_number = records
        .iter()
        .filter(|r| r.patient_id == patient_id)
        .count() as u32
        + 1;

    Some(ResolvedIdentity {
        patient_id,
        patient_sequencing_number,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn record(lab: &str, lab_patient_id: &str, lab_sample_id: &str, patient_id: u32) -> SampleRecord {
        SampleRecord {
            id: format!("001-{patient_id:05}-0101-E-X01-01"),
            patient_id,
            patient_sequencing_number: 1,
            import_date: NaiveDate::from_ymd_opt(2023, 6, 21).unwrap(),
            hospital_research_center: "Taipei Veterans General Hospital".to_string(),
            lab: lab.to_string(),
            lab_patient_id: lab_patient_id.to_string(),
            lab_sample_id: lab_sample_id.to_string(),
            cancer_type: "HNSCC".to_string(),
            tissue_type: "Normal".to_string(),
            sequencing_type: "WES".to_string(),
            vial: "X".to_string(),
            vial_sequencing_number: 1,
            sequencing_batch_id: String::new(),
        }
    }

    fn incoming(lab: &str, lab_patient_id: &str, lab_sample_id: &str) -> ImportRecord {
        ImportRecord {
            hospital_research_center: "Taipei Veterans General Hospital".to_string(),
            lab: lab.to_string(),
            lab_patient_id: lab_patient_id.to_string(),
            lab_sample_id: lab_sample_id.to_string(),
            cancer_type: "HNSCC".to_string(),
            tissue_type: "Normal".to_string(),
            sequencing_type: "WES".to_string(),
            vial: "X".to_string(),
            vial_sequencing_number: 1,
        }
    }

    #[test]
    fn empty_registry_starts_at_patient_one() {
        let identity = resolve(&[], &incoming("Lin Lab", "P1", "S1")).unwrap();
        assert_eq!(identity.patient_id, 1);
        assert_eq!(identity.patient_sequencing_number, 1);
    }

    #[test]
    fn existing_patient_keeps_its_id_and_increments_rank() {
        let records = vec![record("Lin Lab", "P1", "S1", 1)];
        let identity = resolve(&records, &incoming("Lin Lab", "P1", "S2")).unwrap();
        assert_eq!(identity.patient_id, 1);
        assert_eq!(identity.patient_sequencing_number, 2);
    }

    #[test]
    fn new_patient_gets_max_plus_one() {
        let records = vec![
            record("Lin Lab", "P1", "S1", 1),
            record("Lin Lab", "P7", "S2", 7),
        ];
        let identity = resolve(&records, &incoming("Lin Lab", "P9", "S3")).unwrap();
        assert_eq!(identity.patient_id, 8);
        assert_eq!(identity.patient_sequencing_number, 1);
    }

    #[test]
    fn duplicate_sample_triple_is_skipped() {
        let records = vec![record("Lin Lab", "P1", "S1", 1)];
        assert_eq!(resolve(&records, &incoming("Lin Lab", "P1", "S1")), None);
    }

    #[test]
    fn same_lab_sample_id_in_another_lab_is_a_different_sample() {
        let records = vec![record("Lin Lab", "P1", "S1", 1)];
        let identity = resolve(&records, &incoming("Wu Lab", "P1", "S1")).unwrap();
        assert_eq!(identity.patient_id, 2);
    }
}
