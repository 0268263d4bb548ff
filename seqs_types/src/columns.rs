use strum_macros::{Display, EnumIter, EnumString};

/// Columns of the canonical registry table. `Display`/`FromStr` round-trip
/// through the exact header strings used in saved files.
#[derive(Display, EnumString, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    #[strum(to_string = "ID")]
    Id,
    #[strum(to_string = "Patient ID")]
    PatientId,
    #[strum(to_string = "Patient Sequencing Number")]
    PatientSequencingNumber,
    #[strum(to_string = "Import Date")]
    ImportDate,
    #[strum(to_string = "Hospital Research Center")]
    HospitalResearchCenter,
    #[strum(to_string = "Lab")]
    Lab,
    #[strum(to_string = "Lab Patient ID")]
    LabPatientId,
    #[strum(to_string = "Lab Sample ID")]
    LabSampleId,
    #[strum(to_string = "Cancer Type")]
    CancerType,
    #[strum(to_string = "Tissue Type")]
    TissueType,
    #[strum(to_string = "Sequencing Type")]
    SequencingType,
    #[strum(to_string = "Vial")]
    Vial,
    #[strum(to_string = "Vial Sequencing Number")]
    VialSequencingNumber,
    #[strum(to_string = "Sequencing Batch ID")]
    SequencingBatchId,
}

/// Column order of the full registry table, as loaded and saved.
pub const REGISTRY_SCHEMA: [Column; 14] = [
    Column::Id,
    Column::PatientId,
    Column::PatientSequencingNumber,
    Column::ImportDate,
    Column::HospitalResearchCenter,
    Column::Lab,
    Column::LabPatientId,
    Column::LabSampleId,
    Column::CancerType,
    Column::TissueType,
    Column::SequencingType,
    Column::Vial,
    Column::VialSequencingNumber,
    Column::SequencingBatchId,
];

/// Column order of a patient sample sheet accepted for import.
pub const IMPORT_SCHEMA: [Column; 9] = [
    Column::HospitalResearchCenter,
    Column::Lab,
    Column::LabPatientId,
    Column::LabSampleId,
    Column::CancerType,
    Column::TissueType,
    Column::SequencingType,
    Column::Vial,
    Column::VialSequencingNumber,
];

/// Header strings for a schema, in schema order.
pub fn schema_headers(schema: &[Column]) -> Vec<String> {
    schema.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn header_strings_round_trip() {
        for column in REGISTRY_SCHEMA {
            assert_eq!(Column::from_str(&column.to_string()).unwrap(), column);
        }
    }

    #[test]
    fn import_schema_is_a_subset_of_the_registry_schema() {
        for column in IMPORT_SCHEMA {
            assert!(REGISTRY_SCHEMA.contains(&column));
        }
    }
}
