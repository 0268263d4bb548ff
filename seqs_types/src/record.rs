use crate::columns::{Column, IMPORT_SCHEMA, REGISTRY_SCHEMA};
use crate::errors::ValidationError;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the registry: a single physical specimen's metadata plus its
/// generated ID. Field order mirrors `REGISTRY_SCHEMA`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SampleRecord {
    pub id: String,
    pub patient_id: u32,
    pub patient_sequencing_number: u32,
    pub import_date: NaiveDate,
    pub hospital_research_center: String,
    pub lab: String,
    pub lab_patient_id: String,
    pub lab_sample_id: String,
    pub cancer_type: String,
    pub tissue_type: String,
    pub sequencing_type: String,
    pub vial: String,
    pub vial_sequencing_number: u32,
    pub sequencing_batch_id: String,
}

impl SampleRecord {
    /// Parse one row of cells in `REGISTRY_SCHEMA` order into a typed record.
    pub fn from_cells(cells: &[String]) -> Result<SampleRecord> {
        let [id, patient_id, patient_sequencing_number, import_date, hospital_research_center, lab, lab_patient_id, lab_sample_id, cancer_type, tissue_type, sequencing_type, vial, vial_sequencing_number, sequencing_batch_id] =
            cells
        else {
            bail!(
                "expected {} cells in a registry row, got {}",
                REGISTRY_SCHEMA.len(),
                cells.len()
            );
        };
        Ok(SampleRecord {
            id: id.clone(),
            patient_id: parse_u32(Column::PatientId, patient_id)?,
            patient_sequencing_number: parse_u32(
                Column::PatientSequencingNumber,
                patient_sequencing_number,
            )?,
            import_date: parse_date(Column::ImportDate, import_date)?,
            hospital_research_center: hospital_research_center.clone(),
            lab: lab.clone(),
            lab_patient_id: lab_patient_id.clone(),
            lab_sample_id: lab_sample_id.clone(),
            cancer_type: cancer_type.clone(),
            tissue_type: tissue_type.clone(),
            sequencing_type: sequencing_type.clone(),
            vial: vial.clone(),
            vial_sequencing_number: parse_u32(
                Column::VialSequencingNumber,
                vial_sequencing_number,
            )?,
            sequencing_batch_id: sequencing_batch_id.clone(),
        })
    }

    /// Render the record back into cells, in `REGISTRY_SCHEMA` order.
    pub fn to_cells(&self) -> Vec<String> {
        REGISTRY_SCHEMA.iter().map(|&c| self.get(c)).collect()
    }

    /// The cell value for `column`, rendered as a string.
    pub fn get(&self, column: Column) -> String {
        match column {
            Column::Id => self.id.clone(),
            Column::PatientId => self.patient_id.to_string(),
            Column::PatientSequencingNumber => self.patient_sequencing_number.to_string(),
            Column::ImportDate => self.import_date.to_string(),
            Column::HospitalResearchCenter => self.hospital_research_center.clone(),
            Column::Lab => self.lab.clone(),
            Column::LabPatientId => self.lab_patient_id.clone(),
            Column::LabSampleId => self.lab_sample_id.clone(),
            Column::CancerType => self.cancer_type.clone(),
            Column::TissueType => self.tissue_type.clone(),
            Column::SequencingType => self.sequencing_type.clone(),
            Column::Vial => self.vial.clone(),
            Column::VialSequencingNumber => self.vial_sequencing_number.to_string(),
            Column::SequencingBatchId => self.sequencing_batch_id.clone(),
        }
    }

    /// Set the cell for `column` from a string, enforcing the column's type.
    pub fn set(&mut self, column: Column, value: &str) -> Result<()> {
        match column {
            Column::Id => self.id = value.to_string(),
            Column::PatientId => self.patient_id = parse_u32(column, value)?,
            Column::PatientSequencingNumber => {
                self.patient_sequencing_number = parse_u32(column, value)?;
            }
            Column::ImportDate => self.import_date = parse_date(column, value)?,
            Column::HospitalResearchCenter => self.hospital_research_center = value.to_string(),
            Column::Lab => self.lab = value.to_string(),
            Column::LabPatientId => self.lab_patient_id = value.to_string(),
            Column::LabSampleId => self.lab_sample_id = value.to_string(),
            Column::CancerType => self.cancer_type = value.to_string(),
            Column::TissueType => self.tissue_type = value.to_string(),
            Column::SequencingType => self.sequencing_type = value.to_string(),
            Column::Vial => self.vial = value.to_string(),
            Column::VialSequencingNumber => self.vial_sequencing_number = parse_u32(column, value)?,
            Column::SequencingBatchId => self.sequencing_batch_id = value.to_string(),
        }
        Ok(())
    }

    /// Ordering of two records by one column, typed: numeric columns compare
    /// numerically, the date column by date, everything else as strings.
    pub fn cmp_by_column(&self, other: &SampleRecord, column: Column) -> Ordering {
        match column {
            Column::PatientId => self.patient_id.cmp(&other.patient_id),
            Column::PatientSequencingNumber => self
                .patient_sequencing_number
                .cmp(&other.patient_sequencing_number),
            Column::VialSequencingNumber => self
                .vial_sequencing_number
                .cmp(&other.vial_sequencing_number),
            Column::ImportDate => self.import_date.cmp(&other.import_date),
            _ => self.get(column).cmp(&other.get(column)),
        }
    }
}

/// One row of a patient sample sheet, validated at construction: every
/// import-schema field must be non-blank, and the vial sequencing number is
/// coerced from the integer-valued floats upstream tools like to emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRecord {
    pub hospital_research_center: String,
    pub lab: String,
    pub lab_patient_id: String,
    pub lab_sample_id: String,
    pub cancer_type: String,
    pub tissue_type: String,
    pub sequencing_type: String,
    pub vial: String,
    pub vial_sequencing_number: u32,
}

impl ImportRecord {
    /// Parse one row of cells in `IMPORT_SCHEMA` order.
    pub fn from_cells(cells: &[String]) -> Result<ImportRecord> {
        let [hospital_research_center, lab, lab_patient_id, lab_sample_id, cancer_type, tissue_type, sequencing_type, vial, vial_sequencing_number] =
            cells
        else {
            bail!(
                "expected {} cells in a sample sheet row, got {}",
                IMPORT_SCHEMA.len(),
                cells.len()
            );
        };

        for (column, value) in IMPORT_SCHEMA.iter().zip(cells) {
            if value.trim().is_empty() {
                return Err(ValidationError {
                    lab_sample_id: lab_sample_id.clone(),
                    field: column.to_string(),
                }
                .into());
            }
        }

        let Some(vial_sequencing_number) = parse_int_like(vial_sequencing_number) else {
            bail!(
                "Lab Sample ID \"{lab_sample_id}\": \"{}\" is not an integer \
                 Vial Sequencing Number",
                vial_sequencing_number
            );
        };

        Ok(ImportRecord {
            hospital_research_center: hospital_research_center.clone(),
            lab: lab.clone(),
            lab_patient_id: lab_patient_id.clone(),
            lab_sample_id: lab_sample_id.clone(),
            cancer_type: cancer_type.clone(),
            tissue_type: tissue_type.clone(),
            sequencing_type: sequencing_type.clone(),
            vial: vial.clone(),
            vial_sequencing_number,
        })
    }

    /// Promote to a full registry record once identity has been resolved and
    /// an ID encoded.
    pub fn into_sample_record(
        self,
        id: String,
        patient_id: u32,
        patient_sequencing_number: u32,
        import_date: NaiveDate,
    ) -> SampleRecord {
        SampleRecord {
            id,
            patient_id,
            patient_sequencing_number,
            import_date,
            hospital_research_center: self.hospital_research_center,
            lab: self.lab,
            lab_patient_id: self.lab_patient_id,
            lab_sample_id: self.lab_sample_id,
            cancer_type: self.cancer_type,
            tissue_type: self.tissue_type,
            sequencing_type: self.sequencing_type,
            vial: self.vial,
            vial_sequencing_number: self.vial_sequencing_number,
            sequencing_batch_id: String::new(),
        }
    }
}

fn parse_u32(column: Column, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("cannot parse \"{value}\" as an integer for column \"{column}\""),
    }
}

fn parse_date(column: Column, value: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(_) => bail!("cannot parse \"{value}\" as a date for column \"{column}\""),
    }
}

/// Accept "3" or "3.0" but not "3.5". Nullable numeric columns round-trip
/// through floats in some upstream spreadsheet tools.
fn parse_int_like(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(v) = value.parse::<u32>() {
        return Some(v);
    }
    let f = value.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import_cells() -> Vec<String> {
        [
            "Taipei Veterans General Hospital",
            "Lin Lab",
            "P001",
            "S001",
            "HNSCC",
            "Normal",
            "WES",
            "X",
            "1",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    #[test]
    fn import_record_parses_float_vial_sequencing_number() {
        let mut cells = import_cells();
        cells[8] = "2.0".to_string();
        let record = ImportRecord::from_cells(&cells).unwrap();
        assert_eq!(record.vial_sequencing_number, 2);
    }

    #[test]
    fn import_record_rejects_fractional_vial_sequencing_number() {
        let mut cells = import_cells();
        cells[8] = "2.5".to_string();
        assert!(ImportRecord::from_cells(&cells).is_err());
    }

    #[test]
    fn blank_field_names_column_and_lab_sample_id() {
        let mut cells = import_cells();
        cells[5] = "  ".to_string();
        let err = ImportRecord::from_cells(&cells).unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.field, "Tissue Type");
        assert_eq!(validation.lab_sample_id, "S001");
        assert_eq!(
            err.to_string(),
            "Lab Sample ID \"S001\": \"Tissue Type\" is empty."
        );
    }

    #[test]
    fn sample_record_cells_round_trip() {
        let cells: Vec<String> = [
            "001-00001-0101-E-X01-01",
            "1",
            "1",
            "2023-06-21",
            "Taipei Veterans General Hospital",
            "Lin Lab",
            "P001",
            "S001",
            "HNSCC",
            "Normal",
            "WES",
            "X",
            "1",
            "BATCH-1",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let record = SampleRecord::from_cells(&cells).unwrap();
        assert_eq!(record.patient_id, 1);
        assert_eq!(record.import_date.to_string(), "2023-06-21");
        assert_eq!(record.to_cells(), cells);
    }

    #[test]
    fn set_enforces_column_types() {
        let cells: Vec<String> = [
            "001-00001-0101-E-X01-01",
            "1",
            "1",
            "2023-06-21",
            "Taipei Veterans General Hospital",
            "Lin Lab",
            "P001",
            "S001",
            "HNSCC",
            "Normal",
            "WES",
            "X",
            "1",
            "",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let mut record = SampleRecord::from_cells(&cells).unwrap();
        record.set(Column::SequencingBatchId, "BATCH-9").unwrap();
        assert_eq!(record.sequencing_batch_id, "BATCH-9");
        assert!(record.set(Column::PatientId, "not a number").is_err());
    }
}
