//! Builds tumor/normal run tables: the per-tumor manifest of FASTQ paths,
//! matched normal sample and BED file needed to launch a downstream
//! pipeline.

#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    unused
)]

use anyhow::{Context, Result};
use itertools::Itertools;
use seqs_types::{SampleRecord, NORMAL_TISSUE_CODE, NORMAL_TISSUE_TYPE};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use table_io::{read_table, write_table, Table};
use thiserror::Error;

/// Output columns, one row per tumor sample.
pub const RUN_TABLE_COLUMNS: [&str; 9] = [
    "Tumor Sample Name",
    "Tumor Fastq R1",
    "Tumor Fastq R2",
    "Normal Sample Name",
    "Normal Fastq R1",
    "Normal Fastq R2",
    "Output Name",
    "Sequencing Batch ID",
    "BED File",
];

/// A structurally-guaranteed invariant was violated: one sample ID mapped to
/// more than one Lab Sample ID. This signals corrupted registry data, not a
/// user input error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("ID \"{id}\" maps to more than one Lab Sample ID (\"{first}\", \"{second}\")")]
pub struct IntegrityError {
    pub id: String,
    pub first: String,
    pub second: String,
}

/// Inputs of one run-table build.
pub struct RunTableParams<'a> {
    /// Registry IDs of the rows to include.
    pub selected_ids: &'a [String],
    pub r1_suffix: &'a str,
    pub r2_suffix: &'a str,
    /// Auxiliary table joining `Sequencing Batch ID` to a BED file path.
    pub batch_table_file: &'a Path,
    /// Optional whitespace-delimited list of known-correct FASTQ filenames,
    /// preferred over naive `{id}{suffix}` construction when one matches.
    pub correction_file: Option<&'a Path>,
    /// Name output samples by `Lab Sample ID` instead of registry ID.
    pub use_lab_sample_id: bool,
}

/// A built run table plus the non-fatal warnings collected along the way.
#[derive(Debug)]
pub struct RunTable {
    pub table: Table,
    pub warnings: Vec<String>,
}

/// Build and serialize a run table; returns the collected warnings.
pub fn write_run_table(
    records: &[SampleRecord],
    params: &RunTableParams<'_>,
    output_file: &Path,
) -> Result<Vec<String>> {
    let run_table = build_run_table(records, params)?;
    write_table(output_file, &run_table.table)?;
    Ok(run_table.warnings)
}

/// Build a run table from the registry rows whose ID is selected.
///
/// Tumors are every selected row whose tissue type is not "Normal", in row
/// order. Each patient is represented by their most recently accessioned
/// normal sample (highest `Patient Sequencing Number`, ID as tie-break, so
/// the choice is deterministic). A tumor with no matching normal is still
/// emitted, with blank normal fields. A missing BED file entry is a warning,
/// not an error.
pub fn build_run_table(records: &[SampleRecord], params: &RunTableParams<'_>) -> Result<RunTable> {
    let selected_ids: HashSet<&str> = params.selected_ids.iter().map(String::as_str).collect();
    let selected: Vec<&SampleRecord> = records
        .iter()
        .filter(|r| selected_ids.contains(r.id.as_str()))
        .collect();

    let tumors: Vec<&SampleRecord> = selected
        .iter()
        .copied()
        .filter(|r| r.tissue_type != NORMAL_TISSUE_TYPE)
        .collect();
    let normals: Vec<&SampleRecord> = selected
        .iter()
        .copied()
        .filter(|r| r.tissue_type == NORMAL_TISSUE_TYPE)
        .sorted_by(|a, b| {
            b.patient_sequencing_number
                .cmp(&a.patient_sequencing_number)
                .then_with(|| a.id.cmp(&b.id))
        })
        .unique_by(|r| r.patient_id)
        .collect();

    let bed_by_batch = read_batch_table(params.batch_table_file)?;
    let corrections = params
        .correction_file
        .map(read_correction_list)
        .transpose()?;
    let names = if params.use_lab_sample_id {
        Some(lab_sample_names(&selected)?)
    } else {
        None
    };

    let mut table = Table::new(RUN_TABLE_COLUMNS.iter().map(ToString::to_string).collect());
    let mut warnings = Vec::new();

    for tumor in &tumors {
        let bed_file = match bed_by_batch.get(&tumor.sequencing_batch_id) {
            Some(bed) if !tumor.sequencing_batch_id.is_empty() => bed.clone(),
            _ => {
                let warning = format!("BED file not found for {}", tumor.id);
                log::warn!("{warning}");
                warnings.push(warning);
                String::new()
            }
        };

        let tumor_name = output_name(tumor, names.as_ref());
        let (normal_name, normal_r1, normal_r2) = match matched_normal(tumor, &normals) {
            Some(normal) => {
                let name = output_name(normal, names.as_ref());
                let r1 = fastq_name(&name, params.r1_suffix, corrections.as_deref());
                let r2 = fastq_name(&name, params.r2_suffix, corrections.as_deref());
                (name, r1, r2)
            }
            None => (String::new(), String::new(), String::new()),
        };

        table.push_row(vec![
            tumor_name.clone(),
            fastq_name(&tumor_name, params.r1_suffix, corrections.as_deref()),
            fastq_name(&tumor_name, params.r2_suffix, corrections.as_deref()),
            normal_name,
            normal_r1,
            normal_r2,
            tumor_name,
            tumor.sequencing_batch_id.clone(),
            bed_file,
        ]);
    }

    Ok(RunTable { table, warnings })
}

/// The normal representing the tumor's patient group: same institution,
/// patient and cancer segments, tissue sub-code forced to the normal code.
fn matched_normal<'a>(
    tumor: &SampleRecord,
    normals: &[&'a SampleRecord],
) -> Option<&'a SampleRecord> {
    // e.g. tumor `001-00001-0102-E-X01-02` matches normals starting with
    // `001-00001-0101`.
    let prefix = format!("{}{NORMAL_TISSUE_CODE}", tumor.id.get(..12)?);
    normals.iter().copied().find(|n| n.id.starts_with(&prefix))
}

fn read_batch_table(path: &Path) -> Result<HashMap<String, String>> {
    let table = read_table(path, ["ID", "BED File"])?;
    Ok(table
        .rows
        .into_iter()
        .map(|row| {
            let [id, bed_file] = <[String; 2]>::try_from(row).unwrap_or_default();
            (id, bed_file)
        })
        .collect())
}

fn read_correction_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).with_context(|| path.display().to_string())?;
    Ok(content.split_whitespace().map(String::from).collect())
}

fn lab_sample_names(selected: &[&SampleRecord]) -> Result<HashMap<String, String>, IntegrityError> {
    let mut names: HashMap<String, String> = HashMap::new();
    for record in selected {
        match names.get(&record.id) {
            Some(existing) if existing != &record.lab_sample_id => {
                return Err(IntegrityError {
                    id: record.id.clone(),
                    first: existing.clone(),
                    second: record.lab_sample_id.clone(),
                });
            }
            Some(_) => {}
            None => {
                names.insert(record.id.clone(), record.lab_sample_id.clone());
            }
        }
    }
    Ok(names)
}

fn output_name(record: &SampleRecord, names: Option<&HashMap<String, String>>) -> String {
    names
        .and_then(|m| m.get(&record.id))
        .cloned()
        .unwrap_or_else(|| record.id.clone())
}

/// Prefer a correction-list entry bracketing the naive name; filenames drift
/// from naive construction when sequencing cores add their own infixes.
fn fastq_name(id: &str, suffix: &str, corrections: Option<&[String]>) -> String {
    if let Some(tokens) = corrections {
        if let Some(hit) = tokens
            .iter()
            .find(|t| t.starts_with(id) && t.ends_with(suffix))
        {
            return hit.clone();
        }
    }
    format!("{id}{suffix}")
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(
        id: &str,
        patient_id: u32,
        patient_sequencing_number: u32,
        tissue_type: &str,
        batch: &str,
    ) -> SampleRecord {
        SampleRecord {
            id: id.to_string(),
            patient_id,
            patient_sequencing_number,
            import_date: NaiveDate::from_ymd_opt(2023, 6, 21).unwrap(),
            hospital_research_center: "Taipei Veterans General Hospital".to_string(),
            lab: "Lin Lab".to_string(),
            lab_patient_id: format!("P{patient_id}"),
            lab_sample_id: format!("LAB-{id}"),
            cancer_type: "HNSCC".to_string(),
            tissue_type: tissue_type.to_string(),
            sequencing_type: "WES".to_string(),
            vial: "X".to_string(),
            vial_sequencing_number: 1,
            sequencing_batch_id: batch.to_string(),
        }
    }

    fn registry() -> Vec<SampleRecord> {
        vec![
            record("001-00001-0101-E-X01-01", 1, 1, "Normal", "B1"),
            record("001-00001-0102-E-X01-02", 1, 2, "Primary", "B1"),
            record("001-00002-0102-E-X01-01", 2, 1, "Primary", "B9"),
        ]
    }

    fn write_batch_table(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("batches.csv");
        std::fs::write(&path, "ID,BED File\nB1,/beds/b1.bed\n").unwrap();
        path
    }

    fn all_ids(records: &[SampleRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn params<'a>(selected_ids: &'a [String], batch_table_file: &'a Path) -> RunTableParams<'a> {
        RunTableParams {
            selected_ids,
            r1_suffix: "_R1.fastq.gz",
            r2_suffix: "_R2.fastq.gz",
            batch_table_file,
            correction_file: None,
            use_lab_sample_id: false,
        }
    }

    #[test]
    fn pairs_each_tumor_with_its_patients_normal() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let run = build_run_table(&records, &params(&selected, &batch_table)).unwrap();

        assert_eq!(run.table.columns, RUN_TABLE_COLUMNS.to_vec());
        assert_eq!(run.table.len(), 2);
        assert_eq!(
            run.table.rows[0],
            vec![
                "001-00001-0102-E-X01-02".to_string(),
                "001-00001-0102-E-X01-02_R1.fastq.gz".to_string(),
                "001-00001-0102-E-X01-02_R2.fastq.gz".to_string(),
                "001-00001-0101-E-X01-01".to_string(),
                "001-00001-0101-E-X01-01_R1.fastq.gz".to_string(),
                "001-00001-0101-E-X01-01_R2.fastq.gz".to_string(),
                "001-00001-0102-E-X01-02".to_string(),
                "B1".to_string(),
                "/beds/b1.bed".to_string(),
            ]
        );
    }

    #[test]
    fn tumor_without_a_normal_is_emitted_with_blank_fields() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let run = build_run_table(&records, &params(&selected, &batch_table)).unwrap();

        // Patient 2 has no normal sample, and batch B9 has no BED entry.
        let row = &run.table.rows[1];
        assert_eq!(row[0], "001-00002-0102-E-X01-01");
        assert_eq!(row[3], "");
        assert_eq!(row[4], "");
        assert_eq!(row[5], "");
        assert_eq!(row[8], "");
        assert_eq!(
            run.warnings,
            vec!["BED file not found for 001-00002-0102-E-X01-01"]
        );
    }

    #[test]
    fn unselected_rows_are_excluded() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = vec!["001-00001-0102-E-X01-02".to_string()];
        let batch_table = write_batch_table(&dir);
        let run = build_run_table(&records, &params(&selected, &batch_table)).unwrap();

        // The matching normal was not selected either, so the tumor is
        // emitted tumor-only.
        assert_eq!(run.table.len(), 1);
        assert_eq!(run.table.rows[0][3], "");
    }

    #[test]
    fn latest_accessioned_normal_represents_the_patient() {
        let dir = TempDir::new().unwrap();
        let mut records = registry();
        records.insert(
            1,
            record("001-00001-0101-E-X02-03", 1, 3, "Normal", "B1"),
        );
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let run = build_run_table(&records, &params(&selected, &batch_table)).unwrap();
        assert_eq!(run.table.rows[0][3], "001-00001-0101-E-X02-03");
    }

    #[test]
    fn correction_list_overrides_naive_fastq_names() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let correction_file = dir.path().join("fastqs.txt");
        std::fs::write(
            &correction_file,
            "001-00001-0102-E-X01-02_S3_L001_R1.fastq.gz\nunrelated_R1.fastq.gz\n",
        )
        .unwrap();

        let mut params = params(&selected, &batch_table);
        params.correction_file = Some(&correction_file);
        let run = build_run_table(&records, &params).unwrap();

        assert_eq!(
            run.table.rows[0][1],
            "001-00001-0102-E-X01-02_S3_L001_R1.fastq.gz"
        );
        // No correction entry matches R2: the naive name stands.
        assert_eq!(
            run.table.rows[0][2],
            "001-00001-0102-E-X01-02_R2.fastq.gz"
        );
    }

    #[test]
    fn lab_sample_ids_substitute_for_output_naming() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let mut params = params(&selected, &batch_table);
        params.use_lab_sample_id = true;
        let run = build_run_table(&records, &params).unwrap();

        assert_eq!(run.table.rows[0][0], "LAB-001-00001-0102-E-X01-02");
        assert_eq!(run.table.rows[0][3], "LAB-001-00001-0101-E-X01-01");
        assert_eq!(
            run.table.rows[0][1],
            "LAB-001-00001-0102-E-X01-02_R1.fastq.gz"
        );
    }

    #[test]
    fn conflicting_lab_sample_ids_are_an_integrity_error() {
        let dir = TempDir::new().unwrap();
        let mut records = registry();
        let mut duplicate = records[1].clone();
        duplicate.lab_sample_id = "LAB-OTHER".to_string();
        records.push(duplicate);
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let mut params = params(&selected, &batch_table);
        params.use_lab_sample_id = true;

        let err = build_run_table(&records, &params).unwrap_err();
        assert!(err.downcast_ref::<IntegrityError>().is_some());
    }

    #[test]
    fn output_file_is_written() {
        let dir = TempDir::new().unwrap();
        let records = registry();
        let selected = all_ids(&records);
        let batch_table = write_batch_table(&dir);
        let output = dir.path().join("run-table.csv");

        let warnings =
            write_run_table(&records, &params(&selected, &batch_table), &output).unwrap();
        assert_eq!(warnings.len(), 1);

        let written = read_table(&output, RUN_TABLE_COLUMNS).unwrap();
        assert_eq!(written.len(), 2);
    }
}
