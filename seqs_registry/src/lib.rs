//! The stateful core of the sequencing-sample registry: a canonical sample
//! table with atomic, snapshotted mutations and bounded undo/redo.
//!
//! Every mutating operation builds the next table aside and only commits it
//! on success, so a failed load, import or fill leaves the registry exactly
//! as it was, with no history entry.

#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    unused
)]

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use seqs_types::{schema_headers, Column, ImportRecord, SampleRecord, IMPORT_SCHEMA, REGISTRY_SCHEMA};
use std::collections::HashSet;
use std::path::Path;
use table_io::{read_table, write_table, Table};

mod history;
mod resolve;
mod seq_id;

pub use history::{History, SNAPSHOT_CAPACITY};
pub use resolve::{resolve, ResolvedIdentity};
pub use seq_id::encode_sample_id;

/// The single long-lived registry instance an orchestrator (UI or script)
/// drives. Owns the canonical table; all access goes through its methods.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<SampleRecord>,
    history: History,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// The current table, read-only, in row order.
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Render the current table into its file representation.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(schema_headers(&REGISTRY_SCHEMA));
        for record in &self.records {
            table.push_row(record.to_cells());
        }
        table
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_depth() > 0
    }

    /// Replace the table with an empty one. Snapshotted like any other
    /// mutation, so a stray reset is undoable.
    pub fn reset(&mut self) {
        self.commit(Vec::new());
    }

    /// Replace the table wholesale from a registry-schema file.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let table = read_table(path, schema_headers(&REGISTRY_SCHEMA))?;
        let records: Vec<SampleRecord> = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                SampleRecord::from_cells(cells)
                    .with_context(|| format!("row {} of \"{}\"", i + 1, path.display()))
            })
            .collect::<Result<_>>()?;
        log::info!("loaded {} records from {}", records.len(), path.display());
        self.commit(records);
        Ok(())
    }

    /// Serialize the entire current table. Pure read: no snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_table(path, &self.to_table())
    }

    /// Stable sort by one column. Ties keep their prior relative order, so
    /// repeated sorts are reproducible across platforms.
    pub fn sort(&mut self, column: Column, ascending: bool) {
        let mut next = self.records.clone();
        next.sort_by(|a, b| {
            let ord = a.cmp_by_column(b, column);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        self.commit(next);
    }

    /// Remove the rows at the given positions. All-or-nothing: any
    /// out-of-range position fails the whole operation untouched.
    pub fn delete_rows(&mut self, rows: &[usize]) -> Result<()> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.records.len()) {
            bail!(
                "row position {bad} is out of range ({} rows)",
                self.records.len()
            );
        }
        let doomed: HashSet<usize> = rows.iter().copied().collect();
        let next: Vec<SampleRecord> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| !doomed.contains(i))
            .map(|(_, r)| r.clone())
            .collect();
        self.commit(next);
        Ok(())
    }

    /// Set every addressed cell to `value`. All-or-nothing: one bad address
    /// or type-invalid value and nothing is mutated, no snapshot taken.
    pub fn fill_cells(&mut self, cells: &[(usize, Column)], value: &str) -> Result<()> {
        let mut next = self.records.clone();
        for &(row, column) in cells {
            let len = next.len();
            let Some(record) = next.get_mut(row) else {
                bail!("row position {row} is out of range ({len} rows)");
            };
            record.set(column, value)?;
        }
        self.commit(next);
        Ok(())
    }

    /// Import a patient sample sheet, one row at a time in file order.
    ///
    /// Each row is identity-resolved against the table *as mutated by the
    /// rows before it in this batch*, so several new samples for the same
    /// new patient receive incrementing sequencing numbers. A duplicate
    /// `(Lab, Lab Patient ID, Lab Sample ID)` row is silently skipped. Any
    /// row failure abandons the whole batch. Returns the number of rows
    /// appended.
    pub fn import_patient_sample_sheet(&mut self, path: &Path) -> Result<usize> {
        self.import_with_date(path, Local::now().date_naive())
    }

    fn import_with_date(&mut self, path: &Path, today: NaiveDate) -> Result<usize> {
        let table = read_table(path, schema_headers(&IMPORT_SCHEMA))?;
        let mut next = self.records.clone();
        let mut appended = 0;
        for cells in &table.rows {
            let incoming = ImportRecord::from_cells(cells)?;
            let Some(identity) = resolve(&next, &incoming) else {
                log::info!(
                    "skipping existing sample: lab \"{}\", lab sample id \"{}\"",
                    incoming.lab,
                    incoming.lab_sample_id
                );
                continue;
            };
            let id = encode_sample_id(&incoming, identity.patient_id, identity.patient_sequencing_number)?;
            next.push(incoming.into_sample_record(
                id,
                identity.patient_id,
                identity.patient_sequencing_number,
                today,
            ));
            appended += 1;
        }
        log::info!(
            "imported {appended} of {} rows from {}",
            table.len(),
            path.display()
        );
        self.commit(next);
        Ok(appended)
    }

    /// Restore the previous table state. No-op when there is none.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.records)
    }

    /// Reapply the most recently undone state. No-op when there is none.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.records)
    }

    /// Swap in the next table, moving the pre-mutation state into history.
    fn commit(&mut self, next: Vec<SampleRecord>) {
        let previous = std::mem::replace(&mut self.records, next);
        self.history.record(previous);
    }
}
