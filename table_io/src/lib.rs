//! Reading and writing the delimited-text / spreadsheet tables the registry
//! exchanges with the outside world. The in-memory `Table` keeps every cell
//! as a string; typed conversion happens at the record boundary, not here.

#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    unused
)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod read;
mod write;

pub use read::read_table;
pub use write::write_table;

/// A required column is absent from an input file's header.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Column \"{column}\" not found in \"{file}\"")]
pub struct SchemaError {
    pub column: String,
    pub file: String,
}

/// An ordered header row plus string-cell data rows.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// An empty table with the given header.
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a data row. The row must match the header width.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }
}
