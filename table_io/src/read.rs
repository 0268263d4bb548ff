use crate::{SchemaError, Table};
use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// Read a delimited-text or spreadsheet file into a `Table` whose columns
/// are exactly `required_columns`, in that order.
///
/// The format is chosen by extension: `.xlsx` is read as a spreadsheet,
/// `.tsv` as tab-delimited text, anything else as comma-delimited text.
/// A missing required column fails with a `SchemaError` naming the column
/// and the source file. Fully-empty rows are dropped, and any column whose
/// name ends in "Date" is normalized to ISO `YYYY-MM-DD`.
pub fn read_table<T: AsRef<str>>(
    path: &Path,
    required_columns: impl IntoIterator<Item = T>,
) -> Result<Table> {
    let (headers, rows) = match extension(path).as_str() {
        "xlsx" => read_spreadsheet(path)?,
        "tsv" => read_delimited(path, b'\t')?,
        _ => read_delimited(path, b',')?,
    };

    let file = basename(path);
    let mut indices = Vec::new();
    let mut columns = Vec::new();
    for required in required_columns {
        let required = required.as_ref();
        match headers.iter().position(|h| h == required) {
            Some(i) => {
                indices.push(i);
                columns.push(required.to_string());
            }
            None => {
                return Err(SchemaError {
                    column: required.to_string(),
                    file,
                }
                .into());
            }
        }
    }

    let mut table = Table::new(columns);
    for row in &rows {
        let selected: Vec<String> = indices
            .iter()
            .map(|&i| row.get(i).cloned().unwrap_or_default())
            .collect();
        if selected.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        table.push_row(selected);
    }

    normalize_date_columns(&mut table, &file)?;
    Ok(table)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| path.display().to_string())?;

    let mut headers = reader.headers()?.clone();
    headers.trim();
    let headers: Vec<String> = headers.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let mut record = result?;
        record.trim();
        rows.push(record.iter().map(String::from).collect());
    }
    Ok((headers, rows))
}

fn read_spreadsheet(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path).with_context(|| path.display().to_string())?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        bail!("no worksheet found in \"{}\"", basename(path));
    };
    let range = range?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        bail!("no header row found in \"{}\"", basename(path));
    };
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Integer-valued floats render without the trailing ".0" so that
        // nullable numeric columns survive the spreadsheet round-trip.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn normalize_date_columns(table: &mut Table, file: &str) -> Result<()> {
    let date_columns: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.ends_with("Date"))
        .map(|(i, _)| i)
        .collect();

    for &i in &date_columns {
        for row in &mut table.rows {
            let cell = row[i].trim();
            if cell.is_empty() {
                continue;
            }
            match parse_date(cell) {
                Some(date) => row[i] = date.to_string(),
                None => bail!(
                    "cannot parse \"{cell}\" as a date in column \"{}\" of \"{file}\"",
                    table.columns[i]
                ),
            }
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}

pub(crate) fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}
