use crate::read::extension;
use crate::Table;
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Serialize a table to `path`, format chosen by the destination extension:
/// `.xlsx` writes a spreadsheet, `.tsv` tab-delimited text, anything else
/// comma-delimited text. The header row is always written first.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    match extension(path).as_str() {
        "xlsx" => write_spreadsheet(path, table),
        "tsv" => write_delimited(path, table, b'\t'),
        _ => write_delimited(path, table, b','),
    }
}

fn write_delimited(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| path.display().to_string())?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_spreadsheet(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (c, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, u16::try_from(c)?, name)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet.write_string(u32::try_from(r)? + 1, u16::try_from(c)?, cell)?;
        }
    }
    workbook
        .save(path)
        .with_context(|| path.display().to_string())?;
    Ok(())
}
