use crate::error::{ConversionError, ConversionResult};
use crate::model::CellValue;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use umya_spreadsheet::reader::xlsx;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub const TEMPLATE_NOTES: &str = "TEMPLATE_NOTES";
const TEMPLATE_VERSION_CELL: (&str, u32) = ("C", 7);
const WORKBOOK_EXTENSION: &str = "xlsx";

/// Read access to worksheet cells by sheet name, column letter and 1-based row.
pub trait CellSource {
    fn has_sheet(&self, sheet: &str) -> bool;

    /// `None` for an absent sheet, an absent cell, or a blank cell.
    fn cell(&self, sheet: &str, column: &str, row: u32) -> Option<CellValue>;
}

/// Reads the template version string from `TEMPLATE_NOTES!C7`.
///
/// The cell holds `VERSION 3.0`; a bare number is accepted too.
pub fn template_version(source: &dyn CellSource) -> ConversionResult<Option<String>> {
    if !source.has_sheet(TEMPLATE_NOTES) {
        return Err(ConversionError::MissingSheet {
            sheet: TEMPLATE_NOTES.to_string(),
        });
    }
    let (column, row) = TEMPLATE_VERSION_CELL;
    Ok(source.cell(TEMPLATE_NOTES, column, row).map(|value| {
        let version = match value {
            CellValue::Number(number) if number.fract() == 0.0 => format!("{number:.1}"),
            other => other.as_text(),
        };
        version
            .trim()
            .trim_start_matches("VERSION")
            .trim()
            .to_string()
    }))
}

/// A workbook loaded from disk with umya-spreadsheet.
pub struct WorkbookContext {
    pub path: PathBuf,
    pub slug: String,
    pub bytes: u64,
    spreadsheet: Spreadsheet,
}

impl WorkbookContext {
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        anyhow::ensure!(
            extension == WORKBOOK_EXTENSION,
            "files for conversion to RDF must be Excel files ending .{WORKBOOK_EXTENSION}, got {:?}",
            path
        );
        let metadata = fs::metadata(path)
            .with_context(|| format!("unable to read metadata for {:?}", path))?;
        let spreadsheet =
            xlsx::read(path).with_context(|| format!("failed to parse workbook {:?}", path))?;
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "workbook".to_string());
        debug!(path = ?path, bytes = metadata.len(), "workbook loaded");

        Ok(Self {
            path: path.to_path_buf(),
            slug,
            bytes: metadata.len(),
            spreadsheet,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.spreadsheet
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.spreadsheet.get_sheet_by_name(name)
    }
}

impl CellSource for WorkbookContext {
    fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet(sheet).is_some()
    }

    fn cell(&self, sheet: &str, column: &str, row: u32) -> Option<CellValue> {
        let address = format!("{column}{row}");
        self.sheet(sheet)?
            .get_cell(address.as_str())
            .and_then(cell_to_value)
    }
}

pub fn cell_to_value(cell: &umya_spreadsheet::Cell) -> Option<CellValue> {
    let raw = cell.get_value();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return Some(CellValue::Number(number));
        }
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower == "true" {
        return Some(CellValue::Bool(true));
    }
    if lower == "false" {
        return Some(CellValue::Bool(false));
    }

    Some(CellValue::Text(trimmed.to_string()))
}

/// An in-memory workbook, for callers that already hold cell data.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: HashMap<String, BTreeMap<(u32, String), CellValue>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: &str) -> &mut Self {
        self.sheets.entry(name.to_string()).or_default();
        self
    }

    /// Sets `address` (e.g. `"B9"`) on `sheet`, creating the sheet if needed.
    pub fn set(&mut self, sheet: &str, address: &str, value: CellValue) -> &mut Self {
        if let Some((column, row)) = split_address(address) {
            self.sheets
                .entry(sheet.to_string())
                .or_default()
                .insert((row, column), value);
        }
        self
    }

    pub fn clear(&mut self, sheet: &str, address: &str) -> &mut Self {
        if let Some((column, row)) = split_address(address) {
            if let Some(cells) = self.sheets.get_mut(sheet) {
                cells.remove(&(row, column));
            }
        }
        self
    }
}

impl CellSource for MemoryWorkbook {
    fn has_sheet(&self, sheet: &str) -> bool {
        self.sheets.contains_key(sheet)
    }

    fn cell(&self, sheet: &str, column: &str, row: u32) -> Option<CellValue> {
        let value = self
            .sheets
            .get(sheet)?
            .get(&(row, column.to_ascii_uppercase()))?;
        match value {
            CellValue::Text(text) if text.trim().is_empty() => None,
            other => Some(other.clone()),
        }
    }
}

/// Splits `"AB12"` into `("AB", 12)`.
pub fn split_address(address: &str) -> Option<(String, u32)> {
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (column, row) = address.split_at(split);
    if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let row = row.parse::<u32>().ok().filter(|row| *row > 0)?;
    Some((column.to_ascii_uppercase(), row))
}

/// 1-based column index to letters: 1 -> A, 27 -> AA.
pub fn column_letter(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = ((index - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_split_into_column_and_row() {
        assert_eq!(split_address("B9"), Some(("B".to_string(), 9)));
        assert_eq!(split_address("aa120"), Some(("AA".to_string(), 120)));
        assert_eq!(split_address("9B"), None);
        assert_eq!(split_address("B0"), None);
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(53), "BA");
    }

    #[test]
    fn template_version_strips_prefix() {
        let mut book = MemoryWorkbook::new();
        book.set(TEMPLATE_NOTES, "C7", CellValue::Text("VERSION 3.0".into()));
        assert_eq!(template_version(&book).ok().flatten().as_deref(), Some("3.0"));

        book.set(TEMPLATE_NOTES, "C7", CellValue::Number(3.0));
        assert_eq!(template_version(&book).ok().flatten().as_deref(), Some("3.0"));
    }

    #[test]
    fn blank_text_reads_as_empty() {
        let mut book = MemoryWorkbook::new();
        book.set("S", "A1", CellValue::Text("   ".into()));
        assert_eq!(book.cell("S", "A", 1), None);
        assert!(book.has_sheet("S"));
    }
}
