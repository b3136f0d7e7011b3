//! Validation Dictionary Checker
//!
//! VALIDATION_DICTIONARY and UNITS_OF_MEASURE restate, column by column, the
//! code lists the template was built against. Before any data sheet is read
//! they are checked against the catalogue view (reference concepts plus the
//! user-defined ones) so that a workbook built from a stale template fails
//! early with the offending cell.

use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::model::CellValue;
use crate::template::{TemplateSchema, UNITS_OF_MEASURE, VALIDATION_DICTIONARY};
use crate::vocab::CatalogueView;
use crate::workbook::{CellSource, column_letter};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info_span};

/// `"milligrams per kilogram (mg/kg)"` → `mg/kg`
static UNIT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>.*?)\s*\((?P<code>[^()]+)\)\s*$").expect("unit entry pattern")
});

/// Checks every code under every code-list header of VALIDATION_DICTIONARY.
/// Returns the number of codes checked.
pub fn check_validation_dictionary(
    schema: &TemplateSchema,
    source: &dyn CellSource,
    view: &CatalogueView<'_>,
) -> ConversionResult<usize> {
    let _span = info_span!("check_dictionary", sheet = VALIDATION_DICTIONARY).entered();
    let (header_row, first_row) = schema.validation_dictionary_rows;
    let mut checked = 0;
    for (column, list) in headers(source, VALIDATION_DICTIONARY, header_row) {
        if !view.has_code_list(&list) {
            return Err(ConversionError::invalid(
                Provenance::new(VALIDATION_DICTIONARY, header_row, "CODE_LIST"),
                &list,
                "a known code list",
            ));
        }
        for (row, value) in entries(source, VALIDATION_DICTIONARY, &column, first_row) {
            let code = value.as_text();
            if !view.has_notation(&code) {
                return Err(ConversionError::CodeNotFound {
                    at: Provenance::new(VALIDATION_DICTIONARY, row, list.as_str()),
                    code,
                    code_list: list.clone(),
                });
            }
            checked += 1;
        }
    }
    debug!(checked, "validation dictionary checked");
    Ok(checked)
}

/// Checks every `label (code)` entry of UNITS_OF_MEASURE. Entries without a
/// parenthesised code are taken as a bare code.
pub fn check_units_of_measure(
    schema: &TemplateSchema,
    source: &dyn CellSource,
    view: &CatalogueView<'_>,
) -> ConversionResult<usize> {
    let _span = info_span!("check_dictionary", sheet = UNITS_OF_MEASURE).entered();
    let (header_row, first_row) = schema.units_of_measure_rows;
    let mut checked = 0;
    for (column, collection) in headers(source, UNITS_OF_MEASURE, header_row) {
        if !view.has_code_list(&collection) {
            return Err(ConversionError::invalid(
                Provenance::new(UNITS_OF_MEASURE, header_row, "CODE_LIST"),
                &collection,
                "a known code list",
            ));
        }
        for (row, value) in entries(source, UNITS_OF_MEASURE, &column, first_row) {
            let entry = value.as_text();
            let code = unit_code(&entry);
            if !view.has_notation(code) {
                return Err(ConversionError::CodeNotFound {
                    at: Provenance::new(UNITS_OF_MEASURE, row, collection.as_str()),
                    code: code.to_string(),
                    code_list: collection.clone(),
                });
            }
            checked += 1;
        }
    }
    debug!(checked, "units of measure checked");
    Ok(checked)
}

/// The code part of a `label (code)` entry.
pub fn unit_code(entry: &str) -> &str {
    UNIT_ENTRY
        .captures(entry)
        .and_then(|captures| captures.name("code"))
        .map_or(entry.trim(), |code| code.as_str().trim())
}

/// `(column, header)` pairs from column A up to the first empty header.
fn headers(source: &dyn CellSource, sheet: &str, row: u32) -> Vec<(String, String)> {
    (1..)
        .map(column_letter)
        .map_while(|column| {
            source
                .cell(sheet, &column, row)
                .map(|header| (column, header.as_text()))
        })
        .collect()
}

/// Non-empty cells of `column` from `first_row` down to the first gap.
fn entries(source: &dyn CellSource, sheet: &str, column: &str, first_row: u32) -> Vec<(u32, CellValue)> {
    (first_row..)
        .map_while(|row| source.cell(sheet, column, row).map(|value| (row, value)))
        .collect()
}
