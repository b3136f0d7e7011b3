//! Generic row walking and phased row validation
//!
//! Every row passes, in order and stopping at the first failure:
//! 1. presence and type conversion of each field, in column order
//! 2. code resolution
//! 3. numeric ranges
//! 4. cross-field orderings
//! 5. cross-sheet references and duplicate keys
//!
//! A [`Row`] only exists once all five phases passed, so extractors build
//! triples from validated values only.

use crate::error::{ConversionError, ConversionResult, Provenance};
use crate::model::{CellValue, FieldValue, Measurement};
use crate::registry::{Registries, RegistryKind};
use crate::template::{Direction, FieldKind, FieldSpec, FixedLayout, Ordering, SheetLayout};
use crate::vocab::CatalogueView;
use crate::workbook::CellSource;
use chrono::NaiveDate;
use indexmap::IndexMap;
use oxigraph::model::NamedNode;
use std::cmp::Ordering as CmpOrdering;
use tracing::trace;

// =============================================================================
// VALIDATED ROW
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct RowCell {
    value: FieldValue,
    row: u32,
}

/// One fully validated row (or fixed-cell block) of a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub sheet: &'static str,
    pub number: u32,
    cells: IndexMap<&'static str, RowCell>,
}

impl Row {
    /// Provenance of `field` in this row.
    pub fn at(&self, field: &str) -> Provenance {
        let row = self.cells.get(field).map_or(self.number, |cell| cell.row);
        Provenance::new(self.sheet, row, field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.cells.get(field).map(|cell| &cell.value)
    }

    pub fn has(&self, field: &str) -> bool {
        self.cells.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            FieldValue::Text(text) | FieldValue::Reference(text) => Some(text),
            FieldValue::Concept { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field)? {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn concept(&self, field: &str) -> Option<&NamedNode> {
        match self.get(field)? {
            FieldValue::Concept { iri, .. } => Some(iri),
            _ => None,
        }
    }

    pub fn measurement(&self, field: &str) -> Option<&Measurement> {
        match self.get(field)? {
            FieldValue::Measurement(measurement) => Some(measurement),
            _ => None,
        }
    }

    fn missing(&self, field: &str) -> ConversionError {
        ConversionError::missing(self.at(field))
    }

    pub fn require_text(&self, field: &str) -> ConversionResult<&str> {
        self.text(field).ok_or_else(|| self.missing(field))
    }

    pub fn require_number(&self, field: &str) -> ConversionResult<f64> {
        self.number(field).ok_or_else(|| self.missing(field))
    }

    pub fn require_date(&self, field: &str) -> ConversionResult<NaiveDate> {
        self.date(field).ok_or_else(|| self.missing(field))
    }

    pub fn require_concept(&self, field: &str) -> ConversionResult<&NamedNode> {
        self.concept(field).ok_or_else(|| self.missing(field))
    }

    pub fn require_measurement(&self, field: &str) -> ConversionResult<&Measurement> {
        self.measurement(field).ok_or_else(|| self.missing(field))
    }
}

// =============================================================================
// ROW WALKER
// =============================================================================

/// Walks the data rows of one worksheet layout.
pub struct RowWalker<'a> {
    layout: &'a SheetLayout,
    source: &'a dyn CellSource,
    next_row: u32,
    done: bool,
    rows_read: usize,
}

impl<'a> RowWalker<'a> {
    /// An absent worksheet walks as empty.
    pub fn new(layout: &'a SheetLayout, source: &'a dyn CellSource) -> Self {
        let done = !source.has_sheet(layout.name);
        Self {
            layout,
            source,
            next_row: first_data_row(layout, source),
            done,
            rows_read: 0,
        }
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Validates and returns the next row, or `None` past the last row.
    pub fn next_row(
        &mut self,
        view: &CatalogueView<'_>,
        registries: &Registries,
    ) -> ConversionResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        let number = self.next_row;
        // a blank key only ends the sheet when the whole row is blank; any
        // other filled cell makes it a row with a missing key
        if self
            .source
            .cell(self.layout.name, self.layout.key_column, number)
            .is_none()
            && self.row_is_blank(number)
        {
            self.done = true;
            return Ok(None);
        }
        self.next_row += 1;

        let specs = self.layout.fields.iter().map(|spec| (number, spec));
        let row = validate(
            self.layout.name,
            number,
            specs,
            self.layout.together,
            self.layout.orderings,
            self.source,
            view,
            registries,
        )?;

        if let Some((field, kind)) = self.layout.exports {
            check_unique(&row, field, kind, registries)?;
        }
        self.rows_read += 1;
        trace!(sheet = self.layout.name, row = number, "row validated");
        Ok(Some(row))
    }

    fn row_is_blank(&self, number: u32) -> bool {
        self.layout
            .fields
            .iter()
            .all(|field| self.source.cell(self.layout.name, field.column, number).is_none())
    }
}

/// The first row after any unmodified example rows.
pub fn first_data_row(layout: &SheetLayout, source: &dyn CellSource) -> u32 {
    let mut row = layout.first_row;
    for (offset, (column, sentinel)) in (0u32..).zip(layout.examples.iter()) {
        let candidate = layout.first_row + offset;
        match source.cell(layout.name, column, candidate) {
            Some(value) if value.as_text() == *sentinel => row = candidate + 1,
            _ => break,
        }
    }
    row
}

/// Reads and validates a fixed-cell layout.
pub fn read_fixed(
    layout: &FixedLayout,
    source: &dyn CellSource,
    view: &CatalogueView<'_>,
    registries: &Registries,
) -> ConversionResult<Row> {
    let first = layout.cells.first().map_or(1, |(row, _)| *row);
    let specs = layout.cells.iter().map(|(row, spec)| (*row, spec));
    validate(
        layout.name,
        first,
        specs,
        &[],
        layout.orderings,
        source,
        view,
        registries,
    )
}

// =============================================================================
// PHASES
// =============================================================================

enum Staged {
    Ready(FieldValue),
    Code { code: String, code_list: &'static str },
    CodeList(String),
    Reference { key: String, kind: RegistryKind },
}

#[allow(clippy::too_many_arguments)]
fn validate<'s>(
    sheet: &'static str,
    number: u32,
    specs: impl Iterator<Item = (u32, &'s FieldSpec)> + Clone,
    together: &[(&'static str, &'static str)],
    orderings: &[Ordering],
    source: &dyn CellSource,
    view: &CatalogueView<'_>,
    registries: &Registries,
) -> ConversionResult<Row> {
    let present: Vec<&'static str> = specs
        .clone()
        .filter(|(row, spec)| source.cell(sheet, spec.column, *row).is_some())
        .map(|(_, spec)| spec.name)
        .collect();
    let partner_given = |name: &str| {
        together.iter().any(|(a, b)| {
            (*a == name && present.contains(b)) || (*b == name && present.contains(a))
        })
    };

    // 1. presence and type
    let mut staged: Vec<(u32, &FieldSpec, Staged)> = Vec::new();
    for (row, spec) in specs {
        let at = || Provenance::new(sheet, row, spec.name);
        let Some(cell) = source.cell(sheet, spec.column, row) else {
            if spec.required || partner_given(spec.name) {
                return Err(ConversionError::missing(at()));
            }
            continue;
        };
        staged.push((row, spec, convert(&cell, spec, at)?));
    }

    // 2. codes
    let mut resolved: Vec<(u32, &FieldSpec, FieldValue)> = Vec::with_capacity(staged.len());
    let mut references: Vec<(u32, &FieldSpec, String, RegistryKind)> = Vec::new();
    for (row, spec, value) in staged {
        let at = || Provenance::new(sheet, row, spec.name);
        let value = match value {
            Staged::Ready(value) => value,
            Staged::Code { code, code_list } => {
                let iri = view
                    .resolve(&code, code_list)
                    .map_err(|err| err.at(at()))?;
                FieldValue::Concept { code, iri }
            }
            Staged::CodeList(notation) => {
                if !view.has_code_list(&notation) {
                    return Err(ConversionError::invalid(at(), notation, "a known code list"));
                }
                FieldValue::Text(notation)
            }
            Staged::Reference { key, kind } => {
                references.push((row, spec, key.clone(), kind));
                FieldValue::Reference(key)
            }
        };
        resolved.push((row, spec, value));
    }

    // 3. ranges
    for (row, spec, value) in &resolved {
        let (FieldKind::Integer(bounds) | FieldKind::Number(bounds)) = spec.kind else {
            continue;
        };
        if let Some(number) = value.as_f64() {
            if !bounds.contains(number) {
                return Err(ConversionError::ValueOutOfRange {
                    at: Provenance::new(sheet, *row, spec.name),
                    value: value.to_string(),
                    range: bounds.to_string(),
                });
            }
        }
    }

    let row = Row {
        sheet,
        number,
        cells: resolved
            .into_iter()
            .map(|(row, spec, value)| (spec.name, RowCell { value, row }))
            .collect(),
    };

    // 4. orderings
    for ordering in orderings {
        check_ordering(&row, ordering)?;
    }

    // 5. references
    for (cell_row, spec, key, kind) in references {
        registries.lookup(kind, &key, || Provenance::new(sheet, cell_row, spec.name))?;
    }

    Ok(row)
}

fn convert(
    cell: &CellValue,
    spec: &FieldSpec,
    at: impl Fn() -> Provenance,
) -> ConversionResult<Staged> {
    let staged = match spec.kind {
        FieldKind::Text => Staged::Ready(FieldValue::Text(cell.as_text())),
        FieldKind::Integer(_) => match cell.as_integer() {
            Some(value) => Staged::Ready(FieldValue::Integer(value)),
            None => return Err(ConversionError::invalid(at(), cell, "a whole number")),
        },
        FieldKind::Number(_) => match cell.as_number() {
            Some(value) => Staged::Ready(FieldValue::Number(value)),
            None => return Err(ConversionError::invalid(at(), cell, "a number")),
        },
        FieldKind::Date => match cell.as_date() {
            Some(date) => Staged::Ready(FieldValue::Date(date)),
            None => return Err(ConversionError::invalid(at(), cell, "a date")),
        },
        FieldKind::Measurement => match Measurement::parse(cell) {
            Some(value) => Staged::Ready(FieldValue::Measurement(value)),
            None => {
                return Err(ConversionError::invalid(
                    at(),
                    cell,
                    "a number or a censored value such as <0.01",
                ));
            }
        },
        FieldKind::Code(code_list) => Staged::Code {
            code: cell.as_text(),
            code_list,
        },
        FieldKind::CodeList => Staged::CodeList(cell.as_text()),
        FieldKind::Reference(kind) => Staged::Reference {
            key: cell.as_text(),
            kind,
        },
    };
    Ok(staged)
}

fn check_ordering(row: &Row, ordering: &Ordering) -> ConversionResult<()> {
    let (Some(value), Some(other)) = (row.get(ordering.field), row.get(ordering.other)) else {
        return Ok(());
    };
    let comparison = match (value, other) {
        (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    let holds = match (comparison, ordering.direction) {
        (Some(CmpOrdering::Less), Direction::AtLeast) => false,
        (Some(CmpOrdering::Greater), Direction::AtMost) => false,
        _ => true,
    };
    if holds {
        return Ok(());
    }
    Err(ConversionError::InvalidOrdering {
        at: row.at(ordering.field),
        value: value.to_string(),
        relation: format!("{} ({other})", ordering.relation()),
    })
}

fn check_unique(
    row: &Row,
    field: &str,
    kind: RegistryKind,
    registries: &Registries,
) -> ConversionResult<()> {
    let Some(key) = row.text(field) else {
        return Ok(());
    };
    if let Some(first) = registries.get(kind).get(key) {
        return Err(ConversionError::DuplicateKey {
            at: row.at(field),
            value: key.to_string(),
            first: first.defined_at.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Bounds;
    use crate::vocab::{Catalogue, Concept};
    use crate::workbook::MemoryWorkbook;
    use assert_matches::assert_matches;

    const SHEET: &str = "HOLES";

    const LAYOUT: SheetLayout = SheetLayout {
        name: SHEET,
        first_row: 9,
        key_column: "B",
        examples: &[("B", "EX1"), ("B", "EX2")],
        fields: &[
            FieldSpec::required("ID", "B", FieldKind::Text),
            FieldSpec::required("TYPE", "C", FieldKind::Code("DRILL_TYPE")),
            FieldSpec::required("DIP", "D", FieldKind::Number(Bounds::between(-90.0, 0.0))),
            FieldSpec::optional("FROM", "E", FieldKind::Number(Bounds::at_least(0.0))),
            FieldSpec::optional("TO", "F", FieldKind::Number(Bounds::at_least(0.0))),
            FieldSpec::optional("PARENT", "G", FieldKind::Reference(RegistryKind::Drillhole)),
        ],
        orderings: &[Ordering::at_least("TO", "FROM")],
        together: &[("FROM", "TO")],
        exports: Some(("ID", RegistryKind::Drillhole)),
    };

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with_code_list("DRILL_TYPE", NamedNode::new_unchecked("http://example.org/dt"))
            .with_code_list("OTHER", NamedNode::new_unchecked("http://example.org/other"))
            .with_concept(
                Concept::new(NamedNode::new_unchecked("http://example.org/dd"), "DD")
                    .in_list("DRILL_TYPE"),
            )
            .with_concept(
                Concept::new(NamedNode::new_unchecked("http://example.org/xx"), "XX")
                    .in_list("OTHER"),
            )
    }

    fn row(book: &mut MemoryWorkbook, number: u32, id: &str, code: &str, dip: f64) {
        book.set(SHEET, &format!("B{number}"), CellValue::Text(id.into()))
            .set(SHEET, &format!("C{number}"), CellValue::Text(code.into()))
            .set(SHEET, &format!("D{number}"), CellValue::Number(dip));
    }

    fn walk(book: &MemoryWorkbook) -> ConversionResult<Vec<Row>> {
        let catalogue = catalogue();
        let view = CatalogueView::new(&catalogue);
        let registries = Registries::new();
        let mut walker = RowWalker::new(&LAYOUT, book);
        let mut rows = Vec::new();
        while let Some(row) = walker.next_row(&view, &registries)? {
            rows.push(row);
        }
        Ok(rows)
    }

    #[test]
    fn skips_consecutive_examples_and_stops_at_empty_key() -> ConversionResult<()> {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "EX1", "DD", -45.0);
        row(&mut book, 10, "EX2", "DD", -45.0);
        row(&mut book, 11, "H1", "DD", -60.0);
        row(&mut book, 13, "H3", "DD", -60.0);

        let rows = walk(&book)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 11);
        assert_eq!(rows[0].text("ID"), Some("H1"));
        assert_eq!(rows[0].concept("TYPE").map(|n| n.as_str()), Some("http://example.org/dd"));
        Ok(())
    }

    #[test]
    fn filled_row_with_blank_key_is_rejected() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", -60.0);
        row(&mut book, 10, "H2", "DD", -60.0);
        book.clear(SHEET, "B10");
        row(&mut book, 11, "H3", "DD", -60.0);
        assert_matches!(
            walk(&book),
            Err(ConversionError::MissingRequiredField { at }) if at.field == "ID" && at.row == 10
        );
    }

    #[test]
    fn edited_example_row_is_data() -> ConversionResult<()> {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H0", "DD", -45.0);
        row(&mut book, 10, "EX2", "DD", -45.0);
        assert_eq!(walk(&book)?.len(), 2);
        Ok(())
    }

    #[test]
    fn absent_sheet_walks_as_empty() -> ConversionResult<()> {
        assert!(walk(&MemoryWorkbook::new())?.is_empty());
        Ok(())
    }

    #[test]
    fn presence_is_checked_before_codes() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "NOPE", -45.0);
        book.clear(SHEET, "D9");
        assert_matches!(
            walk(&book),
            Err(ConversionError::MissingRequiredField { at }) if at.field == "DIP" && at.row == 9
        );
    }

    #[test]
    fn wrong_list_code_is_a_mismatch() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "XX", -45.0);
        assert_matches!(
            walk(&book),
            Err(ConversionError::CodeListMismatch { code_list, found, .. })
                if code_list == "DRILL_TYPE" && found == "OTHER"
        );
    }

    #[test]
    fn out_of_range_reports_the_interval() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", 10.0);
        let err = walk(&book).expect_err("dip above horizontal");
        assert_eq!(
            err.to_string(),
            "The value 10 for DIP in row 9 of sheet HOLES is not within [-90, 0] as required"
        );
    }

    #[test]
    fn text_in_a_number_column_is_invalid() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", -45.0);
        book.set(SHEET, "D9", CellValue::Text("steep".into()));
        assert_matches!(walk(&book), Err(ConversionError::InvalidValue { .. }));
    }

    #[test]
    fn paired_fields_and_orderings() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", -45.0);
        book.set(SHEET, "E9", CellValue::Number(5.0));
        assert_matches!(
            walk(&book),
            Err(ConversionError::MissingRequiredField { at }) if at.field == "TO"
        );

        book.set(SHEET, "F9", CellValue::Number(2.0));
        assert_matches!(
            walk(&book),
            Err(ConversionError::InvalidOrdering { at, relation, .. })
                if at.field == "TO" && relation.starts_with("greater than or equal to FROM")
        );

        book.set(SHEET, "F9", CellValue::Number(5.0));
        assert!(walk(&book).is_ok());
    }

    #[test]
    fn references_must_be_registered() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", -45.0);
        book.set(SHEET, "G9", CellValue::Text("DD999".into()));
        assert_matches!(
            walk(&book),
            Err(ConversionError::UnknownReference { value, .. }) if value == "DD999"
        );
    }

    #[test]
    fn exported_keys_are_checked_against_the_registry() {
        let mut book = MemoryWorkbook::new();
        row(&mut book, 9, "H1", "DD", -45.0);
        let catalogue = catalogue();
        let view = CatalogueView::new(&catalogue);
        let mut registries = Registries::new();
        registries
            .register(
                RegistryKind::Drillhole,
                "H1",
                NamedNode::new_unchecked("http://example.org/h1"),
                Provenance::new(SHEET, 3, "ID"),
            )
            .expect("register");
        let mut walker = RowWalker::new(&LAYOUT, &book);
        assert_matches!(
            walker.next_row(&view, &registries),
            Err(ConversionError::DuplicateKey { first, .. }) if first.row == 3
        );
    }
}
