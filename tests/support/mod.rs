#![allow(dead_code)]

use std::path::Path;

use anyhow::{Context, Result};
use geochem_rdf::model::CellValue;
use geochem_rdf::template::{
    DATASET_METADATA, DRILLHOLE_LITHOLOGY, DRILLHOLE_LOCATION, DRILLHOLE_SAMPLE,
    DRILLHOLE_STRUCTURE, DRILLHOLE_SURVEY, GEOCHEMISTRY_META, LITH_DICTIONARY, MIN_DICTIONARY,
    QAQC_GEOCHEMISTRY, QAQC_META, SAMPLE_GEOCHEMISTRY, SAMPLE_PREPARATION, SURFACE_SAMPLE,
    TENEMENT, USER_ANALYTES, USER_ASSAY_CODES, USER_LABORATORIES, USER_SAMPLE_PREP_CODES,
};
use geochem_rdf::vocab::{Catalogue, Concept};
use geochem_rdf::workbook::{MemoryWorkbook, TEMPLATE_NOTES};
use oxigraph::model::NamedNode;

pub const DATASET_IRI: &str = "https://example.org/dataset/bores-2023";
pub const VOCAB: &str = "https://example.org/def/";

pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

pub fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

pub fn vocab(path: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{VOCAB}{path}"))
}

/// Cells of a workbook under construction, kept in insertion order so the
/// same fixture can be served from memory or written to disk.
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuilder {
    cells: Vec<(String, String, CellValue)>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template notes and dataset metadata only.
    pub fn metadata_only() -> Self {
        let mut builder = Self::new();
        builder
            .set(TEMPLATE_NOTES, "C7", text("VERSION 3.0"))
            .set(DATASET_METADATA, "B5", text(DATASET_IRI))
            .set(DATASET_METADATA, "B6", text("Bores 2023"))
            .set(DATASET_METADATA, "B7", text("Exploration drilling, 2023 season"))
            .set(DATASET_METADATA, "B8", text("2023-01-01"))
            .set(DATASET_METADATA, "B9", text("2023-06-30"))
            .set(DATASET_METADATA, "B10", text("GSQ"));
        builder
    }

    /// Metadata plus a single drillhole `DD1`.
    pub fn minimal() -> Self {
        let mut builder = Self::metadata_only();
        builder.drillhole(9, "DD1");
        builder
    }

    /// Every supported sheet with one populated row.
    pub fn complete() -> Self {
        let mut builder = Self::minimal();
        builder
            .row(
                TENEMENT,
                9,
                &[
                    ("B", text("EPM")),
                    ("C", text("EPM27000")),
                    ("D", text("Holder Pty Ltd")),
                    ("E", text("Copper Creek")),
                    ("F", text("Operator Pty Ltd")),
                    ("G", text("GDA94")),
                    ("H", text("8158, 8159")),
                ],
            )
            .row(USER_SAMPLE_PREP_CODES, 9, &[("B", text("PULV")), ("C", text("Pulverised"))])
            .row(USER_ASSAY_CODES, 9, &[("B", text("ICP")), ("C", text("ICP-MS"))])
            .row(USER_ANALYTES, 9, &[("B", text("Cu")), ("C", text("Copper"))])
            .row(
                USER_LABORATORIES,
                9,
                &[("B", text("ALS")), ("C", text("Brisbane"))],
            )
            .row(LITH_DICTIONARY, 9, &[("B", text("GRN")), ("D", text("GRANITE"))])
            .row(MIN_DICTIONARY, 9, &[("B", text("QZ")), ("D", text("QUARTZ"))])
            .row(
                DRILLHOLE_SURVEY,
                9,
                &[
                    ("B", text("DD1")),
                    ("C", text("GYRO")),
                    ("F", num(50.0)),
                    ("G", num(91.0)),
                    ("I", num(-59.5)),
                ],
            )
            .row(
                DRILLHOLE_SAMPLE,
                9,
                &[
                    ("B", text("DD1")),
                    ("C", text("S0001")),
                    ("D", text("HALF_CORE")),
                    ("E", num(10.0)),
                    ("F", num(11.0)),
                    ("G", text("2023-02-01")),
                    ("H", text("2023-02-03")),
                ],
            )
            .row(
                SURFACE_SAMPLE,
                9,
                &[
                    ("B", text("SS0001")),
                    ("C", text("SOIL")),
                    ("D", text("GRAB")),
                    ("H", num(6.5)),
                    ("I", num(501_000.0)),
                    ("J", num(7_001_000.0)),
                    ("L", text("GPS")),
                    ("M", text("2023-03-01")),
                    ("N", text("2023-03-02")),
                ],
            )
            .row(
                SAMPLE_PREPARATION,
                9,
                &[
                    ("B", text("J1")),
                    ("C", text("S0001")),
                    ("D", text("ALS")),
                    ("F", text("PULV")),
                    ("G", text("ICP")),
                ],
            )
            .row(GEOCHEMISTRY_META, 9, &method_row())
            .row(
                SAMPLE_GEOCHEMISTRY,
                9,
                &[
                    ("B", text("J1")),
                    ("C", text("S0001")),
                    ("D", text("ICP")),
                    ("E", text("Cu")),
                    ("F", text("<0.5")),
                ],
            )
            .row(QAQC_META, 9, &method_row())
            .row(
                QAQC_GEOCHEMISTRY,
                9,
                &[
                    ("B", text("J1")),
                    ("C", text("QC0001")),
                    ("D", text("OREAS-501")),
                    ("E", text("STD")),
                    ("F", text("ICP")),
                    ("G", text("Cu")),
                    ("H", num(2750.0)),
                ],
            )
            .row(
                DRILLHOLE_LITHOLOGY,
                9,
                &[
                    ("B", text("DD1")),
                    ("C", num(0.0)),
                    ("D", num(12.5)),
                    ("E", text("GRN")),
                    ("G", text("FR")),
                    ("M", text("QZ")),
                    ("N", num(15.0)),
                ],
            )
            .row(
                DRILLHOLE_STRUCTURE,
                9,
                &[
                    ("B", text("DD1")),
                    ("C", num(20.0)),
                    ("D", text("FLT")),
                    ("E", num(35.0)),
                ],
            );
        builder
    }

    pub fn drillhole(&mut self, row: u32, id: &str) -> &mut Self {
        self.row(
            DRILLHOLE_LOCATION,
            row,
            &[
                ("B", text(id)),
                ("C", num(500_000.0)),
                ("D", num(7_000_000.0)),
                ("E", num(250.0)),
                ("F", num(300.0)),
                ("H", text("DD")),
                ("I", text("HQ")),
                ("J", num(-60.0)),
                ("K", num(90.0)),
                ("M", text("2023-01-01")),
                ("N", text("2023-01-10")),
                ("O", text("GPS")),
                ("Q", text("DD")),
                ("R", num(0.0)),
                ("S", text("Drillers Ltd")),
            ],
        )
    }

    pub fn set(&mut self, sheet: &str, address: &str, value: CellValue) -> &mut Self {
        self.clear(sheet, address);
        self.cells
            .push((sheet.to_string(), address.to_string(), value));
        self
    }

    pub fn row(&mut self, sheet: &str, row: u32, cells: &[(&str, CellValue)]) -> &mut Self {
        for (column, value) in cells {
            self.set(sheet, &format!("{column}{row}"), value.clone());
        }
        self
    }

    pub fn clear(&mut self, sheet: &str, address: &str) -> &mut Self {
        self.cells
            .retain(|(s, a, _)| !(s == sheet && a == address));
        self
    }

    pub fn memory(&self) -> MemoryWorkbook {
        let mut book = MemoryWorkbook::new();
        for (sheet, address, value) in &self.cells {
            book.set(sheet, address, value.clone());
        }
        book
    }

    /// Writes the fixture as an `.xlsx` file with umya-spreadsheet.
    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        for (sheet, address, value) in &self.cells {
            if book.get_sheet_by_name(sheet).is_none() {
                book.new_sheet(sheet.as_str())
                    .map_err(|err| anyhow::anyhow!("cannot add sheet {sheet}: {err}"))?;
            }
            let worksheet = book
                .get_sheet_by_name_mut(sheet)
                .with_context(|| format!("sheet {sheet} missing after creation"))?;
            let cell = worksheet.get_cell_mut(address.as_str());
            match value {
                CellValue::Number(number) => {
                    cell.set_value_number(*number);
                }
                CellValue::Bool(flag) => {
                    cell.set_value_bool(*flag);
                }
                other => {
                    cell.set_value(other.as_text());
                }
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, path)
            .map_err(|err| anyhow::anyhow!("failed to write {:?}: {err}", path))
    }
}

fn method_row() -> Vec<(&'static str, CellValue)> {
    vec![
        ("B", text("J1")),
        ("C", text("ALS")),
        ("D", text("ICP")),
        ("E", text("Cu")),
        ("F", text("ppm")),
        ("G", num(0.5)),
        ("I", num(5.0)),
    ]
}

/// Reference concepts by code list, enough for [`WorkbookBuilder::complete`].
const REFERENCE: &[(&str, &[&str])] = &[
    ("AGENT", &["GSQ"]),
    ("DRILL_TYPE", &["DD", "RC"]),
    ("DRILL_DIAMETER", &["HQ", "NQ"]),
    ("LOC_SURVEY_TYPE", &["GPS"]),
    ("RPT_SURVEY_TYPE", &["GYRO"]),
    ("LEASE_NAME", &["EPM"]),
    ("COORD_SYS_ID", &["GDA94"]),
    ("SAMPLE_TYPE_DRILLHOLE", &["HALF_CORE"]),
    ("SAMPLE_MATERIAL", &["SOIL"]),
    ("SAMPLE_TYPE_SURFACE", &["GRAB"]),
    ("CONCENTRATION", &["ppm", "ppb"]),
    ("QAQC_TYPE", &["STD"]),
    ("LITHOLOGY", &["GRANITE"]),
    ("MINERAL", &["QUARTZ"]),
    ("WEATHERING", &["FR"]),
    ("STRUCTURE_TYPE", &["FLT"]),
];

pub fn catalogue() -> Catalogue {
    let mut catalogue = Catalogue::new();
    for (list, codes) in REFERENCE {
        catalogue = catalogue.with_code_list(list, vocab(&list.to_ascii_lowercase()));
        for code in *codes {
            let path = format!("{}/{}", list.to_ascii_lowercase(), code.to_ascii_lowercase());
            catalogue = catalogue.with_concept(Concept::new(vocab(&path), *code).in_list(*list));
        }
    }
    catalogue
}

/// The same reference concepts as [`catalogue`], as SKOS Turtle.
pub fn catalogue_turtle() -> String {
    let mut turtle = String::from(
        "@prefix skos: <http://www.w3.org/2004/02/skos/core#> .\n\
         @prefix def: <https://example.org/def/> .\n\n",
    );
    for (list, codes) in REFERENCE {
        let scheme = list.to_ascii_lowercase();
        turtle.push_str(&format!(
            "def:{scheme} a skos:ConceptScheme ; skos:notation \"{list}\" .\n"
        ));
        for code in *codes {
            turtle.push_str(&format!(
                "<{VOCAB}{scheme}/{}> a skos:Concept ; skos:notation \"{code}\" ; skos:inScheme def:{scheme} .\n",
                code.to_ascii_lowercase()
            ));
        }
    }
    turtle
}
