//! Declarative worksheet layouts, one schema per supported template version
//!
//! A layout fixes the column of every field, the first data row, the
//! example-row sentinels to skip and the cross-field ordering rules. The
//! row walker in [`crate::rows`] consumes layouts generically; no extractor
//! reads a column address that is not declared here.

use crate::error::{ConversionError, ConversionResult};
use crate::registry::RegistryKind;
use std::fmt;

pub const SUPPORTED_VERSIONS: &[&str] = &["3.0"];

// =============================================================================
// SHEET NAMES
// =============================================================================

pub const DATASET_METADATA: &str = "DATASET_METADATA";
pub const USER_DICTIONARY: &str = "USER_DICTIONARY";
pub const USER_UNITS_OF_MEASURE: &str = "USER_UNITS_OF_MEASURE";
pub const VALIDATION_DICTIONARY: &str = "VALIDATION_DICTIONARY";
pub const UNITS_OF_MEASURE: &str = "UNITS_OF_MEASURE";
pub const TENEMENT: &str = "TENEMENT";
pub const USER_SAMPLE_PREP_CODES: &str = "USER_SAMPLE_PREP_CODES";
pub const USER_ASSAY_CODES: &str = "USER_ASSAY_CODES";
pub const USER_ANALYTES: &str = "USER_ANALYTES";
pub const USER_LABORATORIES: &str = "USER_LABORATORIES";
pub const LITH_DICTIONARY: &str = "LITH_DICTIONARY";
pub const MIN_DICTIONARY: &str = "MIN_DICTIONARY";
pub const DRILLHOLE_LOCATION: &str = "DRILLHOLE_LOCATION";
pub const DRILLHOLE_SURVEY: &str = "DRILLHOLE_SURVEY";
pub const DRILLHOLE_SAMPLE: &str = "DRILLHOLE_SAMPLE";
pub const SURFACE_SAMPLE: &str = "SURFACE_SAMPLE";
pub const SAMPLE_PREPARATION: &str = "SAMPLE_PREPARATION";
pub const GEOCHEMISTRY_META: &str = "GEOCHEMISTRY_META";
pub const SAMPLE_GEOCHEMISTRY: &str = "SAMPLE_GEOCHEMISTRY";
pub const QAQC_META: &str = "QAQC_META";
pub const QAQC_GEOCHEMISTRY: &str = "QAQC_GEOCHEMISTRY";
pub const DRILLHOLE_LITHOLOGY: &str = "DRILLHOLE_LITHOLOGY";
pub const DRILLHOLE_STRUCTURE: &str = "DRILLHOLE_STRUCTURE";

// =============================================================================
// FIELD TYPES
// =============================================================================

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const NONE: Bounds = Bounds {
        min: None,
        max: None,
    };

    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |b: f64| crate::model::format_number(b);
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "[{}, {}]", fmt_bound(min), fmt_bound(max)),
            (Some(min), None) => write!(f, "[{}, +inf)", fmt_bound(min)),
            (None, Some(max)) => write!(f, "(-inf, {}]", fmt_bound(max)),
            (None, None) => f.write_str("(-inf, +inf)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Integer(Bounds),
    Number(Bounds),
    Date,
    /// A code that must resolve within the named code-list
    Code(&'static str),
    /// The notation of a code-list itself
    CodeList,
    /// A key exported by an earlier sheet
    Reference(RegistryKind),
    /// A number, or a censored `<n` / `>n` value
    Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn required(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            required: true,
            kind,
        }
    }

    pub const fn optional(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            required: false,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AtLeast,
    AtMost,
}

/// `field` must be at least / at most `other` when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: &'static str,
    pub other: &'static str,
    pub direction: Direction,
}

impl Ordering {
    pub const fn at_least(field: &'static str, other: &'static str) -> Self {
        Self {
            field,
            other,
            direction: Direction::AtLeast,
        }
    }

    pub const fn at_most(field: &'static str, other: &'static str) -> Self {
        Self {
            field,
            other,
            direction: Direction::AtMost,
        }
    }

    pub fn relation(&self) -> String {
        match self.direction {
            Direction::AtLeast => format!("greater than or equal to {}", self.other),
            Direction::AtMost => format!("less than or equal to {}", self.other),
        }
    }
}

/// A worksheet of one record per row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub name: &'static str,
    pub first_row: u32,
    /// Walking stops at the first row where this column is empty
    pub key_column: &'static str,
    /// Sentinels matched against consecutive rows from `first_row`
    pub examples: &'static [(&'static str, &'static str)],
    /// Fields in column order
    pub fields: &'static [FieldSpec],
    pub orderings: &'static [Ordering],
    /// Pairs where giving either field makes the other required
    pub together: &'static [(&'static str, &'static str)],
    /// Registry the key field defines entries in, checked for duplicates
    pub exports: Option<(&'static str, RegistryKind)>,
}

impl SheetLayout {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A worksheet of fixed cells, read once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLayout {
    pub name: &'static str,
    pub cells: &'static [(u32, FieldSpec)],
    pub orderings: &'static [Ordering],
}

// =============================================================================
// TEMPLATE 3.0
// =============================================================================

use FieldKind::{Code, CodeList, Date, Integer, Measurement, Number, Reference, Text};
use RegistryKind as R;

const ANY_NUMBER: FieldKind = Number(Bounds::NONE);
const NON_NEGATIVE: FieldKind = Number(Bounds::at_least(0.0));
const PERCENTAGE: FieldKind = Number(Bounds::between(0.0, 100.0));
const DIP_BELOW_HORIZONTAL: FieldKind = Number(Bounds::between(-90.0, 0.0));
const BEARING: FieldKind = Number(Bounds::between(0.0, 360.0));
const RIGHT_ANGLE: FieldKind = Number(Bounds::between(0.0, 90.0));

const DATASET_METADATA_V3: FixedLayout = FixedLayout {
    name: DATASET_METADATA,
    cells: &[
        (5, FieldSpec::optional("DATASET_IRI", "B", Text)),
        (6, FieldSpec::required("NAME", "B", Text)),
        (7, FieldSpec::required("DESCRIPTION", "B", Text)),
        (8, FieldSpec::required("DATE_CREATED", "B", Date)),
        (9, FieldSpec::required("DATE_MODIFIED", "B", Date)),
        (10, FieldSpec::required("AUTHOR", "B", Text)),
    ],
    orderings: &[Ordering::at_least("DATE_MODIFIED", "DATE_CREATED")],
};

const USER_DICTIONARY_V3: SheetLayout = SheetLayout {
    name: USER_DICTIONARY,
    first_row: 9,
    key_column: "B",
    examples: &[("C", "MEGA")],
    fields: &[
        FieldSpec::required("CODELIST", "B", CodeList),
        FieldSpec::required("CODE", "C", Text),
        FieldSpec::required("DESCRIPTION", "D", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const USER_UNITS_OF_MEASURE_V3: SheetLayout = SheetLayout {
    name: USER_UNITS_OF_MEASURE,
    first_row: 9,
    key_column: "B",
    examples: &[("C", "kg/L")],
    fields: &[
        FieldSpec::required("COLLECTION", "B", CodeList),
        FieldSpec::required("UNIT_CODE", "C", Text),
        FieldSpec::required("LABEL", "D", Text),
        FieldSpec::required("DEFINITION", "E", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const TENEMENT_V3: SheetLayout = SheetLayout {
    name: TENEMENT,
    first_row: 9,
    key_column: "C",
    examples: &[("C", "12345")],
    fields: &[
        FieldSpec::required("TENEMENT_TYPE", "B", Code("LEASE_NAME")),
        FieldSpec::required("TENEMENT_NO", "C", Text),
        FieldSpec::required("TENEMENT_HOLDER", "D", Text),
        FieldSpec::required("PROJECT_NAME", "E", Text),
        FieldSpec::required("TENEMENT_OPERATOR", "F", Text),
        FieldSpec::required("GEODETIC_DATUM", "G", Code("COORD_SYS_ID")),
        FieldSpec::required("MAP_SHEET_NO", "H", Text),
        FieldSpec::optional("REMARK", "I", Text),
        FieldSpec::optional("EASTING", "J", NON_NEGATIVE),
        FieldSpec::optional("NORTHING", "K", NON_NEGATIVE),
    ],
    orderings: &[],
    together: &[("EASTING", "NORTHING")],
    exports: Some(("TENEMENT_NO", R::Tenement)),
};

const USER_CODE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("CODE", "B", Text),
    FieldSpec::required("DESCRIPTION", "C", Text),
];

const fn user_code_table(name: &'static str, exports: RegistryKind) -> SheetLayout {
    SheetLayout {
        name,
        first_row: 9,
        key_column: "B",
        examples: &[],
        fields: USER_CODE_FIELDS,
        orderings: &[],
        together: &[],
        exports: Some(("CODE", exports)),
    }
}

const USER_LABORATORIES_V3: SheetLayout = SheetLayout {
    name: USER_LABORATORIES,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("LABORATORY_NAME", "B", Text),
        FieldSpec::required("LABORATORY_LOCATION", "C", Text),
        FieldSpec::optional("REMARK", "D", Text),
    ],
    orderings: &[],
    together: &[],
    exports: Some(("LABORATORY_NAME", R::Laboratory)),
};

const LITH_DICTIONARY_V3: SheetLayout = SheetLayout {
    name: LITH_DICTIONARY,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("USER_CODE", "B", Text),
        FieldSpec::optional("DESCRIPTION", "C", Text),
        FieldSpec::required("GSQ_CODE_MATCH", "D", Code("LITHOLOGY")),
    ],
    orderings: &[],
    together: &[],
    exports: Some(("USER_CODE", R::LithCode)),
};

const MIN_DICTIONARY_V3: SheetLayout = SheetLayout {
    name: MIN_DICTIONARY,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("USER_CODE", "B", Text),
        FieldSpec::optional("DESCRIPTION", "C", Text),
        FieldSpec::required("GSQ_CODE_MATCH", "D", Code("MINERAL")),
    ],
    orderings: &[],
    together: &[],
    exports: Some(("USER_CODE", R::MineralCode)),
};

const DRILLHOLE_LOCATION_V3: SheetLayout = SheetLayout {
    name: DRILLHOLE_LOCATION,
    first_row: 9,
    key_column: "B",
    examples: &[("B", "DD12345")],
    fields: &[
        FieldSpec::required("DRILLHOLE_ID", "B", Text),
        FieldSpec::required("EASTING", "C", Integer(Bounds::at_least(0.0))),
        FieldSpec::required("NORTHING", "D", Integer(Bounds::at_least(0.0))),
        FieldSpec::required("ELEVATION", "E", ANY_NUMBER),
        FieldSpec::required("TOTAL_DEPTH", "F", NON_NEGATIVE),
        FieldSpec::optional("TOTAL_DEPTH_LOGGER", "G", NON_NEGATIVE),
        FieldSpec::required("DRILL_TYPE", "H", Code("DRILL_TYPE")),
        FieldSpec::required("DRILL_DIAMETER", "I", Code("DRILL_DIAMETER")),
        FieldSpec::required("DIP", "J", DIP_BELOW_HORIZONTAL),
        FieldSpec::required("AZIMUTH", "K", BEARING),
        FieldSpec::optional("CURRENT_CLASS", "L", Code("CURRENT_CLASS")),
        FieldSpec::required("DRILL_START_DATE", "M", Date),
        FieldSpec::required("DRILL_END_DATE", "N", Date),
        FieldSpec::required("LOCATION_SURVEY_TYPE", "O", Code("LOC_SURVEY_TYPE")),
        FieldSpec::optional("SURVEY_COMPANY", "P", Text),
        FieldSpec::required("PRE_COLLAR_METHOD", "Q", Code("DRILL_TYPE")),
        FieldSpec::required("PRE_COLLAR_DEPTH", "R", NON_NEGATIVE),
        FieldSpec::required("DRILL_CONTRACTOR", "S", Text),
        FieldSpec::optional("REMARK", "T", Text),
    ],
    orderings: &[
        Ordering::at_least("DRILL_END_DATE", "DRILL_START_DATE"),
        Ordering::at_most("PRE_COLLAR_DEPTH", "TOTAL_DEPTH"),
    ],
    together: &[],
    exports: Some(("DRILLHOLE_ID", R::Drillhole)),
};

const DRILLHOLE_SURVEY_V3: SheetLayout = SheetLayout {
    name: DRILLHOLE_SURVEY,
    first_row: 9,
    key_column: "B",
    examples: &[("B", "DD1234")],
    fields: &[
        FieldSpec::required("DRILLHOLE_ID", "B", Reference(R::Drillhole)),
        FieldSpec::required("SURVEY_INSTRUMENT", "C", Code("RPT_SURVEY_TYPE")),
        FieldSpec::optional("SURVEY_COMPANY", "D", Text),
        FieldSpec::optional("SURVEY_DATE", "E", Date),
        FieldSpec::required("SURVEY_DEPTH", "F", NON_NEGATIVE),
        FieldSpec::required("AZIMUTH", "G", BEARING),
        FieldSpec::optional("AZIMUTH_ACCURACY", "H", PERCENTAGE),
        FieldSpec::required("DIP", "I", DIP_BELOW_HORIZONTAL),
        FieldSpec::optional("INCLINATION_ACCURACY", "J", PERCENTAGE),
        FieldSpec::optional("MAGNETIC_FIELD", "K", Number(Bounds::between(0.0, 10_000_000.0))),
        FieldSpec::optional("REMARK", "L", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const DRILLHOLE_SAMPLE_V3: SheetLayout = SheetLayout {
    name: DRILLHOLE_SAMPLE,
    first_row: 9,
    key_column: "C",
    examples: &[("B", "DD12345")],
    fields: &[
        FieldSpec::required("DRILLHOLE_ID", "B", Reference(R::Drillhole)),
        FieldSpec::required("SAMPLE_ID", "C", Text),
        FieldSpec::required("SAMPLE_TYPE", "D", Code("SAMPLE_TYPE_DRILLHOLE")),
        FieldSpec::required("FROM", "E", NON_NEGATIVE),
        FieldSpec::required("TO", "F", NON_NEGATIVE),
        FieldSpec::required("COLLECTION_DATE", "G", Date),
        FieldSpec::required("DISPATCH_DATE", "H", Date),
        FieldSpec::optional("INSTRUMENT_TYPE", "I", Code("INSTRUMENT_TYPE")),
        FieldSpec::optional("SPECIFIC_GRAVITY", "J", NON_NEGATIVE),
        FieldSpec::optional("MAGNETIC_SUSCEPTIBILITY", "K", ANY_NUMBER),
        FieldSpec::optional("REMARK", "L", Text),
    ],
    orderings: &[
        Ordering::at_least("TO", "FROM"),
        Ordering::at_least("DISPATCH_DATE", "COLLECTION_DATE"),
    ],
    together: &[],
    exports: Some(("SAMPLE_ID", R::Sample)),
};

const SURFACE_SAMPLE_V3: SheetLayout = SheetLayout {
    name: SURFACE_SAMPLE,
    first_row: 9,
    key_column: "B",
    examples: &[("B", "SS12345"), ("B", "SS12346"), ("B", "SS12347")],
    fields: &[
        FieldSpec::required("SAMPLE_ID", "B", Text),
        FieldSpec::required("SAMPLE_MATERIAL", "C", Code("SAMPLE_MATERIAL")),
        FieldSpec::required("SAMPLE_TYPE_SURFACE", "D", Code("SAMPLE_TYPE_SURFACE")),
        FieldSpec::optional("MESH_SIZE", "E", Code("MESH_SIZE")),
        FieldSpec::optional("SOIL_SAMPLE_DEPTH", "F", NON_NEGATIVE),
        FieldSpec::optional("SOIL_COLOUR", "G", Code("SOIL_COLOUR")),
        FieldSpec::optional("SOIL_PH", "H", Number(Bounds::between(0.0, 14.0))),
        FieldSpec::required("EASTING", "I", NON_NEGATIVE),
        FieldSpec::required("NORTHING", "J", NON_NEGATIVE),
        FieldSpec::optional("ELEVATION", "K", ANY_NUMBER),
        FieldSpec::required("LOCATION_SURVEY_TYPE", "L", Code("LOC_SURVEY_TYPE")),
        FieldSpec::required("COLLECTION_DATE", "M", Date),
        FieldSpec::required("DISPATCH_DATE", "N", Date),
        FieldSpec::optional("INSTRUMENT_TYPE", "O", Code("INSTRUMENT_TYPE")),
        FieldSpec::optional("SPECIFIC_GRAVITY", "P", NON_NEGATIVE),
        FieldSpec::optional("MAGNETIC_SUSCEPTIBILITY", "Q", ANY_NUMBER),
        FieldSpec::optional("REMARK", "R", Text),
    ],
    orderings: &[Ordering::at_least("DISPATCH_DATE", "COLLECTION_DATE")],
    together: &[],
    exports: Some(("SAMPLE_ID", R::Sample)),
};

const SAMPLE_PREPARATION_V3: SheetLayout = SheetLayout {
    name: SAMPLE_PREPARATION,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("JOB_NUMBER", "B", Text),
        FieldSpec::required("SAMPLE_ID", "C", Reference(R::Sample)),
        FieldSpec::required("LABORATORY_NAME", "D", Reference(R::Laboratory)),
        FieldSpec::optional("DATE_RECEIVED", "E", Date),
        FieldSpec::required("PREP_CODE", "F", Reference(R::PrepCode)),
        FieldSpec::required("ASSAY_CODE", "G", Reference(R::AssayCode)),
        FieldSpec::optional("REMARK", "H", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const METHOD_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("JOB_NUMBER", "B", Reference(R::Job)),
    FieldSpec::required("LABORATORY_NAME", "C", Reference(R::Laboratory)),
    FieldSpec::required("ASSAY_CODE", "D", Reference(R::AssayCode)),
    FieldSpec::required("ANALYTE_CODE", "E", Reference(R::Analyte)),
    FieldSpec::required("UNIT_CODE", "F", Code("CONCENTRATION")),
    FieldSpec::required("DETECTION_LIMIT", "G", NON_NEGATIVE),
    FieldSpec::optional("UPPER_DETECTION_LIMIT", "H", NON_NEGATIVE),
    FieldSpec::required("ACCURACY", "I", PERCENTAGE),
    FieldSpec::optional("PRECISION", "J", PERCENTAGE),
    FieldSpec::optional("REMARK", "K", Text),
];

const METHOD_ORDERINGS: &[Ordering] =
    &[Ordering::at_least("UPPER_DETECTION_LIMIT", "DETECTION_LIMIT")];

const fn method_meta(name: &'static str) -> SheetLayout {
    SheetLayout {
        name,
        first_row: 9,
        key_column: "B",
        examples: &[],
        fields: METHOD_FIELDS,
        orderings: METHOD_ORDERINGS,
        together: &[],
        exports: None,
    }
}

const SAMPLE_GEOCHEMISTRY_V3: SheetLayout = SheetLayout {
    name: SAMPLE_GEOCHEMISTRY,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("JOB_NUMBER", "B", Reference(R::Job)),
        FieldSpec::required("SAMPLE_ID", "C", Reference(R::Sample)),
        FieldSpec::required("ASSAY_CODE", "D", Reference(R::AssayCode)),
        FieldSpec::required("ANALYTE_CODE", "E", Reference(R::Analyte)),
        FieldSpec::required("RESULT", "F", Measurement),
        FieldSpec::optional("REMARK", "G", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const QAQC_GEOCHEMISTRY_V3: SheetLayout = SheetLayout {
    name: QAQC_GEOCHEMISTRY,
    first_row: 9,
    key_column: "B",
    examples: &[],
    fields: &[
        FieldSpec::required("JOB_NUMBER", "B", Reference(R::Job)),
        FieldSpec::required("SAMPLE_ID", "C", Text),
        FieldSpec::required("STANDARD_ID", "D", Text),
        FieldSpec::optional("QAQC_TYPE", "E", Code("QAQC_TYPE")),
        FieldSpec::required("ASSAY_CODE", "F", Reference(R::AssayCode)),
        FieldSpec::required("ANALYTE_CODE", "G", Reference(R::Analyte)),
        FieldSpec::required("RESULT", "H", Measurement),
        FieldSpec::optional("REMARK", "I", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

const DRILLHOLE_LITHOLOGY_V3: SheetLayout = SheetLayout {
    name: DRILLHOLE_LITHOLOGY,
    first_row: 9,
    key_column: "B",
    examples: &[("B", "DD12345")],
    fields: &[
        FieldSpec::required("DRILLHOLE_ID", "B", Reference(R::Drillhole)),
        FieldSpec::required("FROM", "C", NON_NEGATIVE),
        FieldSpec::required("TO", "D", NON_NEGATIVE),
        FieldSpec::required("ROCK_TYPE_CODE_1", "E", Reference(R::LithCode)),
        FieldSpec::optional("ROCK_TYPE_CODE_2", "F", Reference(R::LithCode)),
        FieldSpec::optional("WEATHERING", "G", Code("WEATHERING")),
        FieldSpec::optional("COLOUR", "H", Code("COLOUR")),
        FieldSpec::optional("GRAIN_SIZE", "I", Code("GRAIN_SIZE")),
        FieldSpec::optional("TEXTURE", "J", Code("TEXTURE")),
        FieldSpec::optional("ALT_TYPE", "K", Code("ALTERATION")),
        FieldSpec::optional("ALT_INTENSITY", "L", Code("ALTERATION_INTENSITY")),
        FieldSpec::optional("MINERAL_CODE_1", "M", Reference(R::MineralCode)),
        FieldSpec::optional("MINERAL_PERCENT_1", "N", PERCENTAGE),
        FieldSpec::optional("MINERAL_CODE_2", "O", Reference(R::MineralCode)),
        FieldSpec::optional("MINERAL_PERCENT_2", "P", PERCENTAGE),
        FieldSpec::optional("REMARK", "Q", Text),
    ],
    orderings: &[Ordering::at_least("TO", "FROM")],
    together: &[
        ("MINERAL_CODE_1", "MINERAL_PERCENT_1"),
        ("MINERAL_CODE_2", "MINERAL_PERCENT_2"),
    ],
    exports: None,
};

const DRILLHOLE_STRUCTURE_V3: SheetLayout = SheetLayout {
    name: DRILLHOLE_STRUCTURE,
    first_row: 9,
    key_column: "B",
    examples: &[("B", "DD12345")],
    fields: &[
        FieldSpec::required("DRILLHOLE_ID", "B", Reference(R::Drillhole)),
        FieldSpec::required("DEPTH", "C", NON_NEGATIVE),
        FieldSpec::required("STRUCTURE_TYPE", "D", Code("STRUCTURE_TYPE")),
        FieldSpec::optional("ALPHA_ANGLE", "E", RIGHT_ANGLE),
        FieldSpec::optional("BETA_ANGLE", "F", BEARING),
        FieldSpec::optional("DIP", "G", RIGHT_ANGLE),
        FieldSpec::optional("DIP_DIRECTION", "H", BEARING),
        FieldSpec::optional("REMARK", "I", Text),
    ],
    orderings: &[],
    together: &[],
    exports: None,
};

/// Layout contract for one template version.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSchema {
    pub version: &'static str,
    pub dataset_metadata: FixedLayout,
    pub user_dictionary: SheetLayout,
    pub user_units_of_measure: SheetLayout,
    pub tenement: SheetLayout,
    pub user_sample_prep_codes: SheetLayout,
    pub user_assay_codes: SheetLayout,
    pub user_analytes: SheetLayout,
    pub user_laboratories: SheetLayout,
    pub lith_dictionary: SheetLayout,
    pub min_dictionary: SheetLayout,
    pub drillhole_location: SheetLayout,
    pub drillhole_survey: SheetLayout,
    pub drillhole_sample: SheetLayout,
    pub surface_sample: SheetLayout,
    pub sample_preparation: SheetLayout,
    pub geochemistry_meta: SheetLayout,
    pub sample_geochemistry: SheetLayout,
    pub qaqc_meta: SheetLayout,
    pub qaqc_geochemistry: SheetLayout,
    pub drillhole_lithology: SheetLayout,
    pub drillhole_structure: SheetLayout,
    /// Code-list headers row and first code row on VALIDATION_DICTIONARY
    pub validation_dictionary_rows: (u32, u32),
    /// Code-list headers row and first entry row on UNITS_OF_MEASURE
    pub units_of_measure_rows: (u32, u32),
}

pub static TEMPLATE_V3_0: TemplateSchema = TemplateSchema {
    version: "3.0",
    dataset_metadata: DATASET_METADATA_V3,
    user_dictionary: USER_DICTIONARY_V3,
    user_units_of_measure: USER_UNITS_OF_MEASURE_V3,
    tenement: TENEMENT_V3,
    user_sample_prep_codes: user_code_table(USER_SAMPLE_PREP_CODES, R::PrepCode),
    user_assay_codes: user_code_table(USER_ASSAY_CODES, R::AssayCode),
    user_analytes: user_code_table(USER_ANALYTES, R::Analyte),
    user_laboratories: USER_LABORATORIES_V3,
    lith_dictionary: LITH_DICTIONARY_V3,
    min_dictionary: MIN_DICTIONARY_V3,
    drillhole_location: DRILLHOLE_LOCATION_V3,
    drillhole_survey: DRILLHOLE_SURVEY_V3,
    drillhole_sample: DRILLHOLE_SAMPLE_V3,
    surface_sample: SURFACE_SAMPLE_V3,
    sample_preparation: SAMPLE_PREPARATION_V3,
    geochemistry_meta: method_meta(GEOCHEMISTRY_META),
    sample_geochemistry: SAMPLE_GEOCHEMISTRY_V3,
    qaqc_meta: method_meta(QAQC_META),
    qaqc_geochemistry: QAQC_GEOCHEMISTRY_V3,
    drillhole_lithology: DRILLHOLE_LITHOLOGY_V3,
    drillhole_structure: DRILLHOLE_STRUCTURE_V3,
    validation_dictionary_rows: (4, 5),
    units_of_measure_rows: (1, 2),
};

impl TemplateSchema {
    /// Looks up the schema for a declared version. A missing version is
    /// reported as `"unknown"`.
    pub fn for_version(version: Option<&str>) -> ConversionResult<&'static TemplateSchema> {
        match version.map(str::trim) {
            Some("3.0") | Some("3") => Ok(&TEMPLATE_V3_0),
            other => Err(ConversionError::UnsupportedTemplateVersion {
                found: other.unwrap_or("unknown").to_string(),
                supported: SUPPORTED_VERSIONS.join(", "),
            }),
        }
    }

    pub fn row_layouts(&self) -> [&SheetLayout; 20] {
        [
            &self.user_dictionary,
            &self.user_units_of_measure,
            &self.tenement,
            &self.user_sample_prep_codes,
            &self.user_assay_codes,
            &self.user_analytes,
            &self.user_laboratories,
            &self.lith_dictionary,
            &self.min_dictionary,
            &self.drillhole_location,
            &self.drillhole_survey,
            &self.drillhole_sample,
            &self.surface_sample,
            &self.sample_preparation,
            &self.geochemistry_meta,
            &self.sample_geochemistry,
            &self.qaqc_meta,
            &self.qaqc_geochemistry,
            &self.drillhole_lithology,
            &self.drillhole_structure,
        ]
    }
}
