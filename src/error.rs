//! Error taxonomy for workbook conversion
//!
//! This module provides:
//! - `ConversionError`, the single error a failed conversion returns
//! - `Provenance`, the sheet/row/field location every row-level error carries
//! - `ErrorKind`, stable codes and categories for logs and exit handling

use serde::Serialize;
use std::fmt;
use strum::{AsRefStr, Display};

// =============================================================================
// PROVENANCE
// =============================================================================

/// Where in the workbook a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Worksheet name, e.g. `DRILLHOLE_LOCATION`
    pub sheet: String,
    /// 1-based row number
    pub row: u32,
    /// Field (column header) name, e.g. `DRILL_TYPE`
    pub field: String,
}

impl Provenance {
    pub fn new(sheet: impl Into<String>, row: u32, field: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            field: field.into(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in row {} of sheet {}",
            self.field, self.row, self.sheet
        )
    }
}

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Stable identifiers for each failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum ErrorKind {
    MissingRequiredField,
    ValueOutOfRange,
    InvalidOrdering,
    InvalidValue,
    CodeNotFound,
    CodeListMismatch,
    UnknownReference,
    DuplicateKey,
    ProjectionError,
    UnsupportedTemplateVersion,
    MissingSheet,
    Workbook,
}

impl ErrorKind {
    /// Numeric code, stable across releases
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::MissingRequiredField => 100,
            ErrorKind::ValueOutOfRange => 101,
            ErrorKind::InvalidOrdering => 102,
            ErrorKind::InvalidValue => 103,
            ErrorKind::CodeNotFound => 200,
            ErrorKind::CodeListMismatch => 201,
            ErrorKind::UnknownReference => 300,
            ErrorKind::DuplicateKey => 301,
            ErrorKind::ProjectionError => 400,
            ErrorKind::UnsupportedTemplateVersion => 500,
            ErrorKind::MissingSheet => 501,
            ErrorKind::Workbook => 600,
        }
    }

    /// Coarse grouping used in structured logs
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField
            | ErrorKind::ValueOutOfRange
            | ErrorKind::InvalidOrdering
            | ErrorKind::InvalidValue => "field",
            ErrorKind::CodeNotFound | ErrorKind::CodeListMismatch => "vocabulary",
            ErrorKind::UnknownReference | ErrorKind::DuplicateKey => "reference",
            ErrorKind::ProjectionError => "geometry",
            ErrorKind::UnsupportedTemplateVersion | ErrorKind::MissingSheet => "template",
            ErrorKind::Workbook => "io",
        }
    }
}

// =============================================================================
// CONVERSION ERROR
// =============================================================================

/// The first violation found while converting a workbook.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("For each row in the {} worksheet, you must supply a {} value (row {})", .at.sheet, .at.field, .at.row)]
    MissingRequiredField { at: Provenance },

    #[error("The value {value} for {at} is not within {range} as required")]
    ValueOutOfRange {
        at: Provenance,
        value: String,
        range: String,
    },

    #[error("The value {value} for {at} is not {relation} as required")]
    InvalidOrdering {
        at: Provenance,
        value: String,
        relation: String,
    },

    #[error("The value {value} for {at} is not {expected} as required")]
    InvalidValue {
        at: Provenance,
        value: String,
        expected: String,
    },

    #[error("The value {code} for {at} is not a known code in the {code_list} lookup list")]
    CodeNotFound {
        at: Provenance,
        code: String,
        code_list: String,
    },

    #[error(
        "The value {code} for {at} is not within the {code_list} lookup list (it belongs to {found})"
    )]
    CodeListMismatch {
        at: Provenance,
        code: String,
        code_list: String,
        found: String,
    },

    #[error("The value {value} for {at} is not present on {target} as required")]
    UnknownReference {
        at: Provenance,
        value: String,
        target: String,
    },

    #[error("The value {value} for {at} was already defined as {first}")]
    DuplicateKey {
        at: Provenance,
        value: String,
        first: Provenance,
    },

    #[error("Coordinates for {at} cannot be projected: {reason}")]
    Projection { at: Provenance, reason: String },

    #[error(
        "The workbook declares template version {found} but only versions {supported} are supported"
    )]
    UnsupportedTemplateVersion { found: String, supported: String },

    #[error("The workbook has no {sheet} worksheet")]
    MissingSheet { sheet: String },

    #[error("Workbook could not be read: {0}")]
    Workbook(String),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            ConversionError::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            ConversionError::InvalidOrdering { .. } => ErrorKind::InvalidOrdering,
            ConversionError::InvalidValue { .. } => ErrorKind::InvalidValue,
            ConversionError::CodeNotFound { .. } => ErrorKind::CodeNotFound,
            ConversionError::CodeListMismatch { .. } => ErrorKind::CodeListMismatch,
            ConversionError::UnknownReference { .. } => ErrorKind::UnknownReference,
            ConversionError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            ConversionError::Projection { .. } => ErrorKind::ProjectionError,
            ConversionError::UnsupportedTemplateVersion { .. } => {
                ErrorKind::UnsupportedTemplateVersion
            }
            ConversionError::MissingSheet { .. } => ErrorKind::MissingSheet,
            ConversionError::Workbook(_) => ErrorKind::Workbook,
        }
    }

    /// Location of the offending cell, when the error is tied to one
    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            ConversionError::MissingRequiredField { at }
            | ConversionError::ValueOutOfRange { at, .. }
            | ConversionError::InvalidOrdering { at, .. }
            | ConversionError::InvalidValue { at, .. }
            | ConversionError::CodeNotFound { at, .. }
            | ConversionError::CodeListMismatch { at, .. }
            | ConversionError::UnknownReference { at, .. }
            | ConversionError::DuplicateKey { at, .. }
            | ConversionError::Projection { at, .. } => Some(at),
            ConversionError::UnsupportedTemplateVersion { .. }
            | ConversionError::MissingSheet { .. }
            | ConversionError::Workbook(_) => None,
        }
    }

    pub fn missing(at: Provenance) -> Self {
        ConversionError::MissingRequiredField { at }
    }

    pub fn invalid(at: Provenance, value: impl fmt::Display, expected: impl Into<String>) -> Self {
        ConversionError::InvalidValue {
            at,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub fn unknown_reference(
        at: Provenance,
        value: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        ConversionError::UnknownReference {
            at,
            value: value.into(),
            target: target.into(),
        }
    }
}

pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
