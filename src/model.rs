use chrono::{Days, NaiveDate};
use oxigraph::model::NamedNode;
use serde::Serialize;
use std::fmt;

/// A non-empty cell as handed over by the workbook-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Text rendering used for identifiers and free-text fields.
    ///
    /// Whole numbers render without a fractional part so that an ID typed as
    /// `12345` in a numeric cell reads back as `"12345"`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(number) => format_number(*number),
            CellValue::Bool(flag) => flag.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) if number.is_finite() => Some(*number),
            CellValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        let number = self.as_number()?;
        if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
            Some(number as i64)
        } else {
            None
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(date) => Some(*date),
            CellValue::Number(serial) => excel_serial_to_date(*serial),
            CellValue::Text(text) => parse_date_text(text.trim()),
            CellValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Excel 1900 date system. Day 60 is the phantom 1900-02-29, so serials from
/// 61 onwards count from 1899-12-30.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.trunc() as u64;
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    // datetimes exported as text keep only their date part
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

/// A field value after type conversion and, for coded fields, resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    /// A controlled code together with the concept it resolved to
    Concept { code: String, iri: NamedNode },
    /// A key into a registry exported by an earlier sheet
    Reference(String),
    /// An assay result, possibly censored at a detection limit
    Measurement(Measurement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Censor {
    /// `<n`: below the lower detection limit
    Below,
    /// `>n`: above the upper detection limit
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub censor: Option<Censor>,
}

impl Measurement {
    /// Reads `12.5`, `<0.01` or `>1000`.
    pub fn parse(cell: &CellValue) -> Option<Self> {
        if let Some(value) = cell.as_number() {
            return Some(Self { value, censor: None });
        }
        let text = cell.as_text();
        let (censor, rest) = match text.chars().next()? {
            '<' => (Censor::Below, &text[1..]),
            '>' => (Censor::Above, &text[1..]),
            _ => return None,
        };
        let value = rest.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self {
            value,
            censor: Some(censor),
        })
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.censor {
            Some(Censor::Below) => write!(f, "<{}", format_number(self.value)),
            Some(Censor::Above) => write!(f, ">{}", format_number(self.value)),
            None => f.write_str(&format_number(self.value)),
        }
    }
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Number(value) => Some(*value),
            FieldValue::Measurement(measurement) => Some(measurement.value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) | FieldValue::Reference(text) => f.write_str(text),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Number(value) => f.write_str(&format_number(*value)),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Concept { code, .. } => f.write_str(code),
            FieldValue::Measurement(measurement) => write!(f, "{measurement}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_render_as_integers() {
        assert_eq!(CellValue::Number(12345.0).as_text(), "12345");
        assert_eq!(CellValue::Number(0.05).as_text(), "0.05");
        assert_eq!(CellValue::Number(-45.0).as_integer(), Some(-45));
        assert_eq!(CellValue::Number(1.5).as_integer(), None);
    }

    #[test]
    fn dates_from_serials_and_text() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 15);
        assert_eq!(CellValue::Number(45245.0).as_date(), expected);
        assert_eq!(CellValue::Text("2023-11-15".into()).as_date(), expected);
        assert_eq!(CellValue::Text("15/11/2023".into()).as_date(), expected);
        assert_eq!(CellValue::Text("2023-11-15T00:00:00".into()).as_date(), expected);
        assert_eq!(CellValue::Text("hello".into()).as_date(), None);
        assert_eq!(
            excel_serial_to_date(1.0),
            NaiveDate::from_ymd_opt(1900, 1, 1)
        );
    }

    #[test]
    fn censored_measurements() {
        let below = Measurement::parse(&CellValue::Text("<0.01".into()));
        assert_eq!(
            below,
            Some(Measurement {
                value: 0.01,
                censor: Some(Censor::Below)
            })
        );
        let plain = Measurement::parse(&CellValue::Number(12.5));
        assert_eq!(plain.map(|m| m.censor), Some(None));
        assert_eq!(Measurement::parse(&CellValue::Text("trace".into())), None);
        assert_eq!(
            Measurement::parse(&CellValue::Text(">1000".into())).map(|m| m.to_string()),
            Some(">1000".to_string())
        );
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert_eq!(CellValue::Text("NaN".into()).as_number(), None);
        assert_eq!(CellValue::Text("inf".into()).as_number(), None);
        assert_eq!(CellValue::Number(f64::INFINITY).as_number(), None);
    }
}
