//! Typed records built from vendor responses.
//!
//! # Design
//! Every field has a documented default so a sparse response still maps.
//! The vendor is loose about JSON types (numbers arrive quoted, IDs arrive
//! unquoted, one-element lists arrive as bare objects); the `de` helpers
//! absorb that at the serde layer so the records themselves stay plain.

pub mod batch;
pub mod employee;
pub mod timesheet;
pub mod timesheet_upload;

pub use batch::{BatchListEntry, BatchStatus, PayrollBatch};
pub use employee::Employee;
pub use timesheet::Timesheet;
pub use timesheet_upload::TimesheetUpload;

pub(crate) mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::response::scalar_string;

    /// String or number; null becomes "".
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        match value {
            Value::Null => Ok(String::new()),
            other => scalar_string(&other)
                .ok_or_else(|| D::Error::custom(format!("expected a string, got {other}"))),
        }
    }

    /// Like `string`, but null stays `None`.
    pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        match value {
            Value::Null => Ok(None),
            other => scalar_string(&other)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a string, got {other}"))),
        }
    }

    /// Number or numeric string; null and "" become 0.0.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(0.0),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom("number out of range")),
            Value::String(s) if s.trim().is_empty() => Ok(0.0),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got '{s}'"))),
            other => Err(D::Error::custom(format!("expected a number, got {other}"))),
        }
    }

    /// Integer or integer string; null and "" become 0. Fractional values
    /// are rejected in either form.
    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(0),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(i),
                None => whole(n.as_f64(), &n.to_string()).map_err(D::Error::custom),
            },
            Value::String(s) if s.trim().is_empty() => Ok(0),
            Value::String(s) => {
                let trimmed = s.trim();
                match trimmed.parse::<i64>() {
                    Ok(i) => Ok(i),
                    Err(_) => whole(trimmed.parse().ok(), &s).map_err(D::Error::custom),
                }
            }
            other => Err(D::Error::custom(format!("expected an integer, got {other}"))),
        }
    }

    fn whole(value: Option<f64>, raw: &str) -> Result<i64, String> {
        match value {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Ok(f as i64)
            }
            _ => Err(format!("expected an integer, got '{raw}'")),
        }
    }

    /// Import failures: an array is taken as-is and a non-empty object is
    /// one failure. Null, `{}` and scalars mean no failures.
    pub fn failures<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items,
            Value::Object(map) if !map.is_empty() => vec![Value::Object(map)],
            _ => Vec::new(),
        })
    }
}
