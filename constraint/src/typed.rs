//! Codec driven by attribute constraints.

use chrono::{DateTime, NaiveDate, SecondsFormat};
use regex_lite::Regex;
use serde_json::{Number, Value};

use cascade_core::{Attribute, Constraint, DataDocument};

use crate::codec::ConstraintCodec;
use crate::error::{ConstraintError, ConstraintResult};

const NUMBER_PATTERN: &str = r"^[+-]?\d+(\.\d+)?$";
const PERCENT_PATTERN: &str = r"^([+-]?\d+(?:\.\d+)?)\s*%$";

/// Codec that converts text input according to each attribute's constraint.
///
/// | constraint   | stored form                | decoded form       |
/// |--------------|----------------------------|--------------------|
/// | `Number`     | JSON number                | JSON number        |
/// | `Boolean`    | JSON bool                  | JSON bool          |
/// | `Percentage` | fraction (`"45%"` -> 0.45) | `"45%"`            |
/// | `DateTime`   | epoch milliseconds         | RFC 3339 string    |
///
/// Attributes without a constraint, unknown attribute ids and values that do
/// not parse are passed through unchanged.
#[derive(Debug, Clone)]
pub struct TypedCodec {
    number: Regex,
    percent: Regex,
}

impl TypedCodec {
    pub fn new() -> ConstraintResult<Self> {
        Ok(Self {
            number: compile(NUMBER_PATTERN)?,
            percent: compile(PERCENT_PATTERN)?,
        })
    }

    fn encode_value(&self, constraint: Constraint, value: &Value) -> Value {
        let Value::String(text) = value else {
            return value.clone();
        };
        let text = text.trim();
        let encoded = match constraint {
            Constraint::Text => None,
            Constraint::Number => self.parse_number(text).map(Value::Number),
            Constraint::Boolean => parse_bool(text).map(Value::Bool),
            Constraint::Percentage => self.parse_percent(text),
            Constraint::DateTime => parse_datetime_millis(text).map(Value::from),
        };
        encoded.unwrap_or_else(|| value.clone())
    }

    fn decode_value(&self, constraint: Constraint, value: &Value) -> Value {
        match (constraint, value) {
            (Constraint::Percentage, Value::Number(n)) => match n.as_f64() {
                Some(fraction) => Value::String(format!("{}%", format_decimal(fraction * 100.0))),
                None => value.clone(),
            },
            (Constraint::DateTime, Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)))
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        }
    }

    fn parse_number(&self, text: &str) -> Option<Number> {
        if !self.number.is_match(text) {
            return None;
        }
        if let Ok(integer) = text.parse::<i64>() {
            return Some(Number::from(integer));
        }
        text.parse::<f64>().ok().and_then(Number::from_f64)
    }

    fn parse_percent(&self, text: &str) -> Option<Value> {
        let digits = match self.percent.captures(text) {
            Some(captures) => captures.get(1)?.as_str(),
            None if self.number.is_match(text) => text,
            None => return None,
        };
        let percent = digits.parse::<f64>().ok()?;
        Number::from_f64(percent / 100.0).map(Value::Number)
    }
}

impl ConstraintCodec for TypedCodec {
    fn encode(&self, attributes: &[Attribute], raw: &DataDocument) -> DataDocument {
        raw.iter()
            .map(|(key, value)| {
                let encoded = match constraint_of(attributes, key) {
                    Some(constraint) => self.encode_value(constraint, value),
                    None => value.clone(),
                };
                (key.clone(), encoded)
            })
            .collect()
    }

    fn decode(&self, attributes: &[Attribute], stored: &DataDocument) -> DataDocument {
        stored
            .iter()
            .map(|(key, value)| {
                let decoded = match constraint_of(attributes, key) {
                    Some(constraint) => self.decode_value(constraint, value),
                    None => value.clone(),
                };
                (key.clone(), decoded)
            })
            .collect()
    }
}

fn compile(pattern: &str) -> ConstraintResult<Regex> {
    Regex::new(pattern).map_err(|e| ConstraintError::invalid_pattern(pattern, e.to_string()))
}

fn constraint_of(attributes: &[Attribute], key: &str) -> Option<Constraint> {
    attributes
        .iter()
        .find(|a| a.id.as_str() == key)
        .and_then(|a| a.constraint)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime_millis(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Format without float noise: 45.00000000000001 -> "45", 12.5 -> "12.5".
fn format_decimal(value: f64) -> String {
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::data;
    use pretty_assertions::assert_eq;

    fn schema() -> Vec<Attribute> {
        vec![
            Attribute::new("n", "Amount").with_constraint(Constraint::Number),
            Attribute::new("b", "Done").with_constraint(Constraint::Boolean),
            Attribute::new("p", "Progress").with_constraint(Constraint::Percentage),
            Attribute::new("d", "Due").with_constraint(Constraint::DateTime),
            Attribute::new("t", "Title").with_constraint(Constraint::Text),
        ]
    }

    #[test]
    fn test_encode_by_constraint() {
        // GIVEN
        let codec = TypedCodec::new().unwrap();
        let raw = data! {
            "n" => "42",
            "b" => "yes",
            "p" => "45%",
            "d" => "2024-01-02",
            "t" => "12",
            "x" => "7",
        };

        // WHEN
        let stored = codec.encode(&schema(), &raw);

        // THEN
        assert_eq!(
            stored,
            data! {
                "n" => 42,
                "b" => true,
                "p" => 0.45,
                "d" => 1_704_153_600_000_i64,
                "t" => "12",
                "x" => "7",
            }
        );
    }

    #[test]
    fn test_decode_percentage_and_datetime() {
        // GIVEN
        let codec = TypedCodec::new().unwrap();
        let stored = data! { "p" => 0.45, "d" => 1_704_153_600_000_i64, "n" => 3.5 };

        // WHEN
        let decoded = codec.decode(&schema(), &stored);

        // THEN
        assert_eq!(
            decoded,
            data! { "p" => "45%", "d" => "2024-01-02T00:00:00.000Z", "n" => 3.5 }
        );
    }

    #[test]
    fn test_unparseable_values_pass_through() {
        let codec = TypedCodec::new().unwrap();
        let raw = data! { "n" => "four", "b" => "maybe", "d" => "soon" };

        let stored = codec.encode(&schema(), &raw);

        assert_eq!(stored, raw);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(45.00000000000001), "45");
        assert_eq!(format_decimal(12.5), "12.5");
    }
}
