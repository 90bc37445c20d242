// STD Imports
use std::fmt;

// Third party library imports
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod response;
pub mod table;

pub use error::Error;
pub use table::Table;

// These describe what a column holds. They are computed once when a table is
// built and travel with it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
    Other, // mixed, booleans, dates, or nothing but nulls
}

impl ColumnType {
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut seen = None;
        for value in values {
            let kind = match value {
                Value::Null => continue,
                Value::Integer(_) | Value::Float(_) => ColumnType::Numeric,
                Value::Text(_) => ColumnType::Text,
                Value::Boolean(_) => return ColumnType::Other,
            };
            match seen {
                None => seen = Some(kind),
                Some(previous) if previous != kind => return ColumnType::Other,
                Some(_) => {}
            }
        }
        seen.unwrap_or(ColumnType::Other)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => f.pad("numeric"),
            ColumnType::Text => f.pad("text"),
            ColumnType::Other => f.pad("other"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

/// Hashable, totally ordered view of a non-null [`Value`].
///
/// Integers and floats share the `Number` variant so `2` and `2.0` land on the
/// same key when joining, filtering or grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Number(OrderedFloat<f64>),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Types a raw cell the way the file readers do.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Integer(int);
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            if float.is_finite() {
                return Value::Float(float);
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => Value::Text(raw.to_owned()),
        }
    }

    /// Reads user input as a value of a column of type `column_type`.
    pub fn coerce(raw: &str, column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Numeric => match Value::infer(raw) {
                number @ (Value::Integer(_) | Value::Float(_) | Value::Null) => number,
                _ => Value::Text(raw.to_owned()),
            },
            ColumnType::Text => Value::Text(raw.to_owned()),
            ColumnType::Other => Value::infer(raw),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<ValueKey> {
        match self {
            Value::Null => None,
            Value::Integer(int) => Some(ValueKey::Number(OrderedFloat(*int as f64))),
            // -0.0 and 0.0 must hash the same
            Value::Float(float) => Some(ValueKey::Number(OrderedFloat(*float + 0.0))),
            Value::Text(text) => Some(ValueKey::Text(text.clone())),
            Value::Boolean(flag) => Some(ValueKey::Boolean(*flag)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::Text(text) => f.write_str(text),
            Value::Boolean(flag) => write!(f, "{}", flag),
        }
    }
}

pub type ColumnHeader = (String, ColumnType);
pub type TableInfo = Vec<ColumnHeader>;
pub type Row = Vec<Value>;

/// Business area a table belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Finance,
    Sales,
    HR,
    Logistics,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Finance, Domain::Sales, Domain::HR, Domain::Logistics];
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Finance => "Finance",
            Domain::Sales => "Sales",
            Domain::HR => "HR",
            Domain::Logistics => "Logistics",
        };
        f.pad(name)
    }
}

impl std::str::FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::ParseError(format!(
                    "Unknown domain '{}', expected one of Finance, Sales, HR, Logistics",
                    s
                ))
            })
    }
}
