// Component record types
// One entry of the component table: matching attributes plus storage location

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One coordinate of a storage location (box or LED)
///
/// Files written by hand or by older tools hold numbers or strings, and
/// sometimes floats like `2.0`. Every form is accepted and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    Index(i64),
    Label(String),
    /// Any other JSON value, kept verbatim
    Other(Value),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Label(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Slot {
    fn from(value: i64) -> Self {
        Self::Index(value)
    }
}

impl From<i32> for Slot {
    fn from(value: i32) -> Self {
        Self::Index(i64::from(value))
    }
}

impl From<&str> for Slot {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

/// Component table entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Electrical value or catalog code, stored in canonical form (`10K`, `SPX3819`)
    #[serde(default, deserialize_with = "scalar_text")]
    pub parameter: String,
    /// Package code, may be empty
    #[serde(default, deserialize_with = "scalar_text")]
    pub footprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_id: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_id: Option<Slot>,
    /// Any other attributes found in the file, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentRecord {
    #[cfg(test)]
    pub fn new(
        parameter: impl Into<String>,
        footprint: impl Into<String>,
        box_id: impl Into<Slot>,
        led_id: impl Into<Slot>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            footprint: footprint.into(),
            box_id: Some(box_id.into()),
            led_id: Some(led_id.into()),
            extra: Map::new(),
        }
    }
}

/// Text attribute: `null` reads as empty, numbers and booleans as their JSON text
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Ok(v.to_string()),
        Value::Array(_) | Value::Object(_) => {
            Err(de::Error::custom("expected a string, number or null"))
        }
    }
}
