use std::fmt;

use num_bigint::BigInt;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

/// A fully validated value, typed according to the field it was resolved for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedValue {
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    Address(String),
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            ResolvedValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// JSON rendering; integers become decimal strings and bytes `0x` hex.
    pub fn to_json(&self) -> Value {
        match self {
            ResolvedValue::Int(value) => Value::String(value.to_string()),
            ResolvedValue::Bool(value) => Value::Bool(*value),
            ResolvedValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
            ResolvedValue::Text(text) => Value::String(text.clone()),
            ResolvedValue::Address(address) => Value::String(address.clone()),
            ResolvedValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Int(value) => write!(f, "{value}"),
            ResolvedValue::Bool(value) => write!(f, "{value}"),
            ResolvedValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            ResolvedValue::Text(text) => write!(f, "{text}"),
            ResolvedValue::Address(address) => write!(f, "{address}"),
            ResolvedValue::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResolvedValue::Bool(value) => serializer.serialize_bool(*value),
            ResolvedValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// Outcome of checking a raw value against a scalar rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Valid(ResolvedValue),
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn ok(self) -> Option<ResolvedValue> {
        match self {
            Validation::Valid(value) => Some(value),
            Validation::Invalid(_) => None,
        }
    }
}

/// Renders a raw given value the way an operator would type it.
pub fn display_raw(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
