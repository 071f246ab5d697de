use serde_json::Value;

use crate::prompt::{parse_yes_no, PromptKind};
use crate::registry::{TypeRegistry, Validator};
use crate::value::{display_raw, ResolvedValue, Validation};

/// Yes/no values; prompted with a confirmation instead of free text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Boolean;

impl Validator for Boolean {
    fn check(&self, raw: &Value) -> Validation {
        let parsed = match raw {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => parse_yes_no(text),
            _ => None,
        };
        match parsed {
            Some(flag) => Validation::Valid(ResolvedValue::Bool(flag)),
            None => Validation::Invalid(format!("Invalid boolean: {}", display_raw(raw))),
        }
    }

    fn prompt_kind(&self) -> PromptKind {
        PromptKind::Confirm
    }
}

fn plain_text(raw: &Value) -> Validation {
    match raw {
        Value::String(text) => Validation::Valid(ResolvedValue::Text(text.clone())),
        Value::Number(number) => Validation::Valid(ResolvedValue::Text(number.to_string())),
        Value::Bool(flag) => Validation::Valid(ResolvedValue::Text(flag.to_string())),
        other => Validation::Invalid(format!("Invalid text: {other}")),
    }
}

pub fn register_text(registry: &TypeRegistry) {
    registry.register("string", "An arbitrary text", plain_text);
    registry.register("boolean", "A boolean value (yes/no)", Boolean);
}
