use regex::Regex;
use serde_json::Value;

use crate::registry::{TypeRegistry, Validator};
use crate::value::{display_raw, ResolvedValue, Validation};

/// `0x`-prefixed hex bytes, optionally of an exact length.
#[derive(Clone, Debug)]
pub struct HexBytes {
    pattern: Regex,
}

impl HexBytes {
    pub fn dynamic() -> Self {
        Self {
            pattern: Regex::new(r"^0x([0-9a-fA-F]{2})*$").expect("valid bytes regex"),
        }
    }

    pub fn fixed(length: usize) -> Self {
        let pattern = format!("^0x[0-9a-fA-F]{{{}}}$", 2 * length);
        Self {
            pattern: Regex::new(&pattern).expect("valid fixed bytes regex"),
        }
    }
}

impl Validator for HexBytes {
    fn check(&self, raw: &Value) -> Validation {
        let invalid = || Validation::Invalid(format!("Invalid bytes array: {}", display_raw(raw)));
        let Some(text) = raw.as_str() else {
            return invalid();
        };
        if !self.pattern.is_match(text) {
            return invalid();
        }
        match hex::decode(&text[2..]) {
            Ok(bytes) => Validation::Valid(ResolvedValue::Bytes(bytes)),
            Err(_) => invalid(),
        }
    }
}

pub fn register_bytes(registry: &TypeRegistry) {
    for length in 1..=32usize {
        registry.register(
            format!("bytes{length}"),
            format!("A packed bytes array of length {length}"),
            HexBytes::fixed(length),
        );
    }
    registry.register("bytes", "An arbitrary bytes array", HexBytes::dynamic());
}
