use std::sync::OnceLock;

use num_bigint::BigInt;
use num_traits::{Num, One, Zero};
use regex::Regex;
use serde_json::Value;

use crate::registry::{TypeRegistry, Validator};
use crate::value::{display_raw, ResolvedValue, Validation};

fn literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^((-?\d+)|(0x[0-9a-fA-F]+))$").expect("valid integer regex"))
}

/// Inclusive integer range check over arbitrary-precision values.
#[derive(Clone, Debug)]
pub struct IntRange {
    min: BigInt,
    max: BigInt,
}

impl IntRange {
    pub fn new(min: BigInt, max: BigInt) -> Self {
        Self { min, max }
    }

    pub fn unsigned(bits: u32) -> Self {
        Self::new(BigInt::zero(), (BigInt::one() << bits) - 1)
    }

    pub fn signed(bits: u32) -> Self {
        let half = BigInt::one() << (bits - 1);
        Self::new(-half.clone(), half - 1)
    }
}

/// Parses a decimal or `0x` hex literal, or a JSON integer of any width.
pub fn parse_int(raw: &Value) -> Option<BigInt> {
    match raw {
        Value::Number(number) => parse_literal(&number.to_string()),
        Value::String(text) => parse_literal(text),
        _ => None,
    }
}

fn parse_literal(text: &str) -> Option<BigInt> {
    if !literal_pattern().is_match(text) {
        return None;
    }
    match text.strip_prefix("0x") {
        Some(digits) => BigInt::from_str_radix(digits, 16).ok(),
        None => BigInt::from_str_radix(text, 10).ok(),
    }
}

impl Validator for IntRange {
    fn check(&self, raw: &Value) -> Validation {
        match parse_int(raw) {
            Some(value) if value >= self.min && value <= self.max => {
                Validation::Valid(ResolvedValue::Int(value))
            }
            _ => Validation::Invalid(format!("Invalid number: {}", display_raw(raw))),
        }
    }
}

pub fn register_integers(registry: &TypeRegistry) {
    for width in 1..=32u32 {
        let bits = width * 8;
        registry.register(
            format!("uint{bits}"),
            format!("An unsigned integer of {bits} bits"),
            IntRange::unsigned(bits),
        );
        registry.register(
            format!("int{bits}"),
            format!("A signed integer of {bits} bits"),
            IntRange::signed(bits),
        );
    }
}
