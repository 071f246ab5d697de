use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::registry::{TypeRegistry, Validator};
use crate::value::{display_raw, ResolvedValue, Validation};

pub const SMART_ADDRESS: &str = "smart-address";

/// Known accounts, addressable by index or by alias name.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddressBook {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl AddressBook {
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            aliases: BTreeMap::new(),
        }
    }

    pub fn with_alias(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), address.into());
        self
    }
}

/// Resolves an address literal, an account index or an alias to an address.
pub struct SmartAddress {
    book: AddressBook,
    literal: Regex,
}

impl SmartAddress {
    pub fn new(book: AddressBook) -> Self {
        Self {
            book,
            literal: Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"),
        }
    }

    fn by_index(&self, index: u64) -> Option<String> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.book.accounts.get(index))
            .cloned()
    }

    fn resolve(&self, raw: &Value) -> Option<String> {
        match raw {
            Value::Number(number) => number.as_u64().and_then(|index| self.by_index(index)),
            Value::String(text) => {
                if self.literal.is_match(text) {
                    Some(text.clone())
                } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                    text.parse::<u64>().ok().and_then(|index| self.by_index(index))
                } else {
                    self.book.aliases.get(text).cloned()
                }
            }
            _ => None,
        }
    }
}

impl Validator for SmartAddress {
    fn check(&self, raw: &Value) -> Validation {
        match self.resolve(raw) {
            Some(address) => Validation::Valid(ResolvedValue::Address(address)),
            None => Validation::Invalid(format!(
                "Invalid address or account index: {}",
                display_raw(raw)
            )),
        }
    }
}

pub fn register_smart_address(registry: &TypeRegistry, book: AddressBook) {
    registry.register(
        SMART_ADDRESS,
        "An address, an account index or a known account alias",
        SmartAddress::new(book),
    );
}
