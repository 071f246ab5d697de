use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::invoke::MethodSpec;
use crate::types::AddressBook;

pub const SETTINGS_ENV: &str = "METHOD_PROMPTS_SETTINGS";
pub const NON_INTERACTIVE_ENV: &str = "METHOD_PROMPTS_NON_INTERACTIVE";

/// Host settings, read from a TOML file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub non_interactive: bool,
    pub verbose: bool,
    pub accounts: Vec<String>,
    pub aliases: BTreeMap<String, String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("unable to read settings file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid settings file: {}", path.display()))
    }

    /// Loads the explicit file, else `$METHOD_PROMPTS_SETTINGS`, else
    /// `~/.method-prompts/settings.toml` when present. Environment overrides
    /// are applied last.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match settings_path(explicit) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(flag) = env_flag(NON_INTERACTIVE_ENV) {
            settings.non_interactive = flag;
        }
        Ok(settings)
    }

    pub fn address_book(&self) -> AddressBook {
        AddressBook {
            accounts: self.accounts.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = env::var(SETTINGS_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let default = dirs::home_dir()?.join(".method-prompts").join("settings.toml");
    default.is_file().then_some(default)
}

/// Reads a boolean environment switch; unset or unrecognised yields `None`.
pub fn env_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parses a YAML or JSON method document: one method or `{methods: [...]}`.
pub fn parse_methods(content: &str) -> Result<Vec<MethodSpec>> {
    let doc: Value = serde_yaml::from_str(content).context("invalid YAML/JSON method document")?;
    match doc.get("methods") {
        Some(list) => serde_json::from_value(list.clone()).context("invalid `methods` list"),
        None => {
            let method: MethodSpec =
                serde_json::from_value(doc).context("invalid method definition")?;
            Ok(vec![method])
        }
    }
}

pub fn load_methods(path: &Path) -> Result<Vec<MethodSpec>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read method file: {}", path.display()))?;
    parse_methods(&content).with_context(|| format!("in method file {}", path.display()))
}

/// Picks a method by name, or the only one when no name is given.
pub fn select_method(methods: Vec<MethodSpec>, name: Option<&str>) -> Result<MethodSpec> {
    match name {
        Some(name) => methods
            .into_iter()
            .find(|method| method.name == name)
            .ok_or_else(|| anyhow!("method not found: {name}")),
        None => {
            let count = methods.len();
            let mut iter = methods.into_iter();
            match (iter.next(), count) {
                (Some(method), 1) => Ok(method),
                (None, _) => Err(anyhow!("the method file declares no methods")),
                _ => Err(anyhow!("the method file declares {count} methods; pick one with --name")),
            }
        }
    }
}

/// Reads a JSON object of given values from a file, or stdin for `-`.
pub fn load_given(source: &str) -> Result<Map<String, Value>> {
    let content = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read given values from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("unable to read {source}"))?
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(&content).with_context(|| format!("invalid JSON in {source}"))? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("given values must be a JSON object, got {other}")),
    }
}

/// Parses `name=value`; the value is JSON when it parses, else a string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("missing name in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Like [`parse_assignment`], but `key=default` becomes a default directive.
pub fn parse_tx_assignment(raw: &str) -> Result<(String, Value)> {
    let (name, value) = parse_assignment(raw)?;
    if value == Value::String("default".to_string()) {
        return Ok((name, json!({ "actionType": "default" })));
    }
    Ok((name, value))
}
