use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::bridge::{present, resolve_scalar, Slot};
use crate::error::{ResolveError, ResolveResult};
use crate::prompt::parse_yes_no;
use crate::registry::Context;
use crate::types::address::SMART_ADDRESS;
use crate::value::{ResolvedValue, Validation};

pub const EIP155: &str = "eip155";

/// The closed set of prompt-able transaction options, in resolution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TxOptionKey {
    Account,
    Value,
    Gas,
    GasPrice,
    MaxFeePerGas,
    MaxPriorityFeePerGas,
}

impl TxOptionKey {
    pub const ALL: [TxOptionKey; 6] = [
        TxOptionKey::Account,
        TxOptionKey::Value,
        TxOptionKey::Gas,
        TxOptionKey::GasPrice,
        TxOptionKey::MaxFeePerGas,
        TxOptionKey::MaxPriorityFeePerGas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxOptionKey::Account => "account",
            TxOptionKey::Value => "value",
            TxOptionKey::Gas => "gas",
            TxOptionKey::GasPrice => "gasPrice",
            TxOptionKey::MaxFeePerGas => "maxFeePerGas",
            TxOptionKey::MaxPriorityFeePerGas => "maxPriorityFeePerGas",
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            TxOptionKey::Account => SMART_ADDRESS,
            _ => "uint256",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            TxOptionKey::Account => "Which account (address or index) sends the transaction?",
            TxOptionKey::Value => "How much native currency (in wei) do you want to send along?",
            TxOptionKey::Gas => "What's the gas limit for the transaction?",
            TxOptionKey::GasPrice => "What's the gas price (in wei)?",
            TxOptionKey::MaxFeePerGas => "What's the max. fee per gas (in wei)?",
            TxOptionKey::MaxPriorityFeePerGas => "What's the max. priority fee per gas (in wei)?",
        }
    }

    pub fn parse(name: &str) -> ResolveResult<Self> {
        if name == "from" {
            return Err(ResolveError::config(
                "the `from` tx option is not supported; use `account` instead",
            ));
        }
        TxOptionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == name)
            .ok_or_else(|| ResolveError::config(format!("unknown tx option: {name}")))
    }
}

impl fmt::Display for TxOptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnAbsent {
    Default,
    Prompt,
}

/// Per-option policy: what to do when the caller gave nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TxOptionSpec {
    pub on_absent: OnAbsent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl TxOptionSpec {
    pub fn prompt() -> Self {
        Self {
            on_absent: OnAbsent::Prompt,
            default: None,
        }
    }

    pub fn default_to(value: Option<Value>) -> Self {
        Self {
            on_absent: OnAbsent::Default,
            default: value,
        }
    }
}

/// The options a method accepts. An empty set accepts no tx options at all.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct TxOptionSpecs(BTreeMap<TxOptionKey, TxOptionSpec>);

impl TxOptionSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: TxOptionKey, spec: TxOptionSpec) -> Self {
        self.0.insert(key, spec);
        self
    }

    pub fn get(&self, key: TxOptionKey) -> Option<&TxOptionSpec> {
        self.0.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TxOptionKey, &TxOptionSpec)> {
        self.0.iter()
    }

    /// Parses a `{key: {onAbsent, default?}}` document.
    pub fn from_value(value: &Value) -> ResolveResult<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Self::try_from(map.clone()),
            other => Err(ResolveError::config(format!(
                "tx option specs must be an object, got {other}"
            ))),
        }
    }
}

impl TryFrom<Map<String, Value>> for TxOptionSpecs {
    type Error = ResolveError;

    fn try_from(map: Map<String, Value>) -> ResolveResult<Self> {
        let mut specs = BTreeMap::new();
        for (name, raw) in map {
            let key = TxOptionKey::parse(&name)?;
            let spec: TxOptionSpec = serde_json::from_value(raw).map_err(|err| {
                ResolveError::config(format!("invalid spec for tx option `{name}`: {err}"))
            })?;
            specs.insert(key, spec);
        }
        Ok(Self(specs))
    }
}

impl Serialize for TxOptionSpecs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, spec) in &self.0 {
            map.serialize_entry(key.as_str(), spec)?;
        }
        map.end()
    }
}

/// Forces either a literal value or the configured default.
///
/// Written as `{actionType: "value", value}` or `{actionType: "default"}`.
#[derive(Clone, Debug, PartialEq)]
pub enum MixedDirective {
    Value { value: Value },
    Default,
}

impl MixedDirective {
    pub fn from_map(key: TxOptionKey, map: &Map<String, Value>) -> ResolveResult<Self> {
        let invalid = |detail: &str| {
            ResolveError::config(format!("invalid directive for tx option `{key}`: {detail}"))
        };
        let directive = match map.get("actionType").and_then(Value::as_str) {
            Some("default") => MixedDirective::Default,
            Some("value") => match map.get("value") {
                Some(value) => MixedDirective::Value {
                    value: value.clone(),
                },
                None => return Err(invalid("missing `value`")),
            },
            Some(other) => return Err(invalid(&format!("unknown actionType `{other}`"))),
            None => return Err(invalid("`actionType` must be a string")),
        };
        let allowed = match directive {
            MixedDirective::Value { .. } => &["actionType", "value"][..],
            MixedDirective::Default => &["actionType"][..],
        };
        if let Some(extra) = map.keys().find(|name| !allowed.contains(&name.as_str())) {
            return Err(invalid(&format!("unexpected field `{extra}`")));
        }
        Ok(directive)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum GivenOption {
    Raw(Value),
    Directive(MixedDirective),
}

impl GivenOption {
    fn parse(key: TxOptionKey, raw: &Value) -> ResolveResult<Self> {
        match raw {
            Value::Object(map) if map.contains_key("actionType") => {
                MixedDirective::from_map(key, map).map(GivenOption::Directive)
            }
            other => Ok(GivenOption::Raw(other.clone())),
        }
    }
}

/// Resolved transaction options. Keys never assigned are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOptions {
    values: BTreeMap<TxOptionKey, ResolvedValue>,
    eip155: Option<bool>,
}

impl TxOptions {
    pub fn get(&self, key: TxOptionKey) -> Option<&ResolvedValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: TxOptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn eip155(&self) -> Option<bool> {
        self.eip155
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.eip155.is_none()
    }

    pub fn len(&self) -> usize {
        self.values.len() + usize::from(self.eip155.is_some())
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.values {
            map.insert(key.as_str().to_string(), value.to_json());
        }
        if let Some(flag) = self.eip155 {
            map.insert(EIP155.to_string(), Value::Bool(flag));
        }
        Value::Object(map)
    }
}

impl Serialize for TxOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn parse_eip155(raw: &Value) -> ResolveResult<Option<bool>> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) => parse_yes_no(text).map(Some).ok_or_else(|| {
            ResolveError::config(format!("the `{EIP155}` tx option must be a boolean"))
        }),
        _ => Err(ResolveError::config(format!(
            "the `{EIP155}` tx option must be a boolean"
        ))),
    }
}

/// Checks a configured default without ever prompting.
fn checked_default(ctx: &Context, key: TxOptionKey, raw: &Value) -> ResolveResult<ResolvedValue> {
    match ctx.lookup(key.type_tag())?.check(raw) {
        Validation::Valid(value) => Ok(value),
        Validation::Invalid(reason) => Err(ResolveError::config(format!(
            "invalid default for tx option `{key}`: {reason}"
        ))),
    }
}

/// Given options and configured defaults, checked but not yet resolved.
struct Prepared {
    eip155: Option<bool>,
    given: BTreeMap<TxOptionKey, GivenOption>,
    defaults: BTreeMap<TxOptionKey, ResolvedValue>,
}

fn prepare(ctx: &Context, specs: &TxOptionSpecs, given: &Map<String, Value>) -> ResolveResult<Prepared> {
    let mut prepared = Prepared {
        eip155: None,
        given: BTreeMap::new(),
        defaults: BTreeMap::new(),
    };
    for (name, raw) in given {
        if name == EIP155 {
            prepared.eip155 = parse_eip155(raw)?;
            continue;
        }
        let key = TxOptionKey::parse(name)?;
        if specs.get(key).is_none() {
            return Err(ResolveError::config(format!(
                "tx option `{key}` is not accepted by this method"
            )));
        }
        if present(Some(raw)).is_some() {
            prepared.given.insert(key, GivenOption::parse(key, raw)?);
        }
    }
    for (key, spec) in specs.iter() {
        if let Some(raw) = present(spec.default.as_ref()) {
            prepared.defaults.insert(*key, checked_default(ctx, *key, raw)?);
        }
    }
    Ok(prepared)
}

/// Checks given tx options against `specs` without prompting: unknown keys,
/// `from`, bad directives, invalid defaults and options given but not
/// declared are reported as `InvalidConfiguration`.
pub fn validate_tx_options(
    ctx: &Context,
    specs: &TxOptionSpecs,
    given: &Map<String, Value>,
) -> ResolveResult<()> {
    prepare(ctx, specs, given).map(|_| ())
}

/// Resolves the tx options of one invocation.
///
/// Everything [`validate_tx_options`] checks fails before any prompt.
pub fn resolve_tx_options(
    ctx: &mut Context,
    specs: &TxOptionSpecs,
    given: &Map<String, Value>,
) -> ResolveResult<TxOptions> {
    let Prepared {
        eip155,
        given: mut given_options,
        mut defaults,
    } = prepare(ctx, specs, given)?;
    let mut result = TxOptions {
        values: BTreeMap::new(),
        eip155,
    };

    for key in TxOptionKey::ALL {
        let Some(spec) = specs.get(key) else {
            continue;
        };
        let slot = Slot::new(key.as_str(), key.message());
        let resolved = match given_options.remove(&key) {
            Some(GivenOption::Raw(raw))
            | Some(GivenOption::Directive(MixedDirective::Value { value: raw })) => {
                Some(resolve_scalar(ctx, &slot, key.type_tag(), Some(&raw))?)
            }
            Some(GivenOption::Directive(MixedDirective::Default)) => defaults.remove(&key),
            None => match spec.on_absent {
                OnAbsent::Default => defaults.remove(&key),
                OnAbsent::Prompt => Some(resolve_scalar(ctx, &slot, key.type_tag(), None)?),
            },
        };
        match resolved {
            Some(value) => {
                debug!(option = %key, %value, "tx option resolved");
                result.values.insert(key, value);
            }
            None => debug!(option = %key, "tx option left to the transport"),
        }
    }
    Ok(result)
}
