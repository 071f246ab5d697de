use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::arguments::resolve_arguments;
use crate::error::ResolveError;
use crate::registry::Context;
use crate::spec::FieldSpec;
use crate::tx_options::{resolve_tx_options, validate_tx_options, TxOptionSpecs, TxOptions};
use crate::value::ResolvedValue;

/// `Call` reads without changing state; `Send` submits a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Call,
    Send,
}

/// A contract method together with the parameters it needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSpec {
    pub name: String,
    pub kind: MethodKind,
    #[serde(default)]
    pub arguments: Vec<FieldSpec>,
    #[serde(default)]
    pub tx_options: TxOptionSpecs,
}

impl MethodSpec {
    pub fn call(name: impl Into<String>, arguments: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Call,
            arguments,
            tx_options: TxOptionSpecs::new(),
        }
    }

    pub fn send(name: impl Into<String>, arguments: Vec<FieldSpec>, tx_options: TxOptionSpecs) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Send,
            arguments,
            tx_options,
        }
    }
}

/// The remote side that actually performs reads and writes.
pub trait Transport {
    fn read(&mut self, target: &str, method: &str, args: &[ResolvedValue]) -> anyhow::Result<Value>;

    fn write(
        &mut self,
        target: &str,
        method: &str,
        args: &[ResolvedValue],
        tx_options: &TxOptions,
    ) -> anyhow::Result<Value>;
}

/// Echoes the resolved call instead of performing it.
#[derive(Clone, Debug, Default)]
pub struct DryRunTransport;

impl DryRunTransport {
    fn describe(kind: MethodKind, target: &str, method: &str, args: &[ResolvedValue]) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("kind".to_string(), json!(kind));
        payload.insert("target".to_string(), Value::String(target.to_string()));
        payload.insert("method".to_string(), Value::String(method.to_string()));
        payload.insert(
            "arguments".to_string(),
            Value::Array(args.iter().map(ResolvedValue::to_json).collect()),
        );
        payload
    }
}

impl Transport for DryRunTransport {
    fn read(&mut self, target: &str, method: &str, args: &[ResolvedValue]) -> anyhow::Result<Value> {
        Ok(Value::Object(Self::describe(MethodKind::Call, target, method, args)))
    }

    fn write(
        &mut self,
        target: &str,
        method: &str,
        args: &[ResolvedValue],
        tx_options: &TxOptions,
    ) -> anyhow::Result<Value> {
        let mut payload = Self::describe(MethodKind::Send, target, method, args);
        payload.insert("txOptions".to_string(), tx_options.to_json());
        Ok(Value::Object(payload))
    }
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("operation failed: {0:#}")]
    Operation(anyhow::Error),
}

type SuccessHandler<'h> = Box<dyn FnMut(Value) + 'h>;
type ErrorHandler<'h> = Box<dyn FnMut(&InvokeError) + 'h>;

/// Callbacks receiving the outcome of an invocation.
#[derive(Default)]
pub struct Handlers<'h> {
    on_success: Option<SuccessHandler<'h>>,
    on_error: Option<ErrorHandler<'h>>,
}

impl<'h> Handlers<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, handler: impl FnMut(Value) + 'h) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl FnMut(&InvokeError) + 'h) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvokeStatus {
    Succeeded,
    Failed,
}

/// Given arguments and tx options for one invocation.
#[derive(Clone, Debug, Default)]
pub struct Given {
    pub arguments: Map<String, Value>,
    pub tx_options: Map<String, Value>,
}

fn perform(
    ctx: &mut Context,
    transport: &mut dyn Transport,
    target: &str,
    method: &MethodSpec,
    given: &Given,
) -> Result<Value, InvokeError> {
    if method.kind == MethodKind::Send {
        validate_tx_options(ctx, &method.tx_options, &given.tx_options)?;
    }
    let args = resolve_arguments(ctx, &method.arguments, &given.arguments)?;
    match method.kind {
        MethodKind::Call => {
            if ctx.is_verbose() {
                info!(method = %method.name, %target, ?args, "Invoking CALL method");
            }
            transport
                .read(target, &method.name, &args)
                .map_err(InvokeError::Operation)
        }
        MethodKind::Send => {
            let tx_options = resolve_tx_options(ctx, &method.tx_options, &given.tx_options)?;
            if ctx.is_verbose() {
                info!(
                    method = %method.name,
                    %target,
                    ?args,
                    tx_options = %tx_options.to_json(),
                    "Invoking SEND method"
                );
            }
            transport
                .write(target, &method.name, &args, &tx_options)
                .map_err(InvokeError::Operation)
        }
    }
}

/// Resolves a method's parameters and runs it through `transport`.
///
/// Failures never propagate: they go to the error handler, or are logged and
/// swallowed when there is none, so a host loop can keep going.
pub fn invoke(
    ctx: &mut Context,
    transport: &mut dyn Transport,
    target: &str,
    method: &MethodSpec,
    given: &Given,
    mut handlers: Handlers<'_>,
) -> InvokeStatus {
    match perform(ctx, transport, target, method, given) {
        Ok(result) => {
            if let Some(handler) = handlers.on_success.as_mut() {
                handler(result);
            }
            InvokeStatus::Succeeded
        }
        Err(err) => {
            match handlers.on_error.as_mut() {
                Some(handler) => handler(&err),
                None => error!(method = %method.name, %target, "{err}"),
            }
            InvokeStatus::Failed
        }
    }
}
