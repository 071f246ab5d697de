use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PromptError, ResolveError, ResolveResult};
use crate::prompt::{InputRequest, PromptKind};
use crate::registry::Context;
use crate::spec::FieldSpec;
use crate::value::{display_raw, ResolvedValue, Validation};

/// Where a value is being resolved: a field or an element inside one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub message: String,
}

impl Slot {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn of(field: &FieldSpec) -> Self {
        Self::new(field.name.clone(), field.prompt_message())
    }

    /// A nested slot for position `index`, e.g. `recipients[2]`.
    pub fn element(&self, index: usize, message: impl Into<String>) -> Self {
        Self::new(format!("{}[{index}]", self.name), message)
    }
}

/// Null and missing given values are both "absent".
pub(crate) fn present(given: Option<&Value>) -> Option<&Value> {
    given.filter(|value| !value.is_null())
}

/// Given-or-prompt for a single scalar.
///
/// A valid given value is returned without prompting. An invalid one is
/// logged and then used to seed the prompt. Prompting fails with
/// `InteractionRequiredButDisabled` in non-interactive mode.
pub fn resolve_scalar(
    ctx: &mut Context,
    slot: &Slot,
    tag: &str,
    given: Option<&Value>,
) -> ResolveResult<ResolvedValue> {
    let validator = ctx.lookup(tag)?;

    let mut seed = None;
    if let Some(raw) = present(given) {
        match validator.check(raw) {
            Validation::Valid(value) => {
                debug!(field = %slot.name, %value, "using given value");
                return Ok(value);
            }
            Validation::Invalid(reason) => {
                warn!(field = %slot.name, given = %raw, "{reason}");
                seed = Some(raw.clone());
            }
        }
    }

    ctx.ensure_interactive(&slot.name)?;

    match validator.prompt_kind() {
        PromptKind::Confirm => {
            let default = seed.as_ref().and_then(Value::as_bool).unwrap_or(false);
            let answer = ctx
                .prompt_mut()
                .confirm(&slot.message, default)
                .map_err(|err| ResolveError::from_prompt(&slot.name, err))?;
            match validator.check(&Value::Bool(answer)) {
                Validation::Valid(value) => Ok(value),
                Validation::Invalid(_) => Ok(ResolvedValue::Bool(answer)),
            }
        }
        PromptKind::Text => {
            let initial = seed.as_ref().map(display_raw);
            let request = InputRequest {
                field: &slot.name,
                message: &slot.message,
                initial: initial.as_deref(),
            };
            let mut check = |text: &str| match validator.check(&Value::String(text.to_string())) {
                Validation::Valid(_) => Ok(()),
                Validation::Invalid(reason) => Err(reason),
            };
            let answer = ctx
                .prompt_mut()
                .input(&request, &mut check)
                .map_err(|err| ResolveError::from_prompt(&slot.name, err))?;
            match validator.check(&Value::String(answer)) {
                Validation::Valid(value) => Ok(value),
                Validation::Invalid(reason) => Err(ResolveError::Prompt {
                    field: slot.name.clone(),
                    source: PromptError::Rejected(reason),
                }),
            }
        }
    }
}

/// Yes/no question outside of any field, gated like every other prompt.
pub fn confirm(ctx: &mut Context, slot: &Slot, message: &str) -> ResolveResult<bool> {
    ctx.ensure_interactive(&slot.name)?;
    ctx.prompt_mut()
        .confirm(message, false)
        .map_err(|err| ResolveError::from_prompt(&slot.name, err))
}
