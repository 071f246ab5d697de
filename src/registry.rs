use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::{ResolveError, ResolveResult};
use crate::prompt::{PromptDriver, PromptKind};
use crate::value::Validation;

/// A scalar rule: checks a raw value and, when acceptable, coerces it.
pub trait Validator: Send + Sync {
    fn check(&self, raw: &Value) -> Validation;

    fn prompt_kind(&self) -> PromptKind {
        PromptKind::Text
    }
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Validation + Send + Sync + 'static,
{
    fn check(&self, raw: &Value) -> Validation {
        (self)(raw)
    }
}

struct TypeEntry {
    validator: Arc<dyn Validator>,
    description: String,
}

/// Maps type tags such as `uint256` or `bytes32` to their rules.
///
/// Clones share the same table. Registering a tag twice replaces the
/// previous rule, which lets a host override the built-in types.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    inner: Arc<Mutex<BTreeMap<String, Arc<TypeEntry>>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<V>(&self, tag: impl Into<String>, description: impl Into<String>, validator: V)
    where
        V: Validator + 'static,
    {
        let entry = Arc::new(TypeEntry {
            validator: Arc::new(validator),
            description: description.into(),
        });
        let mut inner = self.inner.lock().expect("registry poisoned");
        inner.insert(tag.into(), entry);
    }

    pub fn lookup(&self, tag: &str) -> ResolveResult<Arc<dyn Validator>> {
        let inner = self.inner.lock().expect("registry poisoned");
        inner
            .get(tag)
            .map(|entry| entry.validator.clone())
            .ok_or_else(|| ResolveError::UnknownType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        let inner = self.inner.lock().expect("registry poisoned");
        inner.contains_key(tag)
    }

    /// Registered tags with their descriptions, sorted by tag.
    pub fn describe(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock().expect("registry poisoned");
        inner
            .iter()
            .map(|(tag, entry)| (tag.clone(), entry.description.clone()))
            .collect()
    }

    pub fn context(&self, prompt: Box<dyn PromptDriver>, non_interactive: bool) -> Context {
        Context::new(self.clone(), prompt, non_interactive)
    }
}

/// State of one resolution run: the rules, the prompt driver and the
/// interactivity switch. A run owns its context exclusively.
pub struct Context {
    registry: TypeRegistry,
    prompt: Box<dyn PromptDriver>,
    non_interactive: bool,
    verbose: bool,
}

impl Context {
    fn new(registry: TypeRegistry, prompt: Box<dyn PromptDriver>, non_interactive: bool) -> Self {
        Self {
            registry,
            prompt,
            non_interactive,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn is_non_interactive(&self) -> bool {
        self.non_interactive
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn lookup(&self, tag: &str) -> ResolveResult<Arc<dyn Validator>> {
        self.registry.lookup(tag)
    }

    pub fn prompt_mut(&mut self) -> &mut dyn PromptDriver {
        self.prompt.as_mut()
    }

    /// Fails when a prompt for `field` would be needed in non-interactive mode.
    pub fn ensure_interactive(&self, field: &str) -> ResolveResult<()> {
        if self.non_interactive {
            Err(ResolveError::InteractionRequiredButDisabled {
                field: field.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
