use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};
use crate::registry::TypeRegistry;

/// The declared type of an argument: a registered scalar tag or a composite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeRepr", into = "TypeRepr")]
pub enum ArgumentType {
    Scalar(String),
    Array(ArraySpec),
    Tuple(TupleSpec),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySpec {
    pub element_type: Box<ArgumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleSpec {
    pub element_types: Vec<ArgumentType>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    Scalar(String),
    Composite(CompositeRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum CompositeRepr {
    Array(ArraySpec),
    Tuple(TupleSpec),
}

impl From<TypeRepr> for ArgumentType {
    fn from(repr: TypeRepr) -> Self {
        match repr {
            TypeRepr::Scalar(tag) => ArgumentType::Scalar(tag),
            TypeRepr::Composite(CompositeRepr::Array(spec)) => ArgumentType::Array(spec),
            TypeRepr::Composite(CompositeRepr::Tuple(spec)) => ArgumentType::Tuple(spec),
        }
    }
}

impl From<ArgumentType> for TypeRepr {
    fn from(value: ArgumentType) -> Self {
        match value {
            ArgumentType::Scalar(tag) => TypeRepr::Scalar(tag),
            ArgumentType::Array(spec) => TypeRepr::Composite(CompositeRepr::Array(spec)),
            ArgumentType::Tuple(spec) => TypeRepr::Composite(CompositeRepr::Tuple(spec)),
        }
    }
}

impl From<&str> for ArgumentType {
    fn from(tag: &str) -> Self {
        ArgumentType::Scalar(tag.to_string())
    }
}

impl ArgumentType {
    pub fn scalar(tag: impl Into<String>) -> Self {
        ArgumentType::Scalar(tag.into())
    }

    pub fn array(element: impl Into<ArgumentType>, length: Option<usize>) -> Self {
        ArgumentType::Array(ArraySpec {
            element_type: Box::new(element.into()),
            length,
        })
    }

    pub fn tuple<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgumentType>,
    {
        ArgumentType::Tuple(TupleSpec {
            element_types: elements.into_iter().map(Into::into).collect(),
        })
    }

    /// Fails with `UnknownType` on the first unregistered scalar tag.
    pub fn ensure_registered(&self, registry: &TypeRegistry) -> ResolveResult<()> {
        match self {
            ArgumentType::Scalar(tag) => {
                if registry.contains(tag) {
                    Ok(())
                } else {
                    Err(ResolveError::UnknownType(tag.clone()))
                }
            }
            ArgumentType::Array(spec) => spec.element_type.ensure_registered(registry),
            ArgumentType::Tuple(spec) => spec
                .element_types
                .iter()
                .try_for_each(|element| element.ensure_registered(registry)),
        }
    }
}

/// A named, typed parameter awaiting resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub message: String,
    pub argument_type: ArgumentType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, argument_type: impl Into<ArgumentType>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            message: String::new(),
            argument_type: argument_type.into(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The text shown to the operator, falling back to the description and
    /// then the name when no message was configured.
    pub fn prompt_message(&self) -> String {
        if !self.message.is_empty() {
            self.message.clone()
        } else if !self.description.is_empty() {
            format!("{}:", self.description)
        } else {
            format!("{}:", self.name)
        }
    }
}

/// Structural checks run before any prompt is shown.
pub fn validate_fields(registry: &TypeRegistry, fields: &[FieldSpec]) -> ResolveResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(ResolveError::config("argument names must not be empty"));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ResolveError::config(format!(
                "duplicate argument name: {}",
                field.name
            )));
        }
        field.argument_type.ensure_registered(registry)?;
    }
    Ok(())
}
