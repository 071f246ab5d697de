use thiserror::Error;

/// Failures a prompt driver can report back to the resolution engine.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by the operator")]
    Cancelled,

    #[error("no scripted answer left for prompt: {0}")]
    Exhausted(String),

    #[error("terminal error: {0}")]
    Terminal(String),

    /// The driver returned an answer its `check` had rejected.
    #[error("prompt returned a rejected answer: {0}")]
    Rejected(String),
}

/// Fatal outcomes of a resolution run. Rejected given values are not errors:
/// they are logged and resolution falls back to prompting.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown argument type: {0}")]
    UnknownType(String),

    #[error("interaction required for `{field}` but non-interactive mode is enabled")]
    InteractionRequiredButDisabled { field: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("prompt for `{field}` was cancelled")]
    Cancelled { field: String },

    #[error("prompt for `{field}` failed: {source}")]
    Prompt {
        field: String,
        #[source]
        source: PromptError,
    },
}

impl ResolveError {
    pub fn config(message: impl Into<String>) -> Self {
        ResolveError::InvalidConfiguration(message.into())
    }

    pub(crate) fn from_prompt(field: &str, err: PromptError) -> Self {
        match err {
            PromptError::Cancelled | PromptError::Exhausted(_) => ResolveError::Cancelled {
                field: field.to_string(),
            },
            other => ResolveError::Prompt {
                field: field.to_string(),
                source: other,
            },
        }
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
