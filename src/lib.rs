pub mod arguments;
pub mod bridge;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod error;
pub mod invoke;
pub mod prompt;
pub mod registry;
pub mod spec;
pub mod tx_options;
pub mod types;
pub mod value;

pub use arguments::resolve_arguments;
pub use bridge::{resolve_scalar, Slot};
pub use composite::{resolve_array, resolve_tuple, resolve_value};
pub use error::{PromptError, ResolveError};
pub use invoke::{invoke, Given, Handlers, InvokeError, InvokeStatus, MethodKind, MethodSpec, Transport};
pub use prompt::{PromptDriver, ScriptedPrompt, TerminalPrompt};
pub use registry::{Context, TypeRegistry, Validator};
pub use spec::{ArgumentType, FieldSpec};
pub use tx_options::{
    resolve_tx_options, validate_tx_options, MixedDirective, OnAbsent, TxOptionKey, TxOptionSpec, TxOptionSpecs,
    TxOptions,
};
pub use types::{default_registry, register_types, AddressBook};
pub use value::{ResolvedValue, Validation};
