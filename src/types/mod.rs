pub mod address;
pub mod bytes;
pub mod integer;
pub mod text;

use crate::registry::TypeRegistry;

pub use address::{register_smart_address, AddressBook};

/// Register the built-in scalar types: `int8`..`int256`, `uint8`..`uint256`,
/// `bytes1`..`bytes32`, `bytes`, `string` and `boolean`. The `smart-address`
/// type depends on host accounts and is registered separately.
pub fn register_types(registry: &TypeRegistry) {
    integer::register_integers(registry);
    bytes::register_bytes(registry);
    text::register_text(registry);
}

/// Built-in types plus `smart-address` over the given address book.
pub fn default_registry(book: AddressBook) -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_types(&registry);
    register_smart_address(&registry, book);
    registry
}
