use serde_json::{Map, Value};
use tracing::debug;

use crate::bridge::Slot;
use crate::composite::resolve_value;
use crate::error::ResolveResult;
use crate::registry::Context;
use crate::spec::{validate_fields, FieldSpec};
use crate::value::ResolvedValue;

/// Resolves every field in declaration order, one at a time.
///
/// The specs are checked before the first prompt. The first failing field
/// aborts the run; no partial result is returned.
pub fn resolve_arguments(
    ctx: &mut Context,
    fields: &[FieldSpec],
    given: &Map<String, Value>,
) -> ResolveResult<Vec<ResolvedValue>> {
    validate_fields(ctx.registry(), fields)?;

    let mut resolved = Vec::with_capacity(fields.len());
    for field in fields {
        let slot = Slot::of(field);
        let value = resolve_value(ctx, &slot, &field.argument_type, given.get(&field.name))?;
        debug!(field = %field.name, %value, "argument resolved");
        resolved.push(value);
    }
    Ok(resolved)
}
