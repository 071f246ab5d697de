use serde_json::Value;
use tracing::{info, warn};

use crate::bridge::{confirm, present, resolve_scalar, Slot};
use crate::error::ResolveResult;
use crate::registry::Context;
use crate::spec::{ArgumentType, ArraySpec, TupleSpec};
use crate::value::ResolvedValue;

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn ordinal(position: usize) -> String {
    let suffix = match (position % 10, position % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{position}{suffix}")
}

fn element_message(parent: &str, position: usize, total: Option<usize>) -> String {
    match total {
        Some(total) => format!("{parent} [{} of {total}]", ordinal(position)),
        None => format!("{parent} [{} element]", ordinal(position)),
    }
}

/// Dispatches on the shape of `argument_type`.
pub fn resolve_value(
    ctx: &mut Context,
    slot: &Slot,
    argument_type: &ArgumentType,
    given: Option<&Value>,
) -> ResolveResult<ResolvedValue> {
    match argument_type {
        ArgumentType::Scalar(tag) => resolve_scalar(ctx, slot, tag, given),
        ArgumentType::Array(spec) => resolve_array(ctx, slot, spec, given),
        ArgumentType::Tuple(spec) => resolve_tuple(ctx, slot, spec, given),
    }
}

/// Validates a given value against a full type without ever prompting.
/// `None` means some part of it was rejected.
pub fn probe(
    ctx: &Context,
    argument_type: &ArgumentType,
    given: &Value,
) -> ResolveResult<Option<ResolvedValue>> {
    match argument_type {
        ArgumentType::Scalar(tag) => Ok(ctx.lookup(tag)?.check(given).ok()),
        ArgumentType::Array(spec) => {
            let Value::Array(items) = given else {
                return Ok(None);
            };
            if spec.length.is_some_and(|length| length != items.len()) {
                return Ok(None);
            }
            probe_all(ctx, std::iter::repeat(spec.element_type.as_ref()), items)
        }
        ArgumentType::Tuple(spec) => {
            let Value::Array(items) = given else {
                return Ok(None);
            };
            if items.len() != spec.element_types.len() {
                return Ok(None);
            }
            probe_all(ctx, spec.element_types.iter(), items)
        }
    }
}

fn probe_all<'a>(
    ctx: &Context,
    types: impl Iterator<Item = &'a ArgumentType>,
    items: &[Value],
) -> ResolveResult<Option<ResolvedValue>> {
    let mut accepted = Vec::with_capacity(items.len());
    for (element_type, item) in types.zip(items) {
        match probe(ctx, element_type, item)? {
            Some(value) => accepted.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(ResolvedValue::List(accepted)))
}

/// Resolves a homogeneous sequence.
///
/// A given sequence of the wrong length is discarded as a whole. Without a
/// usable given sequence, a fixed length prompts for each element in order
/// and an unset length keeps asking whether to add another element.
pub fn resolve_array(
    ctx: &mut Context,
    slot: &Slot,
    spec: &ArraySpec,
    given: Option<&Value>,
) -> ResolveResult<ResolvedValue> {
    let given_items = match present(given) {
        None => None,
        Some(Value::Array(items)) => match spec.length {
            Some(length) if length != items.len() => {
                warn!(
                    field = %slot.name,
                    expected = length,
                    actual = items.len(),
                    "Invalid given value: wrong number of elements"
                );
                None
            }
            _ => Some(items),
        },
        Some(other) => {
            warn!(field = %slot.name, given = %other, "Invalid given value: not a sequence");
            None
        }
    };

    let element_type = spec.element_type.as_ref();
    if let Some(items) = given_items {
        let total = items.len();
        let mut elements = Vec::with_capacity(total);
        for (index, item) in items.iter().enumerate() {
            let element = slot.element(index, element_message(&slot.message, index + 1, Some(total)));
            elements.push(resolve_value(ctx, &element, element_type, Some(item))?);
        }
        return Ok(ResolvedValue::List(elements));
    }

    if let Some(total) = spec.length {
        let mut elements = Vec::with_capacity(total);
        for index in 0..total {
            info!(
                field = %slot.name,
                "Prompting for the {} of {total} elements",
                ordinal(index + 1)
            );
            let element = slot.element(index, element_message(&slot.message, index + 1, Some(total)));
            elements.push(resolve_value(ctx, &element, element_type, None)?);
        }
        return Ok(ResolvedValue::List(elements));
    }

    info!(field = %slot.name, "{}", slot.message);
    let mut elements = Vec::new();
    loop {
        let question = format!(
            "Do you want to add a new element to {}? ({} so far)",
            slot.name,
            elements.len()
        );
        if !confirm(ctx, slot, &question)? {
            break;
        }
        let index = elements.len();
        let element = slot.element(index, element_message(&slot.message, index + 1, None));
        elements.push(resolve_value(ctx, &element, element_type, None)?);
    }
    Ok(ResolvedValue::List(elements))
}

/// Resolves a fixed-arity heterogeneous group.
///
/// The given value is used only when every position validates; otherwise it
/// is discarded entirely and each position is resolved without a seed.
pub fn resolve_tuple(
    ctx: &mut Context,
    slot: &Slot,
    spec: &TupleSpec,
    given: Option<&Value>,
) -> ResolveResult<ResolvedValue> {
    let arity = spec.element_types.len();
    if let Some(raw) = present(given) {
        let accepted = match raw {
            Value::Array(items) if items.len() == arity => {
                probe_all(ctx, spec.element_types.iter(), items)?
            }
            _ => None,
        };
        match accepted {
            Some(value) => return Ok(value),
            None => warn!(
                field = %slot.name,
                given = %raw,
                arity,
                "Invalid given value: tuple discarded"
            ),
        }
    }

    let mut elements = Vec::with_capacity(arity);
    for (index, element_type) in spec.element_types.iter().enumerate() {
        let element = slot.element(index, element_message(&slot.message, index + 1, Some(arity)));
        elements.push(resolve_value(ctx, &element, element_type, None)?);
    }
    Ok(ResolvedValue::List(elements))
}
