//! Extra validation predicates.
//!
//! Not part of the builtin set; install them with
//! [`TypeRegistry::register_validators`](super::TypeRegistry::register_validators).

use super::{Predicate, TypeRegistry};
use crate::value::Value;

/// Registers `not_null`, `defined`, `valid`, `not_empty` and `positive`.
pub fn register_validators(registry: &TypeRegistry) {
    registry.register("not_null", Predicate::single(|v| !v.is_null()));
    registry.register("defined", Predicate::single(|v| !v.is_undefined()));
    registry.register("valid", Predicate::single(|v| !v.is_nullish()));
    registry.register("not_empty", Predicate::single(is_not_empty));
    registry.register("positive", Predicate::single(is_positive));
}

fn is_not_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

// Zero counts as positive.
fn is_positive(value: &Value) -> bool {
    matches!(value, Value::Number(n) if *n >= 0.0)
}
