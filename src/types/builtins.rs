//! Builtin type predicates.
//!
//! Every builtin consumes exactly one position when it holds, except `...`
//! which consumes everything from the current position to the end.

use super::{Predicate, TypeRegistry};
use crate::value::Value;

/// Names of the builtin types, in registration order.
pub const BUILTIN_NAMES: [&str; 14] = [
    "*", "...", "null", "undefined", "bool", "int", "real", "number", "string", "array", "plain",
    "date", "regex", "function",
];

/// Predicate for a builtin name, or `None` if the name is not a builtin.
#[must_use]
pub fn builtin(name: &str) -> Option<Predicate> {
    let predicate = match name {
        "*" => Predicate::new(|_, _, _| 1),
        "..." => Predicate::zero_width(|_, index, args| args.len().saturating_sub(index)),
        "null" => Predicate::single(Value::is_null),
        "undefined" => Predicate::single(Value::is_undefined),
        "bool" => Predicate::single(Value::is_bool),
        "int" => Predicate::single(Value::is_integer),
        "real" => Predicate::single(Value::is_finite_number),
        "number" => Predicate::single(Value::is_number),
        "string" => Predicate::single(Value::is_string),
        "array" => Predicate::single(Value::is_array),
        "plain" => Predicate::single(Value::is_record),
        "date" => Predicate::single(Value::is_date),
        "regex" => Predicate::single(Value::is_regex),
        "function" => Predicate::single(Value::is_function),
        _ => return None,
    };
    Some(predicate)
}

/// Registers every builtin into `registry`.
pub fn register_builtins(registry: &TypeRegistry) {
    for name in BUILTIN_NAMES {
        if let Some(predicate) = builtin(name) {
            registry.register(name, predicate);
        }
    }
}
