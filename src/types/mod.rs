//! Type predicate registry.
//!
//! Signatures name their argument types with plain strings (`"int"`,
//! `"string"`, `"..."`); the registry maps each name to a [`Predicate`]
//! that reports how many argument positions it accounts for. One shared
//! registry exists per process ([`TypeRegistry::global`]) but dispatchers
//! can be given an isolated instance.

/// Builtin predicate table.
pub mod builtins;
/// Optional validation predicates.
pub mod validators;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::dispatcher::{DispatchTable, Dispatcher};
use crate::error::{DispatchError, DispatchResult};
use crate::value::{Callable, Value};

/// Process-wide registry singleton.
static GLOBAL_REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

type PredicateFn = dyn Fn(&Value, usize, &[Value]) -> usize + Send + Sync;

#[derive(Clone)]
enum PredicateKind {
    Native(Arc<PredicateFn>),
    Dynamic(Callable),
}

/// A consumption-counting type test.
///
/// Called with `(value, index, args)` where `value` is `args[index]` (or
/// `Undefined` past the end); returns how many positions starting at
/// `index` it accounts for. Zero means "does not match here", unless the
/// predicate was built with [`Predicate::zero_width`].
#[derive(Clone)]
pub struct Predicate {
    kind: PredicateKind,
    zero_width: bool,
}

impl Predicate {
    /// Wraps a full consumption-counting closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, usize, &[Value]) -> usize + Send + Sync + 'static,
    {
        Self {
            kind: PredicateKind::Native(Arc::new(f)),
            zero_width: false,
        }
    }

    /// Wraps a closure for which consuming nothing is still a match.
    ///
    /// The matcher leaves the cursor in place when such a predicate
    /// returns zero instead of failing the signature.
    pub fn zero_width<F>(f: F) -> Self
    where
        F: Fn(&Value, usize, &[Value]) -> usize + Send + Sync + 'static,
    {
        Self {
            zero_width: true,
            ..Self::new(f)
        }
    }

    /// Wraps a single-position test: consumes 1 when `test` holds.
    pub fn single<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |value, _, _| usize::from(test(value)))
    }

    /// Adapts a dynamic function value into a predicate.
    ///
    /// The callable receives `(value, index, args-array)`. A `true` result
    /// consumes one position; a number (or numeric string) of at least 1
    /// consumes its integer part; anything else, including an error,
    /// consumes none.
    #[must_use]
    pub fn from_callable(callable: Callable) -> Self {
        Self {
            kind: PredicateKind::Dynamic(callable),
            zero_width: false,
        }
    }

    /// Returns true if a zero count still counts as a match.
    #[must_use]
    pub const fn is_zero_width(&self) -> bool {
        self.zero_width
    }

    /// Evaluates the predicate at `index`.
    #[must_use]
    pub fn consume(&self, value: &Value, index: usize, args: &[Value]) -> usize {
        self.consume_in(value, index, &CallArgs::new(args))
    }

    pub(crate) fn consume_in(&self, value: &Value, index: usize, call: &CallArgs<'_>) -> usize {
        match &self.kind {
            PredicateKind::Native(f) => f(value, index, call.args()),
            PredicateKind::Dynamic(callable) => call.with_predicate_args(value, index, |args| {
                match callable.call(args) {
                    Ok(result) => consumption_of(&result),
                    Err(err) => {
                        tracing::warn!(error = %err, index, "type predicate failed; treating as no match");
                        0
                    }
                }
            }),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PredicateKind::Native(_) => "native",
            PredicateKind::Dynamic(_) => "dynamic",
        };
        f.debug_struct("Predicate")
            .field("kind", &kind)
            .field("zero_width", &self.zero_width)
            .finish()
    }
}

/// Argument list of one call, shared by every predicate evaluated for it.
///
/// Dynamic predicates receive `(value, index, args-array)`; the array is
/// built on first use and reused for the rest of the call.
pub(crate) struct CallArgs<'a> {
    args: &'a [Value],
    buffer: RefCell<Option<[Value; 3]>>,
}

impl<'a> CallArgs<'a> {
    pub(crate) fn new(args: &'a [Value]) -> Self {
        Self {
            args,
            buffer: RefCell::new(None),
        }
    }

    pub(crate) fn args(&self) -> &'a [Value] {
        self.args
    }

    fn with_predicate_args<R>(
        &self,
        value: &Value,
        index: usize,
        f: impl FnOnce(&[Value]) -> R,
    ) -> R {
        let mut guard = self.buffer.borrow_mut();
        let buffer = guard.get_or_insert_with(|| {
            [Value::Undefined, Value::Undefined, Value::Array(self.args.to_vec())]
        });
        buffer[0] = value.clone();
        buffer[1] = Value::from(index);
        f(buffer.as_slice())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn consumption_of(result: &Value) -> usize {
    let n = match result {
        Value::Bool(b) => return usize::from(*b),
        Value::Number(n) => *n,
        // Numeric strings count like the number they spell.
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => return 0,
    };
    if n.is_finite() && n >= 1.0 {
        n.trunc() as usize
    } else {
        0
    }
}

/// Mapping from type name to predicate.
///
/// Registration inserts or overwrites; the last registration for a name
/// wins. Entries are never removed.
pub struct TypeRegistry {
    entries: RwLock<HashMap<String, Predicate>>,
}

impl TypeRegistry {
    /// Creates a registry with no entries at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an isolated registry holding the builtin types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        builtins::register_builtins(&registry);
        registry
    }

    /// The shared process-wide registry, seeded with the builtins on first use.
    pub fn global() -> Arc<TypeRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    /// Looks up the predicate registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Predicate> {
        self.entries.read().get(name).cloned()
    }

    /// Registers `predicate` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, predicate: Predicate) {
        let name = name.into();
        let replaced = self.entries.write().insert(name.clone(), predicate).is_some();
        tracing::debug!(name = %name, replaced, "registered type predicate");
    }

    /// Installs the optional validation predicates (`not_null`, `positive`, ...).
    pub fn register_validators(&self) {
        validators::register_validators(self);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Builds the `registerType` entry point for this registry.
    ///
    /// The returned dispatcher has a single `"string,function"` signature:
    /// the function value becomes a predicate via
    /// [`Predicate::from_callable`]. Any other argument shape fails to
    /// resolve.
    pub fn registrar(self: &Arc<Self>) -> DispatchResult<Dispatcher> {
        let target = Arc::clone(self);
        let mut table = DispatchTable::new();
        table.push_keyed(
            "string,function",
            Callable::new(move |inv| {
                let (Some(name), Some(callable)) = (inv.arg(0).as_str(), inv.arg(1).as_function())
                else {
                    return Err(DispatchError::internal(
                        "registerType matched with unexpected argument shapes",
                    ));
                };
                target.register(name, Predicate::from_callable(callable.clone()));
                Ok(Value::Undefined)
            }),
        )?;

        Ok(Dispatcher::builder(table)
            .name("registerType")
            .registry(Arc::clone(self))
            .build())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Registers a dynamic predicate in the shared registry.
///
/// Takes the raw argument list `(name: string, predicate: function)` and
/// resolves it through the registry's own `registerType` dispatcher.
pub fn register_type(args: &[Value]) -> DispatchResult<Value> {
    TypeRegistry::global().registrar()?.call(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_builtins_has_core_names() {
        let registry = TypeRegistry::with_builtins();
        for name in [
            "*", "...", "null", "undefined", "bool", "int", "real", "number", "string", "array",
            "plain", "date", "regex", "function",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
        assert!(!registry.contains("not_null"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = TypeRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.lookup("int").is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let registry = TypeRegistry::empty();
        registry.register("t", Predicate::single(|_| false));
        registry.register("t", Predicate::single(|_| true));
        assert_eq!(registry.len(), 1);

        let p = registry.lookup("t").unwrap();
        assert_eq!(p.consume(&Value::Null, 0, &[Value::Null]), 1);
    }

    #[test]
    fn test_register_validators() {
        let registry = TypeRegistry::with_builtins();
        registry.register_validators();
        for name in ["not_null", "defined", "valid", "not_empty", "positive"] {
            assert!(registry.contains(name));
        }
    }

    #[test]
    fn test_from_callable_coercion() {
        let truthy = Predicate::from_callable(Callable::constant(true));
        let falsy = Predicate::from_callable(Callable::constant(false));
        let two = Predicate::from_callable(Callable::constant(2.7));
        let half = Predicate::from_callable(Callable::constant(0.5));
        let text = Predicate::from_callable(Callable::constant("yes"));
        let numeric_text = Predicate::from_callable(Callable::constant(" 2 "));
        let empty_text = Predicate::from_callable(Callable::constant(""));
        let failing = Predicate::from_callable(Callable::new(|_| {
            Err(DispatchError::implementation("nope"))
        }));

        let args = [Value::from(1), Value::from(2)];
        assert_eq!(truthy.consume(&args[0], 0, &args), 1);
        assert_eq!(falsy.consume(&args[0], 0, &args), 0);
        assert_eq!(two.consume(&args[0], 0, &args), 2);
        assert_eq!(half.consume(&args[0], 0, &args), 0);
        assert_eq!(text.consume(&args[0], 0, &args), 0);
        assert_eq!(numeric_text.consume(&args[0], 0, &args), 2);
        assert_eq!(empty_text.consume(&args[0], 0, &args), 0);
        assert_eq!(failing.consume(&args[0], 0, &args), 0);
    }

    #[test]
    fn test_from_callable_receives_index_and_args() {
        let p = Predicate::from_callable(Callable::new(|inv| {
            let index = inv.arg(1).as_number().unwrap_or(-1.0);
            let total = inv.arg(2).as_array().map_or(0, <[Value]>::len);
            Ok(Value::Bool(index == 1.0 && total == 3))
        }));
        let args = [Value::from(1), Value::from(2), Value::from(3)];
        assert_eq!(p.consume(&args[1], 1, &args), 1);
        assert_eq!(p.consume(&args[0], 0, &args), 0);
    }

    #[test]
    fn test_call_args_builds_array_once_per_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let p = Predicate::from_callable(Callable::new(move |inv| {
            let index = inv.arg(1).as_number().unwrap_or(-1.0);
            let ok = inv.arg(2).as_array().is_some_and(|a| a.len() == 3)
                && inv.arg(0) == &Value::from(index + 1.0);
            if ok {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Value::Bool(ok))
        }));

        let args = [Value::from(1), Value::from(2), Value::from(3)];
        let call = CallArgs::new(&args);
        for (index, value) in args.iter().enumerate() {
            assert_eq!(p.consume_in(value, index, &call), 1);
        }
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let buffer = call.buffer.borrow();
        let Some([_, _, Value::Array(copied)]) = buffer.as_ref() else {
            panic!("argument array not built");
        };
        assert_eq!(copied.as_slice(), &args);
    }

    #[test]
    fn test_native_predicate_skips_argument_copy() {
        let p = Predicate::single(|_| true);
        let args = [Value::from(1)];
        let call = CallArgs::new(&args);
        assert_eq!(p.consume_in(&args[0], 0, &call), 1);
        assert!(call.buffer.borrow().is_none());
    }

    #[test]
    fn test_registrar_registers_dynamic_predicate() {
        let registry = Arc::new(TypeRegistry::with_builtins());
        let registrar = registry.registrar().unwrap();

        let even = Value::function(|inv| {
            Ok(Value::Bool(
                inv.arg(0).as_number().is_some_and(|n| n % 2.0 == 0.0),
            ))
        });
        let out = registrar.call(&[Value::from("even"), even]).unwrap();
        assert!(out.is_undefined());

        let p = registry.lookup("even").unwrap();
        let args = [Value::from(4)];
        assert_eq!(p.consume(&args[0], 0, &args), 1);
    }

    #[test]
    fn test_registrar_rejects_bad_shapes() {
        let registry = Arc::new(TypeRegistry::with_builtins());
        let registrar = registry.registrar().unwrap();

        let err = registrar.call(&[Value::from(1), Value::from(2)]).unwrap_err();
        assert!(err.is_resolution());
        assert!(format!("{err}").contains("registerType"));
        assert!(!registry.contains("1"));
    }
}
