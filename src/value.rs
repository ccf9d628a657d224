//! Dynamic values passed through a dispatcher.
//!
//! A dispatcher receives its arguments as a slice of [`Value`]s; type
//! descriptors inspect the variant (and, for constructed objects, the
//! attached [`Class`]) to decide whether a signature matches.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;

use crate::class::Class;
use crate::error::DispatchResult;

/// One call of a [`Callable`]: the bound context and the argument list.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Context the callable runs against, if any.
    pub context: Option<&'a Value>,
    /// Arguments, in call order.
    pub args: &'a [Value],
}

impl<'a> Invocation<'a> {
    #[must_use]
    pub const fn new(context: Option<&'a Value>, args: &'a [Value]) -> Self {
        Self { context, args }
    }

    /// Argument at `index`, or `Undefined` past the end of the list.
    #[must_use]
    pub fn arg(&self, index: usize) -> &'a Value {
        self.args.get(index).unwrap_or(&UNDEFINED)
    }
}

pub(crate) static UNDEFINED: Value = Value::Undefined;

type CallableFn = dyn Fn(&Invocation<'_>) -> DispatchResult<Value> + Send + Sync;

/// An invocable value.
///
/// Implementations attached to signatures, function arguments and built
/// dispatchers are all `Callable`s. Cloning shares the underlying closure;
/// equality is identity.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    /// Wraps a closure receiving the full invocation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> DispatchResult<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps a closure that only needs the arguments and cannot fail.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&[Value]) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self::new(move |inv| Ok(f(inv.args).into()))
    }

    /// A callable that ignores its input and always returns `value`.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_| Ok(value.clone()))
    }

    /// Calls with no context.
    pub fn call(&self, args: &[Value]) -> DispatchResult<Value> {
        self.call_with(None, args)
    }

    /// Calls with an explicit context.
    pub fn call_with(&self, context: Option<&Value>, args: &[Value]) -> DispatchResult<Value> {
        (self.0)(&Invocation::new(context, args))
    }

    /// Returns true if both handles share one closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// An object constructed from a [`Class`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Runtime class of the object.
    pub class: Class,
    /// Own fields, in insertion order.
    pub fields: IndexMap<String, Value>,
}

impl Instance {
    #[must_use]
    pub fn new(class: &Class) -> Self {
        Self {
            class: class.clone(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// A dynamically typed argument.
///
/// # Examples
///
/// ```
/// use polydispatch::Value;
///
/// let n = Value::from(3);
/// let s = Value::from("hello");
///
/// assert!(n.is_number());
/// assert!(s.is_string());
/// assert_eq!(n.to_string(), "3");
/// assert_eq!(s.to_string(), "\"hello\"");
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value (a missing argument, or an explicit "undefined").
    #[default]
    Undefined,
    Null,
    Bool(bool),
    /// IEEE-754 double; may be NaN or infinite.
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Plain key/value record, not constructed from a class.
    Record(IndexMap<String, Value>),
    /// Object constructed from a class.
    Object(Instance),
    Date(DateTime<Utc>),
    Regex(Regex),
    Function(Callable),
}

impl Value {
    /// Builds a plain record from key/value pairs.
    pub fn record<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Record(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wraps a closure as a function value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> DispatchResult<Value> + Send + Sync + 'static,
    {
        Self::Function(Callable::new(f))
    }

    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for both `Null` and `Undefined`.
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Number that is neither NaN nor infinite.
    pub fn is_finite_number(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_finite())
    }

    /// Finite number without a fractional part.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_finite() && n.fract() == 0.0)
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_function(&self) -> Option<&Callable> {
        match self {
            Self::Function(v) => Some(v),
            _ => None,
        }
    }

    /// Runtime class of the value; `None` for `Null` and `Undefined`.
    #[must_use]
    pub fn class(&self) -> Option<Class> {
        match self {
            Self::Undefined | Self::Null => None,
            Self::Bool(_) => Some(Class::boolean()),
            Self::Number(_) => Some(Class::number()),
            Self::String(_) => Some(Class::string()),
            Self::Array(_) => Some(Class::array()),
            Self::Record(_) => Some(Class::object()),
            Self::Object(inst) => Some(inst.class.clone()),
            Self::Date(_) => Some(Class::date()),
            Self::Regex(_) => Some(Class::regexp()),
            Self::Function(_) => Some(Class::function()),
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
            Self::Object(_) => "object",
            Self::Date(_) => "date",
            Self::Regex(_) => "regex",
            Self::Function(_) => "function",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}

fn fmt_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, (k, v)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k}: {v}")?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => fmt_number(*v, f),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Record(fields) => fmt_entries(f, fields.iter()),
            Self::Object(inst) => {
                write!(f, "{} ", inst.class)?;
                fmt_entries(f, inst.fields.iter())
            }
            Self::Date(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Regex(v) => write!(f, "/{}/", v.as_str()),
            Self::Function(_) => f.write_str("function"),
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: usize) -> Self {
        Self::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Self::Object(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<Regex> for Value {
    fn from(v: Regex) -> Self {
        Self::Regex(v)
    }
}

impl From<Callable> for Value {
    fn from(v: Callable) -> Self {
        Self::Function(v)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Record(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
