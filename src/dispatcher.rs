//! Dispatch tables and dispatchers.
//!
//! A dispatcher owns an immutable, ordered table of entries. Each call scans
//! the table in declaration order and invokes the first entry that accepts
//! the argument list; the table order therefore encodes overload priority.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};
use crate::matcher::{MatchOutput, SignatureMatcher, UnknownTypePolicy};
use crate::signature::Signature;
use crate::types::{CallArgs, TypeRegistry};
use crate::value::{Callable, Value};

/// Dispatcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Handling of named descriptors that are not registered.
    #[serde(default)]
    pub unknown_type_policy: UnknownTypePolicy,
}

/// One entry of a dispatch table.
#[derive(Debug, Clone)]
pub enum DispatchEntry {
    /// Selected when its signature matches.
    Signature(Signature),
    /// Selected unconditionally; usually placed last as a default branch.
    CatchAll(Callable),
}

/// Ordered set of entries defining one overloaded callable.
///
/// # Examples
///
/// ```
/// use polydispatch::{Callable, DispatchTable, Dispatcher, Value};
///
/// let table = DispatchTable::new()
///     .with_signature(["int", "string"], Callable::constant("A"))
///     .with_signature(["string", "string"], Callable::constant("B"))
///     .with_signature(Vec::<&str>::new(), Callable::constant("C"));
///
/// let f = Dispatcher::new(table);
/// assert_eq!(f.call(&[Value::from(1), Value::from("x")]).unwrap(), Value::from("A"));
/// assert_eq!(f.call(&[]).unwrap(), Value::from("C"));
/// assert!(f.call(&[Value::from(1), Value::from(2)]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of plain signatures, in the given order.
    #[must_use]
    pub fn from_signatures(signatures: Vec<Signature>) -> Self {
        Self {
            entries: signatures.into_iter().map(DispatchEntry::Signature).collect(),
        }
    }

    /// Expands `"int,string" -> implementation` pairs, preserving order.
    ///
    /// The empty key denotes the zero-descriptor signature.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidSignature` if a key has an empty segment.
    pub fn from_keyed<K, I>(entries: I) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = (K, Callable)>,
        K: AsRef<str>,
    {
        let mut table = Self::new();
        for (key, implementation) in entries {
            table.push_keyed(key.as_ref(), implementation)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, entry: DispatchEntry) {
        self.entries.push(entry);
    }

    pub fn push_signature(&mut self, signature: Signature) {
        self.entries.push(DispatchEntry::Signature(signature));
    }

    /// Parses `key` and appends the resulting signature.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidSignature` if the key is malformed.
    pub fn push_keyed(&mut self, key: &str, implementation: Callable) -> DispatchResult<()> {
        self.push_signature(Signature::parse(key, implementation)?);
        Ok(())
    }

    pub fn push_catch_all(&mut self, implementation: Callable) {
        self.entries.push(DispatchEntry::CatchAll(implementation));
    }

    /// Appends a signature, builder style.
    #[must_use]
    pub fn with_signature<I, D>(mut self, descriptors: I, implementation: Callable) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<crate::signature::TypeDescriptor>,
    {
        self.push_signature(Signature::new(descriptors, implementation));
        self
    }

    /// Appends a catch-all, builder style.
    #[must_use]
    pub fn with_catch_all(mut self, implementation: Callable) -> Self {
        self.push_catch_all(implementation);
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Signature>> for DispatchTable {
    fn from(signatures: Vec<Signature>) -> Self {
        Self::from_signatures(signatures)
    }
}

/// Anything [`create_dispatcher`] accepts.
#[derive(Debug, Clone)]
pub enum DispatchSource {
    /// A ready table.
    Table(DispatchTable),
    /// Comma-joined type-name keys mapped to implementations.
    Keyed(IndexMap<String, Callable>),
    /// A plain callable, returned unchanged.
    Passthrough(Callable),
}

impl From<DispatchTable> for DispatchSource {
    fn from(table: DispatchTable) -> Self {
        Self::Table(table)
    }
}

impl From<Vec<Signature>> for DispatchSource {
    fn from(signatures: Vec<Signature>) -> Self {
        Self::Table(DispatchTable::from_signatures(signatures))
    }
}

impl From<IndexMap<String, Callable>> for DispatchSource {
    fn from(map: IndexMap<String, Callable>) -> Self {
        Self::Keyed(map)
    }
}

impl From<Callable> for DispatchSource {
    fn from(callable: Callable) -> Self {
        Self::Passthrough(callable)
    }
}

/// Builder for [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    table: DispatchTable,
    context: Option<Value>,
    name: Option<String>,
    registry: Option<Arc<TypeRegistry>>,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    /// Context every implementation runs against, overriding the caller's.
    #[must_use]
    pub fn context(mut self, context: impl Into<Value>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Diagnostic name used in resolution errors.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registry for named descriptors; defaults to [`TypeRegistry::global`].
    #[must_use]
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn unknown_type_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.config.unknown_type_policy = policy;
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        let registry = self.registry.unwrap_or_else(TypeRegistry::global);
        Dispatcher {
            table: Arc::new(self.table),
            context: self.context,
            name: self.name,
            matcher: SignatureMatcher::new(registry, self.config.unknown_type_policy),
        }
    }
}

/// An overloaded callable.
///
/// Cloning is cheap and clones share the table; a dispatcher can be used
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<DispatchTable>,
    context: Option<Value>,
    name: Option<String>,
    matcher: SignatureMatcher,
}

impl Dispatcher {
    /// Dispatcher over `table` using the shared registry and defaults.
    #[must_use]
    pub fn new(table: DispatchTable) -> Self {
        Self::builder(table).build()
    }

    #[must_use]
    pub fn builder(table: DispatchTable) -> DispatcherBuilder {
        DispatcherBuilder {
            table,
            context: None,
            name: None,
            registry: None,
            config: DispatchConfig::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Calls without a caller context.
    ///
    /// # Errors
    ///
    /// `DispatchError::Resolution` when no entry matches, plus whatever the
    /// selected implementation returns.
    pub fn call(&self, args: &[Value]) -> DispatchResult<Value> {
        self.call_with(None, args)
    }

    /// Calls with the caller's context; a bound context takes precedence.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::call`].
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(dispatcher = self.name.as_deref().unwrap_or(""), arg_count = args.len())
    )]
    pub fn call_with(&self, context: Option<&Value>, args: &[Value]) -> DispatchResult<Value> {
        let Some((index, implementation)) = self.select(args)? else {
            tracing::debug!(
                dispatcher = self.name.as_deref().unwrap_or(""),
                arg_count = args.len(),
                "no overload matched"
            );
            return Err(DispatchError::Resolution {
                name: self.name.clone(),
                arguments: args.iter().map(ToString::to_string).collect(),
            });
        };

        tracing::trace!(entry = index, "overload selected");
        implementation.call_with(self.context.as_ref().or(context), args)
    }

    /// Finds the first entry accepting `args` without invoking it.
    ///
    /// Returns the entry's position in the table and its implementation.
    ///
    /// # Errors
    ///
    /// Only `DispatchError::UnknownType` under the error policy.
    pub fn select(&self, args: &[Value]) -> DispatchResult<Option<(usize, &Callable)>> {
        let call = CallArgs::new(args);
        for (index, entry) in self.table.entries().iter().enumerate() {
            match entry {
                DispatchEntry::CatchAll(implementation) => return Ok(Some((index, implementation))),
                DispatchEntry::Signature(signature) => {
                    if let MatchOutput::Match(implementation) =
                        self.matcher.evaluate_in(&call, signature)?
                    {
                        return Ok(Some((index, implementation)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Wraps the dispatcher as a first-class callable.
    ///
    /// The callable forwards the invocation context as the caller context.
    #[must_use]
    pub fn into_callable(self) -> Callable {
        Callable::new(move |inv| self.call_with(inv.context, inv.args))
    }
}

impl From<Dispatcher> for Callable {
    fn from(dispatcher: Dispatcher) -> Self {
        dispatcher.into_callable()
    }
}

/// Builds an overloaded callable from `source`.
///
/// Tables and keyed maps become dispatchers bound to `context` and `name`
/// (using the shared registry); a plain callable is returned unchanged.
///
/// # Errors
///
/// Returns `DispatchError::InvalidSignature` if a keyed map has a malformed key.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use polydispatch::{create_dispatcher, Callable, Value};
///
/// let mut overloads = IndexMap::new();
/// overloads.insert("int,string".to_string(), Callable::constant("int-string"));
/// overloads.insert("bool,...".to_string(), Callable::constant("bool-rest"));
/// overloads.insert(String::new(), Callable::constant("empty"));
///
/// let f = create_dispatcher(overloads, None, Some("sample")).unwrap();
/// let out = f.call(&[Value::from(false), Value::from(1), Value::from(2)]).unwrap();
/// assert_eq!(out, Value::from("bool-rest"));
/// ```
pub fn create_dispatcher(
    source: impl Into<DispatchSource>,
    context: Option<Value>,
    name: Option<&str>,
) -> DispatchResult<Callable> {
    let table = match source.into() {
        DispatchSource::Passthrough(callable) => return Ok(callable),
        DispatchSource::Table(table) => table,
        DispatchSource::Keyed(map) => DispatchTable::from_keyed(map)?,
    };

    let mut builder = Dispatcher::builder(table);
    if let Some(context) = context {
        builder = builder.context(context);
    }
    if let Some(name) = name {
        builder = builder.name(name);
    }
    Ok(builder.build().into_callable())
}
