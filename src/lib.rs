//! # polydispatch - Runtime overload resolution
//!
//! polydispatch picks, among several implementations attached to declared
//! argument-type signatures, the first one whose signature matches a call's
//! dynamic argument list, and invokes it.
//!
//! ## Core Concepts
//!
//! - **Type registry**: maps type names (`"int"`, `"string"`, `"..."`) to
//!   consumption-counting predicates
//! - **Signature**: ordered type descriptors plus an implementation
//! - **Matcher**: walks one signature over an argument list; the signature
//!   matches only if the descriptors consume every argument exactly
//! - **Dispatcher**: scans an ordered table and runs the first match
//!
//! ## Usage
//!
//! ```rust
//! use polydispatch::{Callable, DispatchTable, Dispatcher, Value};
//!
//! let describe = Dispatcher::builder(
//!     DispatchTable::new()
//!         .with_signature(["int", "string"], Callable::constant("int-string"))
//!         .with_signature(["string", "..."], Callable::constant("string-rest")),
//! )
//! .name("describe")
//! .build();
//!
//! let out = describe.call(&[Value::from(1), Value::from("x")])?;
//! assert_eq!(out, Value::from("int-string"));
//!
//! let out = describe.call(&[Value::from("a"), Value::Null, Value::from(true)])?;
//! assert_eq!(out, Value::from("string-rest"));
//!
//! assert!(describe.call(&[Value::from(true)]).is_err());
//! # Ok::<(), polydispatch::DispatchError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod signature;
pub mod types;
pub mod value;

// Re-export primary types at crate root for convenience
pub use class::{Class, ClassId};
pub use dispatcher::{
	create_dispatcher, DispatchConfig, DispatchEntry, DispatchSource, DispatchTable, Dispatcher,
	DispatcherBuilder,
};
pub use error::{DispatchError, DispatchResult};
pub use matcher::{match_signature, MatchOutput, SignatureMatcher, UnknownTypePolicy};
pub use signature::{Signature, TypeDescriptor};
pub use types::{register_type, Predicate, TypeRegistry};
pub use value::{Callable, Instance, Invocation, Value};
