//! Signature matching.
//!
//! The matcher walks a signature's descriptors with a cursor over the
//! argument list. Each descriptor reports how many positions it consumed;
//! a zero stops the walk (unless the predicate is zero-width, like `...`),
//! and the signature only matches when the cursor lands exactly on the end
//! of the list.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};
use crate::signature::{Signature, TypeDescriptor};
use crate::types::{CallArgs, Predicate, TypeRegistry};
use crate::value::{Callable, Value, UNDEFINED};

/// What to do when a named descriptor is missing from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// The signature silently fails to match.
    #[default]
    NoMatch,
    /// Matching stops with `DispatchError::UnknownType`.
    Error,
}

/// Outcome of matching one signature.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub enum MatchOutput<'s> {
    NoMatch,
    Match(&'s Callable),
}

impl<'s> MatchOutput<'s> {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    #[must_use]
    pub const fn implementation(&self) -> Option<&'s Callable> {
        match *self {
            Self::Match(f) => Some(f),
            Self::NoMatch => None,
        }
    }
}

/// Evaluates signatures against argument lists using one registry.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    registry: Arc<TypeRegistry>,
    policy: UnknownTypePolicy,
}

impl SignatureMatcher {
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>, policy: UnknownTypePolicy) -> Self {
        Self { registry, policy }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn policy(&self) -> UnknownTypePolicy {
        self.policy
    }

    /// Matches `signature` against `args`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownType` only under
    /// [`UnknownTypePolicy::Error`], when a named descriptor reached during
    /// the walk is not registered.
    pub fn evaluate<'s>(
        &self,
        args: &[Value],
        signature: &'s Signature,
    ) -> DispatchResult<MatchOutput<'s>> {
        self.evaluate_in(&CallArgs::new(args), signature)
    }

    pub(crate) fn evaluate_in<'s>(
        &self,
        call: &CallArgs<'_>,
        signature: &'s Signature,
    ) -> DispatchResult<MatchOutput<'s>> {
        let args = call.args();
        let mut cursor = 0usize;

        for descriptor in signature.descriptors() {
            let value = args.get(cursor).unwrap_or(&UNDEFINED);
            let (consumed, zero_width) = match descriptor {
                TypeDescriptor::Inline(predicate) => {
                    (predicate.consume_in(value, cursor, call), predicate.is_zero_width())
                }
                TypeDescriptor::Class(class) => {
                    (usize::from(value.class().is_some_and(|c| &c == class)), false)
                }
                TypeDescriptor::Named(name) => match self.resolve(name)? {
                    Some(predicate) => {
                        (predicate.consume_in(value, cursor, call), predicate.is_zero_width())
                    }
                    None => (0, false),
                },
            };

            if consumed == 0 && !zero_width {
                return Ok(MatchOutput::NoMatch);
            }
            cursor = cursor.saturating_add(consumed);
        }

        if cursor == args.len() {
            Ok(MatchOutput::Match(signature.implementation()))
        } else {
            Ok(MatchOutput::NoMatch)
        }
    }

    fn resolve(&self, name: &str) -> DispatchResult<Option<Predicate>> {
        match self.registry.lookup(name) {
            Some(predicate) => Ok(Some(predicate)),
            None => match self.policy {
                UnknownTypePolicy::NoMatch => {
                    tracing::trace!(name, "unknown type name; signature does not match");
                    Ok(None)
                }
                UnknownTypePolicy::Error => Err(DispatchError::UnknownType {
                    name: name.to_string(),
                }),
            },
        }
    }
}

impl Default for SignatureMatcher {
    fn default() -> Self {
        Self::new(TypeRegistry::global(), UnknownTypePolicy::default())
    }
}

/// Matches one signature using the shared registry.
///
/// Unknown type names count as a non-match. Returns the signature's
/// implementation when it matches.
#[must_use]
pub fn match_signature<'s>(args: &[Value], signature: &'s Signature) -> Option<&'s Callable> {
    SignatureMatcher::default()
        .evaluate(args, signature)
        .ok()
        .and_then(|out| out.implementation())
}
