//! Error types for polydispatch.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific failure (an unresolved call versus a broken table) instead
//! of inspecting message strings.

use thiserror::Error;

/// Top-level error type for dispatch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No entry of the dispatch table matched the call.
    #[error(
        "Could not resolve function{} with given arguments ({})",
        display_name(.name),
        .arguments.join(", ")
    )]
    Resolution {
        /// Diagnostic name of the dispatcher, if one was given.
        name: Option<String>,
        /// Literal rendering of every argument of the failed call.
        arguments: Vec<String>,
    },

    /// A named type descriptor has no registry entry.
    #[error("Unknown type '{name}' in signature")]
    UnknownType {
        /// The unregistered type name.
        name: String,
    },

    /// A signature or keyed table could not be built.
    #[error("Invalid signature: {reason}")]
    InvalidSignature {
        /// Why the signature was rejected.
        reason: String,
    },

    /// An implementation reported a failure of its own.
    #[error("Implementation failed: {message}")]
    Implementation {
        /// Message supplied by the implementation.
        message: String,
    },

    /// Unexpected internal state.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn display_name(name: &Option<String>) -> String {
    match name.as_deref() {
        Some(n) if !n.is_empty() => format!(" {n}"),
        _ => String::new(),
    }
}

impl DispatchError {
    /// Creates an implementation error.
    #[must_use]
    pub fn implementation(message: impl Into<String>) -> Self {
        Self::Implementation {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid-signature error.
    #[must_use]
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }

    /// Returns true if no table entry matched the call.
    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }

    /// Returns true if a named descriptor was missing from the registry.
    #[must_use]
    pub const fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }

    /// Returns true if a signature could not be built.
    #[must_use]
    pub const fn is_invalid_signature(&self) -> bool {
        matches!(self, Self::InvalidSignature { .. })
    }

    /// Returns true if the failure came from an implementation.
    #[must_use]
    pub const fn is_implementation(&self) -> bool {
        matches!(self, Self::Implementation { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_with_name() {
        let err = DispatchError::Resolution {
            name: Some("area".to_string()),
            arguments: vec!["1".to_string(), "\"x\"".to_string()],
        };
        let msg = format!("{err}");
        assert_eq!(
            msg,
            "Could not resolve function area with given arguments (1, \"x\")"
        );
        assert!(err.is_resolution());
    }

    #[test]
    fn test_resolution_error_without_name() {
        let err = DispatchError::Resolution {
            name: None,
            arguments: vec!["1".to_string(), "2".to_string()],
        };
        let msg = format!("{err}");
        assert_eq!(msg, "Could not resolve function with given arguments (1, 2)");
    }

    #[test]
    fn test_resolution_error_empty_name_is_omitted() {
        let err = DispatchError::Resolution {
            name: Some(String::new()),
            arguments: Vec::new(),
        };
        assert_eq!(
            format!("{err}"),
            "Could not resolve function with given arguments ()"
        );
    }

    #[test]
    fn test_unknown_type_error() {
        let err = DispatchError::UnknownType {
            name: "even".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("even"));
        assert!(err.is_unknown_type());
        assert!(!err.is_resolution());
    }

    #[test]
    fn test_constructors() {
        assert!(DispatchError::implementation("boom").is_implementation());
        assert!(DispatchError::internal("state").is_internal());
        let err = DispatchError::invalid_signature("empty segment");
        assert!(err.is_invalid_signature());
        assert!(format!("{err}").contains("empty segment"));
    }
}
