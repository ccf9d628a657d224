//! Signatures: ordered type descriptors plus the implementation they select.

use std::fmt;

use crate::class::Class;
use crate::error::{DispatchError, DispatchResult};
use crate::types::Predicate;
use crate::value::Callable;

/// Describes the type expected at one or more argument positions.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// Name resolved through the type registry at match time.
    Named(String),
    /// Predicate evaluated directly.
    Inline(Predicate),
    /// Exact runtime-class identity; consumes one non-null argument.
    Class(Class),
}

impl TypeDescriptor {
    /// Builds a named descriptor.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Predicate> for TypeDescriptor {
    fn from(predicate: Predicate) -> Self {
        Self::Inline(predicate)
    }
}

impl From<Class> for TypeDescriptor {
    fn from(class: Class) -> Self {
        Self::Class(class)
    }
}

impl From<&Class> for TypeDescriptor {
    fn from(class: &Class) -> Self {
        Self::Class(class.clone())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Inline(_) => f.write_str("<predicate>"),
            Self::Class(class) => write!(f, "<{class}>"),
        }
    }
}

/// An ordered list of descriptors and the implementation they select.
///
/// # Examples
///
/// ```
/// use polydispatch::{Callable, Signature};
///
/// let sig = Signature::new(["int", "string"], Callable::constant("A"));
/// assert_eq!(sig.arity(), 2);
/// assert_eq!(sig.to_string(), "int,string");
///
/// let parsed = Signature::parse("int, string", Callable::constant("A")).unwrap();
/// assert_eq!(parsed.to_string(), "int,string");
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    descriptors: Vec<TypeDescriptor>,
    implementation: Callable,
}

impl Signature {
    /// Creates a signature from any sequence of descriptor-convertible items.
    pub fn new<I, D>(descriptors: I, implementation: Callable) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<TypeDescriptor>,
    {
        Self {
            descriptors: descriptors.into_iter().map(Into::into).collect(),
            implementation,
        }
    }

    /// Signature with no descriptors: matches only an empty argument list.
    #[must_use]
    pub fn nullary(implementation: Callable) -> Self {
        Self {
            descriptors: Vec::new(),
            implementation,
        }
    }

    /// Parses a comma-joined list of type names (`"int,string"`).
    ///
    /// The empty string yields the zero-descriptor signature. Segments are
    /// trimmed; an empty segment inside a non-empty key is rejected.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidSignature` for keys such as `"int,,string"`.
    pub fn parse(key: &str, implementation: Callable) -> DispatchResult<Self> {
        if key.trim().is_empty() {
            return Ok(Self::nullary(implementation));
        }

        let mut descriptors = Vec::new();
        for (position, segment) in key.split(',').enumerate() {
            let name = segment.trim();
            if name.is_empty() {
                return Err(DispatchError::invalid_signature(format!(
                    "empty type name at position {position} in '{key}'"
                )));
            }
            descriptors.push(TypeDescriptor::named(name));
        }

        Ok(Self {
            descriptors,
            implementation,
        })
    }

    #[must_use]
    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn implementation(&self) -> &Callable {
        &self.implementation
    }

    /// Number of descriptors (not necessarily the number of arguments consumed).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.descriptors.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.descriptors.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imp() -> Callable {
        Callable::constant(())
    }

    #[test]
    fn test_parse_names() {
        let sig = Signature::parse("int,string", imp()).unwrap();
        assert_eq!(sig.arity(), 2);
        assert!(matches!(&sig.descriptors()[0], TypeDescriptor::Named(n) if n == "int"));
        assert!(matches!(&sig.descriptors()[1], TypeDescriptor::Named(n) if n == "string"));
    }

    #[test]
    fn test_parse_empty_key_is_nullary() {
        let sig = Signature::parse("", imp()).unwrap();
        assert_eq!(sig.arity(), 0);
    }

    #[test]
    fn test_parse_trims_segments() {
        let sig = Signature::parse(" bool , ... ", imp()).unwrap();
        assert_eq!(sig.to_string(), "bool,...");
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        let err = Signature::parse("int,,string", imp()).unwrap_err();
        assert!(err.is_invalid_signature());
        assert!(format!("{err}").contains("position 1"));

        assert!(Signature::parse("int,", imp()).is_err());
    }

    #[test]
    fn test_mixed_descriptors() {
        let point = Class::new("Point");
        let sig = Signature::new(
            vec![
                TypeDescriptor::from("int"),
                TypeDescriptor::from(&point),
                TypeDescriptor::from(Predicate::single(|_| true)),
            ],
            imp(),
        );
        assert_eq!(sig.to_string(), "int,<Point>,<predicate>");
    }

    #[test]
    fn test_implementation_is_kept() {
        let f = Callable::constant(7);
        let sig = Signature::nullary(f.clone());
        assert!(sig.implementation().ptr_eq(&f));
    }
}
