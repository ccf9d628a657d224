//! Runtime class identities.
//!
//! Values carry no reflection data, so class-based signature matching relies
//! on explicit tokens: every non-null value reports a [`Class`], and a class
//! descriptor in a signature matches when the argument's class is exactly
//! that token.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(Uuid);

impl ClassId {
    /// Creates a new random class ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    const fn builtin(n: u128) -> Self {
        Self(Uuid::from_u128(n))
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const BOOLEAN_ID: ClassId = ClassId::builtin(1);
const NUMBER_ID: ClassId = ClassId::builtin(2);
const STRING_ID: ClassId = ClassId::builtin(3);
const ARRAY_ID: ClassId = ClassId::builtin(4);
const OBJECT_ID: ClassId = ClassId::builtin(5);
const DATE_ID: ClassId = ClassId::builtin(6);
const REGEXP_ID: ClassId = ClassId::builtin(7);
const FUNCTION_ID: ClassId = ClassId::builtin(8);

#[derive(Debug)]
struct ClassInner {
    id: ClassId,
    name: String,
    parent: Option<Class>,
}

/// A class token.
///
/// Cloning is cheap; equality is by [`ClassId`], so two tokens built
/// separately with the same name are still different classes.
///
/// # Examples
///
/// ```
/// use polydispatch::Class;
///
/// let shape = Class::new("Shape");
/// let circle = Class::extending("Circle", &shape);
///
/// assert!(circle.is_subclass_of(&shape));
/// assert_ne!(circle, shape);
/// assert_eq!(Class::number(), Class::number());
/// ```
#[derive(Debug, Clone)]
pub struct Class(Arc<ClassInner>);

impl Class {
    /// Creates a new root class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ClassId::new(), name, None)
    }

    /// Creates a new class derived from `parent`.
    #[must_use]
    pub fn extending(name: impl Into<String>, parent: &Class) -> Self {
        Self::with_id(ClassId::new(), name, Some(parent.clone()))
    }

    fn with_id(id: ClassId, name: impl Into<String>, parent: Option<Class>) -> Self {
        Self(Arc::new(ClassInner {
            id,
            name: name.into(),
            parent,
        }))
    }

    /// Class of boolean values.
    #[must_use]
    pub fn boolean() -> Self {
        Self::with_id(BOOLEAN_ID, "Boolean", None)
    }

    /// Class of numeric values.
    #[must_use]
    pub fn number() -> Self {
        Self::with_id(NUMBER_ID, "Number", None)
    }

    /// Class of string values.
    #[must_use]
    pub fn string() -> Self {
        Self::with_id(STRING_ID, "String", None)
    }

    /// Class of ordered sequences.
    #[must_use]
    pub fn array() -> Self {
        Self::with_id(ARRAY_ID, "Array", None)
    }

    /// Class of plain records.
    #[must_use]
    pub fn object() -> Self {
        Self::with_id(OBJECT_ID, "Object", None)
    }

    /// Class of date values.
    #[must_use]
    pub fn date() -> Self {
        Self::with_id(DATE_ID, "Date", None)
    }

    /// Class of compiled patterns.
    #[must_use]
    pub fn regexp() -> Self {
        Self::with_id(REGEXP_ID, "RegExp", None)
    }

    /// Class of invocable values.
    #[must_use]
    pub fn function() -> Self {
        Self::with_id(FUNCTION_ID, "Function", None)
    }

    #[must_use]
    pub fn id(&self) -> ClassId {
        self.0.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Returns true if `self` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_subclass_of(&self, ancestor: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Class {}

impl std::hash::Hash for Class {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
