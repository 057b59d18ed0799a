//! Managed-runtime abstraction
//!
//! The bridge never owns the caller-visible object model. It resolves
//! classes and constructors through [`ManagedRuntime`] and asks the runtime
//! to allocate every object and array it hands back.

use std::fmt;

use crate::error::Result;

/// Kind of a single constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// UTF-8 text
    String,
    /// 32-bit float
    Float,
    /// Array of 32-bit ints
    IntArray,
    /// Array of instances of the named class
    ObjectArray(String),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => write!(f, "String"),
            ParamKind::Float => write!(f, "f32"),
            ParamKind::IntArray => write!(f, "i32[]"),
            ParamKind::ObjectArray(class) => write!(f, "{}[]", class),
        }
    }
}

/// Constructor signature, used as part of the cache key for a handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<ParamKind>,
}

impl Signature {
    pub fn new(params: Vec<ParamKind>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// One argument passed to a runtime constructor
#[derive(Debug, Clone)]
pub enum Arg<O> {
    Str(String),
    Float(f32),
    /// Runtime object; ownership moves into the constructed instance
    Object(O),
}

/// Operations the bridge needs from a managed runtime.
///
/// `find_class` and `constructor` are expected to be comparatively slow and
/// are called once per builder; `new_*` run on every conversion.
pub trait ManagedRuntime {
    /// Reference to a runtime object
    type Object: Clone;
    /// Resolved type descriptor
    type Class: Clone;
    /// Resolved constructor handle
    type Constructor: Clone;

    /// Resolve a class by name. Fails with [`crate::Error::Linkage`].
    fn find_class(&self, name: &str) -> Result<Self::Class>;

    /// Resolve a constructor of `class` matching `signature`.
    /// Fails with [`crate::Error::Linkage`].
    fn constructor(&self, class: &Self::Class, signature: &Signature)
        -> Result<Self::Constructor>;

    /// Construct a new instance. Runtime-side failures surface as
    /// [`crate::Error::Construction`].
    fn new_object(
        &self,
        class: &Self::Class,
        constructor: &Self::Constructor,
        args: Vec<Arg<Self::Object>>,
    ) -> Result<Self::Object>;

    /// Allocate a fixed-length int array holding `values`
    fn new_int_array(&self, values: &[i32]) -> Result<Self::Object>;

    /// Allocate an array of `element_class` instances
    fn new_object_array(
        &self,
        element_class: &Self::Class,
        elements: Vec<Self::Object>,
    ) -> Result<Self::Object>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_display() {
        let signature = Signature::new(vec![
            ParamKind::String,
            ParamKind::ObjectArray("mtbridge/Hypothesis".to_string()),
            ParamKind::IntArray,
        ]);
        assert_eq!(
            signature.to_string(),
            "(String, mtbridge/Hypothesis[], i32[])"
        );
        assert_eq!(signature.arity(), 3);
    }
}
