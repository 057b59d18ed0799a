//! Lazily resolved class and constructor handles
//!
//! Each builder owns its handles. Resolution happens on first use and the
//! result is published once; later calls only read it.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::Result;
use crate::runtime::{ManagedRuntime, Signature};

/// A resolved class together with one of its constructors
pub struct Resolved<R: ManagedRuntime> {
    pub class: R::Class,
    pub constructor: R::Constructor,
}

/// Cache for one (class, signature) pair
pub struct ConstructorHandle<R: ManagedRuntime> {
    class_name: String,
    signature: Signature,
    resolved: OnceLock<Resolved<R>>,
}

impl<R: ManagedRuntime> ConstructorHandle<R> {
    pub fn new(class_name: impl Into<String>, signature: Signature) -> Self {
        Self {
            class_name: class_name.into(),
            signature,
            resolved: OnceLock::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Return the cached handles, resolving them on first use.
    ///
    /// Two threads racing on first use may both resolve; only the first
    /// result is kept and both see it.
    pub fn resolve(&self, runtime: &R) -> Result<&Resolved<R>> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }

        let resolved = self.lookup(runtime).inspect_err(|e| {
            warn!(
                class = %self.class_name,
                signature = %self.signature,
                error = %e,
                "failed to resolve constructor handle"
            );
        })?;

        debug!(
            class = %self.class_name,
            signature = %self.signature,
            "resolved constructor handle"
        );
        Ok(self.resolved.get_or_init(|| resolved))
    }

    fn lookup(&self, runtime: &R) -> Result<Resolved<R>> {
        let class = runtime.find_class(&self.class_name)?;
        let constructor = runtime.constructor(&class, &self.signature)?;
        Ok(Resolved { class, constructor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_model::{ObjectModel, HYPOTHESIS_CLASS};
    use crate::runtime::ParamKind;

    fn hypothesis_signature() -> Signature {
        Signature::new(vec![ParamKind::String, ParamKind::Float, ParamKind::String])
    }

    #[test]
    fn test_resolves_once() {
        let model = ObjectModel::with_default_classes();
        let handle = ConstructorHandle::<ObjectModel>::new(HYPOTHESIS_CLASS, hypothesis_signature());
        assert!(!handle.is_resolved());

        handle.resolve(&model).unwrap();
        handle.resolve(&model).unwrap();
        handle.resolve(&model).unwrap();

        assert!(handle.is_resolved());
        assert_eq!(model.class_lookups(), 1);
        assert_eq!(model.constructor_lookups(), 1);
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let model = ObjectModel::with_default_classes();
        let handle = ConstructorHandle::<ObjectModel>::new("missing/Type", hypothesis_signature());

        assert!(matches!(handle.resolve(&model), Err(e) if e.is_linkage()));
        assert!(!handle.is_resolved());
        assert!(handle.resolve(&model).is_err());
        assert_eq!(model.class_lookups(), 2);
    }
}
