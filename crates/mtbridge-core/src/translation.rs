//! Translation object construction
//!
//! A translation is built from already-constructed runtime arrays: the n-best
//! hypothesis array and the alignment int array. Both move into the result
//! and are owned by it once construction succeeds.
//!
//! Two constructor shapes are supported. The narrow one,
//! `(text, hypotheses, alignment)`, leaves the `source` field at the
//! runtime type's default. The extended one,
//! `(text, hypotheses, alignment, source)`, sets it explicitly. Each is
//! resolved lazily and independently.

use tracing::trace;

use crate::error::Result;
use crate::handle::ConstructorHandle;
use crate::runtime::{Arg, ManagedRuntime, ParamKind, Signature};

pub struct TranslationBuilder<R: ManagedRuntime> {
    narrow: ConstructorHandle<R>,
    with_source: ConstructorHandle<R>,
}

impl<R: ManagedRuntime> TranslationBuilder<R> {
    /// `hypothesis_class` names the element type of the n-best array
    pub fn new(class_name: impl Into<String>, hypothesis_class: &str) -> Self {
        let class_name = class_name.into();
        Self {
            narrow: ConstructorHandle::new(class_name.clone(), Self::signature(hypothesis_class)),
            with_source: ConstructorHandle::new(
                class_name,
                Self::signature_with_source(hypothesis_class),
            ),
        }
    }

    /// `(text, hypotheses, alignment)`
    pub fn signature(hypothesis_class: &str) -> Signature {
        Signature::new(vec![
            ParamKind::String,
            ParamKind::ObjectArray(hypothesis_class.to_string()),
            ParamKind::IntArray,
        ])
    }

    /// `(text, hypotheses, alignment, source)`
    pub fn signature_with_source(hypothesis_class: &str) -> Signature {
        let mut params = Self::signature(hypothesis_class).params().to_vec();
        params.push(ParamKind::String);
        Signature::new(params)
    }

    pub fn class_name(&self) -> &str {
        self.narrow.class_name()
    }

    pub fn is_resolved(&self) -> bool {
        self.narrow.is_resolved()
    }

    pub fn is_source_resolved(&self) -> bool {
        self.with_source.is_resolved()
    }

    /// Force resolution of the narrow constructor
    pub fn resolve(&self, runtime: &R) -> Result<()> {
        self.narrow.resolve(runtime).map(|_| ())
    }

    /// Build a translation through the narrow constructor; `source` keeps
    /// its default.
    pub fn create(
        &self,
        runtime: &R,
        text: &str,
        hypotheses: R::Object,
        alignment: R::Object,
    ) -> Result<R::Object> {
        let resolved = self.narrow.resolve(runtime)?;
        trace!(class = %self.narrow.class_name(), "constructing translation");
        runtime.new_object(
            &resolved.class,
            &resolved.constructor,
            vec![
                Arg::Str(text.to_string()),
                Arg::Object(hypotheses),
                Arg::Object(alignment),
            ],
        )
    }

    /// Build a translation through the extended constructor, carrying the
    /// source sentence.
    pub fn create_with_source(
        &self,
        runtime: &R,
        text: &str,
        hypotheses: R::Object,
        alignment: R::Object,
        source: &str,
    ) -> Result<R::Object> {
        let resolved = self.with_source.resolve(runtime)?;
        trace!(class = %self.with_source.class_name(), "constructing translation with source");
        runtime.new_object(
            &resolved.class,
            &resolved.constructor,
            vec![
                Arg::Str(text.to_string()),
                Arg::Object(hypotheses),
                Arg::Object(alignment),
                Arg::Str(source.to_string()),
            ],
        )
    }
}
