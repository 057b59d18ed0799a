//! Hypothesis object construction

use tracing::trace;

use crate::error::Result;
use crate::handle::ConstructorHandle;
use crate::runtime::{Arg, ManagedRuntime, ParamKind, Signature};
use crate::types::Candidate;

/// Builds one runtime `Hypothesis` object per decoded candidate.
///
/// The class and its `(String, f32, String)` constructor are resolved on
/// first use and reused afterwards.
pub struct HypothesisBuilder<R: ManagedRuntime> {
    handle: ConstructorHandle<R>,
}

impl<R: ManagedRuntime> HypothesisBuilder<R> {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            handle: ConstructorHandle::new(class_name, Self::signature()),
        }
    }

    /// Constructor shape: `(text, totalScore, featureValues)`
    pub fn signature() -> Signature {
        Signature::new(vec![ParamKind::String, ParamKind::Float, ParamKind::String])
    }

    pub fn class_name(&self) -> &str {
        self.handle.class_name()
    }

    pub fn is_resolved(&self) -> bool {
        self.handle.is_resolved()
    }

    /// Force resolution, e.g. during a single-threaded init phase
    pub fn resolve(&self, runtime: &R) -> Result<()> {
        self.handle.resolve(runtime).map(|_| ())
    }

    /// Construct a hypothesis. The score is passed through as is, NaN and
    /// infinities included; feature values are copied verbatim.
    pub fn create(
        &self,
        runtime: &R,
        text: &str,
        total_score: f32,
        feature_values: &str,
    ) -> Result<R::Object> {
        let resolved = self.handle.resolve(runtime)?;
        trace!(
            class = %self.handle.class_name(),
            text_len = text.len(),
            total_score,
            "constructing hypothesis"
        );
        runtime.new_object(
            &resolved.class,
            &resolved.constructor,
            vec![
                Arg::Str(text.to_string()),
                Arg::Float(total_score),
                Arg::Str(feature_values.to_string()),
            ],
        )
    }

    pub fn create_from(&self, runtime: &R, candidate: &Candidate) -> Result<R::Object> {
        self.create(
            runtime,
            &candidate.text,
            candidate.total_score,
            &candidate.feature_values,
        )
    }

    /// Allocate the runtime array holding an n-best list, typed with this
    /// builder's class.
    pub fn new_array(&self, runtime: &R, hypotheses: Vec<R::Object>) -> Result<R::Object> {
        let resolved = self.handle.resolve(runtime)?;
        runtime.new_object_array(&resolved.class, hypotheses)
    }
}
