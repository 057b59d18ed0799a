//! End-to-end conversion of one decoder output

use tracing::debug;

use crate::alignment::{encode_alignment, to_runtime_array};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::hypothesis::HypothesisBuilder;
use crate::runtime::ManagedRuntime;
use crate::translation::TranslationBuilder;
use crate::types::DecoderOutput;

/// Owns a hypothesis builder and a translation builder and drives them for
/// each sentence.
///
/// Nothing is published until every piece has been built: a failure while
/// converting any candidate or the alignment returns the error and drops
/// whatever was already allocated for that sentence.
pub struct ResultMarshaller<R: ManagedRuntime> {
    hypotheses: HypothesisBuilder<R>,
    translations: TranslationBuilder<R>,
    include_source: bool,
}

impl<R: ManagedRuntime> ResultMarshaller<R> {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            hypotheses: HypothesisBuilder::new(config.hypothesis_class.clone()),
            translations: TranslationBuilder::new(
                config.translation_class.clone(),
                &config.hypothesis_class,
            ),
            include_source: config.include_source,
        }
    }

    pub fn hypotheses(&self) -> &HypothesisBuilder<R> {
        &self.hypotheses
    }

    pub fn translations(&self) -> &TranslationBuilder<R> {
        &self.translations
    }

    pub fn marshal(&self, runtime: &R, output: &DecoderOutput) -> Result<R::Object> {
        // Narrowing is checked before any runtime allocation.
        let encoding = encode_alignment(&output.alignment)?;

        let objects = output
            .nbest
            .iter()
            .map(|candidate| self.hypotheses.create_from(runtime, candidate))
            .collect::<Result<Vec<_>>>()?;

        let nbest = self.hypotheses.new_array(runtime, objects)?;
        let alignment = to_runtime_array(runtime, &encoding)?;

        debug!(
            hypotheses = output.nbest.len(),
            alignment_pairs = encoding.pair_count(),
            "marshaling translation"
        );

        match output.source.as_deref() {
            Some(source) if self.include_source => self
                .translations
                .create_with_source(runtime, &output.text, nbest, alignment, source),
            _ => self
                .translations
                .create(runtime, &output.text, nbest, alignment),
        }
    }
}
