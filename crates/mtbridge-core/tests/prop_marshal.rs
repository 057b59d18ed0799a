//! Property-based tests for the marshaling layer
//!
//! These tests check the laws that must hold for every decoder output:
//! alignment encoding round-trips, construction is lossless and n-best
//! order is preserved.

use mtbridge_core::{
    encode_alignment, AlignmentPair, BridgeConfig, Candidate, DecoderOutput, Error,
    HypothesisBuilder, ObjectModel, ResultMarshaller, Value, HYPOTHESIS_CLASS,
};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for alignment pairs inside the transfer width
fn alignment_pair_strategy() -> impl Strategy<Value = AlignmentPair> {
    (0usize..=i32::MAX as usize, 0usize..=i32::MAX as usize)
        .prop_map(|(source, target)| AlignmentPair::new(source, target))
}

/// Strategy for decoder candidates
fn candidate_strategy() -> impl Strategy<Value = Candidate> {
    (
        "[a-zA-Z0-9 .,!?]{0,60}",       // text
        any::<f32>(),                   // total score, NaN and infinities included
        "([a-z]{1,4}=[0-9.]{1,5};){0,4}", // feature values
    )
        .prop_map(|(text, score, fvals)| Candidate::new(text, score, fvals))
}

proptest! {
    #[test]
    fn alignment_round_trips(pairs in vec(alignment_pair_strategy(), 0..64)) {
        let encoding = encode_alignment(&pairs).unwrap();
        prop_assert_eq!(encoding.as_slice().len(), pairs.len() * 2);
        prop_assert_eq!(encoding.decode(), pairs);
    }

    #[test]
    fn oversized_indices_never_encode(
        prefix in vec(alignment_pair_strategy(), 0..8),
        excess in 1usize..1_000_000,
        on_source in any::<bool>(),
    ) {
        let big = i32::MAX as usize + excess;
        let mut pairs = prefix.clone();
        pairs.push(if on_source { AlignmentPair::new(big, 0) } else { AlignmentPair::new(0, big) });

        match encode_alignment(&pairs) {
            Err(Error::Narrowing { position, value, .. }) => {
                prop_assert_eq!(position, prefix.len());
                prop_assert_eq!(value, big);
            }
            other => prop_assert!(false, "expected narrowing error, got {:?}", other),
        }
    }

    #[test]
    fn hypothesis_construction_is_lossless(candidate in candidate_strategy()) {
        let model = ObjectModel::with_default_classes();
        let builder = HypothesisBuilder::new(HYPOTHESIS_CLASS);

        let object = builder.create_from(&model, &candidate).unwrap();

        prop_assert_eq!(object.field("text").and_then(Value::as_str), Some(candidate.text.as_str()));
        let score = object.field("totalScore").and_then(Value::as_f32).unwrap();
        prop_assert_eq!(score.to_bits(), candidate.total_score.to_bits());
        prop_assert_eq!(
            object.field("featureValues").and_then(Value::as_str),
            Some(candidate.feature_values.as_str())
        );
    }

    #[test]
    fn nbest_order_and_length_preserved(nbest in vec(candidate_strategy(), 0..16)) {
        let model = ObjectModel::with_default_classes();
        let marshaller = ResultMarshaller::new(&BridgeConfig::default());
        let mut output = DecoderOutput::new("source text");
        output.nbest = nbest.clone();

        let translation = marshaller.marshal(&model, &output).unwrap();
        let elements = translation.field("hypotheses").and_then(Value::elements).unwrap();

        prop_assert_eq!(elements.len(), nbest.len());
        for (element, candidate) in elements.iter().zip(&nbest) {
            prop_assert_eq!(element.field("text").and_then(Value::as_str), Some(candidate.text.as_str()));
        }
    }
}
