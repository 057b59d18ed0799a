//! Alignment encoding for cross-runtime transfer
//!
//! Alignment pairs travel as one flat `i32` array: element `2i` is the source
//! index of pair `i` and element `2i + 1` its target index.

use crate::error::{Error, Result};
use crate::runtime::ManagedRuntime;
use crate::types::{AlignmentPair, AlignmentSide};

/// Flat transfer form of an alignment
///
/// Always even-length with non-negative entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentEncoding(Vec<i32>);

impl AlignmentEncoding {
    /// Accept a flat array received from the other side of the boundary
    pub fn from_flat(values: Vec<i32>) -> Result<Self> {
        if values.len() % 2 != 0 {
            return Err(Error::MalformedAlignment {
                message: format!("flat alignment has odd length {}", values.len()),
            });
        }
        if let Some(offset) = values.iter().position(|v| *v < 0) {
            return Err(Error::MalformedAlignment {
                message: format!(
                    "negative index {} at offset {}",
                    values[offset], offset
                ),
            });
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.0
    }

    /// Number of encoded pairs (half the flat length)
    pub fn pair_count(&self) -> usize {
        self.0.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = AlignmentPair> + '_ {
        self.0
            .chunks_exact(2)
            .map(|chunk| AlignmentPair::new(chunk[0] as usize, chunk[1] as usize))
    }

    /// Decode back into the original pair list
    pub fn decode(&self) -> Vec<AlignmentPair> {
        self.pairs().collect()
    }
}

/// Encode alignment pairs into the flat transfer form.
///
/// An empty input yields an empty encoding. Any index above `i32::MAX` fails
/// with [`Error::Narrowing`] instead of being truncated.
pub fn encode_alignment(pairs: &[AlignmentPair]) -> Result<AlignmentEncoding> {
    let mut flat = Vec::with_capacity(pairs.len() * 2);
    for (position, pair) in pairs.iter().enumerate() {
        flat.push(narrow(position, AlignmentSide::Source, pair.source)?);
        flat.push(narrow(position, AlignmentSide::Target, pair.target)?);
    }
    Ok(AlignmentEncoding(flat))
}

fn narrow(position: usize, side: AlignmentSide, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::Narrowing {
        position,
        side,
        value,
        max: i32::MAX,
    })
}

/// Allocate the runtime-side int array for an encoding.
///
/// Ownership of the returned array passes to whatever object embeds it.
pub fn to_runtime_array<R: ManagedRuntime>(
    runtime: &R,
    encoding: &AlignmentEncoding,
) -> Result<R::Object> {
    runtime.new_int_array(encoding.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(usize, usize)]) -> Vec<AlignmentPair> {
        raw.iter().copied().map(AlignmentPair::from).collect()
    }

    #[test]
    fn test_encode_preserves_pair_order() {
        let encoding = encode_alignment(&pairs(&[(0, 1), (1, 2), (2, 0)])).unwrap();
        assert_eq!(encoding.as_slice(), &[0, 1, 1, 2, 2, 0]);
        assert_eq!(encoding.pair_count(), 3);
    }

    #[test]
    fn test_empty_alignment_is_zero_length() {
        let encoding = encode_alignment(&[]).unwrap();
        assert!(encoding.is_empty());
        assert_eq!(encoding.as_slice().len(), 0);
        assert!(encoding.decode().is_empty());
    }

    #[test]
    fn test_max_index_is_accepted() {
        let max = i32::MAX as usize;
        let encoding = encode_alignment(&pairs(&[(max, 0)])).unwrap();
        assert_eq!(encoding.as_slice(), &[i32::MAX, 0]);
    }

    #[test]
    fn test_oversized_index_fails_instead_of_wrapping() {
        let too_big = i32::MAX as usize + 1;
        let err = encode_alignment(&pairs(&[(0, 0), (3, too_big)])).unwrap_err();

        match err {
            Error::Narrowing {
                position,
                side,
                value,
                max,
            } => {
                assert_eq!(position, 1);
                assert_eq!(side, AlignmentSide::Target);
                assert_eq!(value, too_big);
                assert_eq!(max, i32::MAX);
            }
            other => panic!("expected narrowing error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_flat_rejects_odd_length() {
        let err = AlignmentEncoding::from_flat(vec![0, 1, 2]).unwrap_err();
        assert!(matches!(err, Error::MalformedAlignment { .. }));
    }

    #[test]
    fn test_from_flat_rejects_negative_index() {
        let err = AlignmentEncoding::from_flat(vec![0, -1]).unwrap_err();
        assert!(err.to_string().contains("offset 1"));
    }

    #[test]
    fn test_from_flat_decodes() {
        let encoding = AlignmentEncoding::from_flat(vec![4, 2, 0, 0]).unwrap();
        assert_eq!(encoding.decode(), pairs(&[(4, 2), (0, 0)]));
    }
}
