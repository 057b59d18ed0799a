//! Error types for the MTBridge core library
//!
//! Every failure of a marshaling call surfaces through [`Error`]. Nothing is
//! recovered locally: a failed conversion aborts that single result and the
//! caller decides what to do next.

use thiserror::Error;

use crate::types::AlignmentSide;

/// Boxed error coming from a foreign runtime or a constructor validator
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for MTBridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A class or constructor handle could not be resolved in the managed runtime.
    ///
    /// This points at a build/version mismatch between the bridge and the
    /// runtime's types and is never retried.
    #[error("Linkage error: cannot resolve {class}{signature}: {message}")]
    Linkage {
        class: String,
        signature: String,
        message: String,
    },

    /// The managed runtime raised while constructing an object
    #[error("Construction error: {class} - {message}")]
    Construction {
        class: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// An alignment index does not fit the transfer integer width
    #[error("Narrowing error: {side} index {value} of alignment pair {position} exceeds {max}")]
    Narrowing {
        position: usize,
        side: AlignmentSide,
        value: usize,
        max: i32,
    },

    /// A flat alignment array that cannot be decoded back into pairs
    #[error("Malformed alignment: {message}")]
    MalformedAlignment { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a construction error that wraps a runtime-level failure
    pub fn construction<E>(class: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        let source = source.into();
        Error::Construction {
            class: class.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Build a linkage error for a class/signature pair
    pub fn linkage(
        class: impl Into<String>,
        signature: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Linkage {
            class: class.into(),
            signature: signature.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the runtime types do not match the bridge
    pub fn is_linkage(&self) -> bool {
        matches!(self, Error::Linkage { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrowing_message_names_the_pair() {
        let err = Error::Narrowing {
            position: 3,
            side: AlignmentSide::Target,
            value: 1 << 40,
            max: i32::MAX,
        };
        let msg = err.to_string();
        assert!(msg.contains("target"));
        assert!(msg.contains("pair 3"));
        assert!(msg.contains(&(1usize << 40).to_string()));
    }

    #[test]
    fn test_construction_keeps_source() {
        let err = Error::construction("mtbridge/Hypothesis", anyhow::anyhow!("score rejected"));
        assert_eq!(
            err.to_string(),
            "Construction error: mtbridge/Hypothesis - score rejected"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_linkage());
    }
}
