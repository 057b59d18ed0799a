//! MTBridge Core - marshaling decoder output into managed-runtime objects
//!
//! This crate turns what a machine-translation decoder produces for one
//! sentence (an n-best list, scores, feature values and a word alignment)
//! into objects owned by a managed runtime on the other side of an FFI
//! boundary.
//!
//! # Main Components
//!
//! - **Alignment encoding**: pairs flattened into a checked `i32` array
//! - **HypothesisBuilder**: one runtime object per candidate
//! - **TranslationBuilder**: the per-sentence result object
//! - **ManagedRuntime**: the seam to the runtime that owns the object model
//! - **ObjectModel**: an in-process runtime used by the C ABI and by tests
//!
//! # Example
//!
//! ```
//! use mtbridge_core::{BridgeConfig, Candidate, DecoderOutput, ObjectModel, ResultMarshaller};
//!
//! # fn main() -> mtbridge_core::Result<()> {
//! let runtime = ObjectModel::with_default_classes();
//! let marshaller = ResultMarshaller::new(&BridgeConfig::default());
//!
//! let output = DecoderOutput::new("le chat noir")
//!     .with_candidate(Candidate::new("the black cat", 0.95, "lm=0.3;tm=0.65"))
//!     .with_alignment([(0, 1), (1, 2), (2, 0)]);
//!
//! let translation = marshaller.marshal(&runtime, &output)?;
//! assert_eq!(translation.to_json()["alignment"], serde_json::json!([0, 1, 1, 2, 2, 0]));
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod config;
pub mod error;
pub mod handle;
pub mod hypothesis;
pub mod marshal;
pub mod object_model;
pub mod runtime;
pub mod translation;
pub mod types;

pub use alignment::{encode_alignment, to_runtime_array, AlignmentEncoding};
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use handle::ConstructorHandle;
pub use hypothesis::HypothesisBuilder;
pub use marshal::ResultMarshaller;
pub use object_model::{ClassDef, ObjectModel, Value, HYPOTHESIS_CLASS, TRANSLATION_CLASS};
pub use runtime::{Arg, ManagedRuntime, ParamKind, Signature};
pub use translation::TranslationBuilder;
pub use types::{AlignmentPair, AlignmentSide, Candidate, DecoderOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
