//! MTBridge Python Bindings
//!
//! Exposes the marshaller to Python with PyO3. Decoder output handed to a
//! `Marshaller` comes back as `Hypothesis` and `Translation` instances, or
//! as instances of whichever classes the marshaller was configured with.

#![allow(non_local_definitions)] // PyO3 macros generate non-local impl blocks

use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

mod error;
mod runtime;
mod types;

use error::*;
use types::*;

/// MTBridge Python module
#[pymodule]
fn mtbridge(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add("MtBridgeError", py.get_type::<MtBridgeError>())?;
    m.add("LinkageError", py.get_type::<LinkageError>())?;
    m.add("ConstructionError", py.get_type::<ConstructionError>())?;
    m.add("NarrowingError", py.get_type::<NarrowingError>())?;

    m.add_function(wrap_pyfunction!(encode_alignment_pairs, m)?)?;
    m.add_function(wrap_pyfunction!(decode_alignment, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;

    m.add_class::<PyHypothesis>()?;
    m.add_class::<PyTranslation>()?;
    m.add_class::<PyMarshaller>()?;

    m.add("DEFAULT_HYPOTHESIS_CLASS", DEFAULT_HYPOTHESIS_CLASS)?;
    m.add("DEFAULT_TRANSLATION_CLASS", DEFAULT_TRANSLATION_CLASS)?;

    Ok(())
}

/// Get the version of the MTBridge library
#[pyfunction]
fn version() -> PyResult<String> {
    Ok(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
}
