//! Error handling for Python bindings
//!
//! This module defines the exception types raised by the bindings and maps
//! core errors onto them.

use mtbridge_core::Error;
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;

create_exception!(mtbridge, MtBridgeError, PyException);
create_exception!(mtbridge, LinkageError, MtBridgeError);
create_exception!(mtbridge, ConstructionError, MtBridgeError);
create_exception!(mtbridge, NarrowingError, MtBridgeError);

/// Convert a core error into a Python exception.
///
/// An exception raised by a Python constructor is re-raised unchanged.
pub fn to_py_err(error: Error) -> PyErr {
    match error {
        Error::Construction {
            class,
            message,
            source: Some(source),
        } => match source.downcast::<PyErr>() {
            Ok(py_err) => *py_err,
            Err(_) => ConstructionError::new_err(format!("{}: {}", class, message)),
        },
        e @ Error::Construction { .. } => ConstructionError::new_err(e.to_string()),
        e @ Error::Linkage { .. } => LinkageError::new_err(e.to_string()),
        e @ Error::Narrowing { .. } => NarrowingError::new_err(e.to_string()),
        e @ Error::MalformedAlignment { .. } => PyValueError::new_err(e.to_string()),
        e => MtBridgeError::new_err(e.to_string()),
    }
}
