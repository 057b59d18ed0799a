//! Error handling for FFI boundary
//!
//! Core errors become result codes plus a thread-local message; panics are
//! caught before they can unwind into foreign frames.

use std::any::Any;
use std::panic;

use mtbridge_core::Error;

use crate::memory::set_last_error;
use crate::types::MtBridgeResult;

/// Convert an MTBridge core error to an FFI result code
pub fn map_core_error(error: Error) -> MtBridgeResult {
    set_last_error(error.to_string());

    match error {
        Error::Linkage { .. } => MtBridgeResult::LinkageError,
        Error::Construction { .. } => MtBridgeResult::ConstructionError,
        Error::Narrowing { .. } => MtBridgeResult::NarrowingError,
        Error::MalformedAlignment { .. } => MtBridgeResult::MalformedAlignment,
        Error::Configuration { .. } => MtBridgeResult::ConfigurationError,
        Error::Json { .. } => MtBridgeResult::JsonError,
        Error::Io { .. } => MtBridgeResult::InternalError,
    }
}

/// Safely execute a closure that might panic
///
/// Panics are converted to `InternalError` with the panic message stored
/// as the last error.
pub fn catch_panic<F, R>(f: F) -> Result<R, MtBridgeResult>
where
    F: FnOnce() -> Result<R, MtBridgeResult> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            set_last_error(format!("Panic occurred: {}", msg));
            Err(MtBridgeResult::InternalError)
        }
    }
}

fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for safely executing FFI functions
#[macro_export]
macro_rules! ffi_boundary {
    ($body:expr) => {{
        match $crate::error::catch_panic(move || $body) {
            Ok(result) => result,
            Err(code) => return code,
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &str) -> Result<(), MtBridgeResult> {
    if ptr.is_null() {
        set_last_error(format!("{} is null", name));
        Err(MtBridgeResult::NullPointer)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtbridge_core::AlignmentSide;

    #[test]
    fn test_panic_catching() {
        let result = catch_panic(|| {
            panic!("Test panic");
            #[allow(unreachable_code)]
            Ok(42)
        });

        assert_eq!(result.unwrap_err(), MtBridgeResult::InternalError);
    }

    #[test]
    fn test_ptr_validation() {
        let value = 42;
        let ptr = &value as *const i32;

        assert!(validate_ptr(ptr, "test_ptr").is_ok());
        assert_eq!(
            validate_ptr(std::ptr::null::<i32>(), "null_ptr"),
            Err(MtBridgeResult::NullPointer)
        );
    }

    #[test]
    fn test_core_error_codes() {
        let narrowing = Error::Narrowing {
            position: 0,
            side: AlignmentSide::Source,
            value: usize::MAX,
            max: i32::MAX,
        };
        assert_eq!(map_core_error(narrowing), MtBridgeResult::NarrowingError);
        assert_eq!(
            map_core_error(Error::linkage("a/B", "()", "missing")),
            MtBridgeResult::LinkageError
        );
    }
}
