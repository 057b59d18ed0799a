//! Memory management utilities for FFI
//!
//! Everything MTBridge allocates for the caller has a matching `*_free`
//! function here.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::types::{MtBridgeIntArray, MtBridgeResult};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
pub fn set_last_error<S: Into<String>>(err: S) {
    let error_string = CString::new(err.into())
        .unwrap_or_else(|_| c"Error message contained null byte".to_owned());

    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(error_string);
    });
}

/// Clear the last error message
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Allocate a new string for FFI return
///
/// # Safety
/// The caller must free this string using `mtbridge_string_free`
pub unsafe fn allocate_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => {
            set_last_error("String contains null byte");
            ptr::null_mut()
        }
    }
}

/// Free a string allocated by MTBridge
///
/// # Safety
/// The pointer must have been returned by an MTBridge function
#[no_mangle]
pub unsafe extern "C" fn mtbridge_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(CString::from_raw(s));
}

/// Move an encoded alignment into a caller-owned int array
pub fn allocate_int_array(values: Vec<i32>) -> MtBridgeIntArray {
    let boxed = values.into_boxed_slice();
    let len = boxed.len();
    let data = Box::into_raw(boxed) as *mut i32;
    MtBridgeIntArray { data, len }
}

/// Free an int array allocated by MTBridge
///
/// # Safety
/// The array must have been filled by `mtbridge_encode_alignment` and not
/// freed before.
#[no_mangle]
pub unsafe extern "C" fn mtbridge_int_array_free(array: MtBridgeIntArray) {
    if array.data.is_null() {
        return;
    }
    let slice = ptr::slice_from_raw_parts_mut(array.data, array.len);
    drop(Box::from_raw(slice));
}

/// Convert a C string to a Rust string
///
/// # Safety
/// The pointer must be a valid null-terminated C string
pub unsafe fn c_str_to_string(s: *const c_char) -> Result<String, MtBridgeResult> {
    if s.is_null() {
        set_last_error("String argument is null");
        return Err(MtBridgeResult::NullPointer);
    }

    match CStr::from_ptr(s).to_str() {
        Ok(str) => Ok(str.to_string()),
        Err(_) => {
            set_last_error("Invalid UTF-8 in input string");
            Err(MtBridgeResult::Utf8Error)
        }
    }
}

/// Get the last error message
///
/// # Safety
/// Returns a pointer that should NOT be freed by the caller. It stays valid
/// until the next MTBridge call on the same thread.
#[no_mangle]
pub unsafe extern "C" fn mtbridge_get_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn mtbridge_clear_error() {
    clear_last_error();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_handling() {
        set_last_error("Test error");
        unsafe {
            let error = mtbridge_get_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert_eq!(error_str, "Test error");
        }

        clear_last_error();
        unsafe {
            assert!(mtbridge_get_last_error().is_null());
        }
    }

    #[test]
    fn test_string_allocation() {
        unsafe {
            let s = allocate_string("le chat noir");
            assert!(!s.is_null());
            assert_eq!(CStr::from_ptr(s).to_str().unwrap(), "le chat noir");
            mtbridge_string_free(s);
        }
    }

    #[test]
    fn test_empty_int_array_is_not_null() {
        let array = allocate_int_array(Vec::new());
        assert_eq!(array.len, 0);
        assert!(!array.data.is_null());
        unsafe { mtbridge_int_array_free(array) };
    }
}
