//! MTBridge FFI - C ABI for marshaling decoder output
//!
//! This crate exposes the MTBridge core over a C-compatible interface.
//! Decoder output goes in as JSON, the constructed translation comes back
//! as JSON, and alignments can be encoded into caller-owned int arrays.
//!
//! # Safety
//!
//! All FFI functions are marked `unsafe` as they deal with raw pointers
//! and cross-language boundaries. Users must ensure:
//! - Proper memory management (free returned strings and arrays)
//! - Valid UTF-8 strings
//! - Non-null pointers where required
//! - A context is not freed while another thread is using it

#![warn(missing_docs)]

#[macro_use]
mod error;
mod api;
mod memory;
mod types;

pub use api::*;
pub use memory::{mtbridge_clear_error, mtbridge_get_last_error, mtbridge_int_array_free, mtbridge_string_free};
pub use types::{MtBridgeContext, MtBridgeIntArray, MtBridgeResult};

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_version() {
        let version = mtbridge_version();
        assert!(!version.is_null());
        let version = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }
}
