//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility.

/// Result codes for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtBridgeResult {
    /// Operation completed successfully
    Success = 0,
    /// Invalid input parameters
    InvalidInput = -1,
    /// JSON parsing error
    JsonError = -2,
    /// Runtime class or constructor could not be resolved
    LinkageError = -3,
    /// Object construction failed
    ConstructionError = -4,
    /// Alignment index does not fit a 32-bit int
    NarrowingError = -5,
    /// Flat alignment array cannot be decoded
    MalformedAlignment = -6,
    /// Invalid configuration
    ConfigurationError = -7,
    /// Internal error
    InternalError = -9,
    /// Memory allocation failure
    MemoryError = -10,
    /// Invalid UTF-8 string
    Utf8Error = -11,
    /// Null pointer provided
    NullPointer = -12,
}

/// Opaque handle for a marshaling context
///
/// A context owns one set of builders, so class and constructor handles are
/// resolved once per context.
#[repr(C)]
pub struct MtBridgeContext {
    _private: [u8; 0],
}

/// Int array allocated by MTBridge
#[repr(C)]
#[derive(Debug)]
pub struct MtBridgeIntArray {
    /// Pointer to the first element; dangling but non-null when `len` is 0
    pub data: *mut i32,
    /// Number of elements
    pub len: usize,
}

impl MtBridgeResult {
    /// Check if the result indicates success
    pub fn is_success(self) -> bool {
        self == MtBridgeResult::Success
    }

    /// Get a human-readable error message
    pub fn error_message(self) -> &'static str {
        match self {
            MtBridgeResult::Success => "Success",
            MtBridgeResult::InvalidInput => "Invalid input parameters",
            MtBridgeResult::JsonError => "JSON parsing error",
            MtBridgeResult::LinkageError => "Class or constructor could not be resolved",
            MtBridgeResult::ConstructionError => "Object construction failed",
            MtBridgeResult::NarrowingError => "Alignment index exceeds 32-bit range",
            MtBridgeResult::MalformedAlignment => "Malformed alignment array",
            MtBridgeResult::ConfigurationError => "Invalid configuration",
            MtBridgeResult::InternalError => "Internal error",
            MtBridgeResult::MemoryError => "Memory allocation failed",
            MtBridgeResult::Utf8Error => "Invalid UTF-8 string",
            MtBridgeResult::NullPointer => "Null pointer provided",
        }
    }
}
