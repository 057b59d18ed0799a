//! FFI API function definitions
//!
//! This module contains the extern "C" functions that form
//! the public API of the MTBridge FFI layer.

use std::os::raw::c_char;

use mtbridge_core::{
    encode_alignment, AlignmentPair, BridgeConfig, DecoderOutput, ObjectModel, ResultMarshaller,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{map_core_error, validate_ptr};
use crate::ffi_boundary;
use crate::memory::{allocate_int_array, allocate_string, c_str_to_string, clear_last_error, set_last_error};
use crate::types::{MtBridgeContext, MtBridgeIntArray, MtBridgeResult};

/// Internal context behind `MtBridgeContext`
pub(crate) struct ContextImpl {
    runtime: ObjectModel,
    marshaller: ResultMarshaller<ObjectModel>,
}

impl ContextImpl {
    pub(crate) fn new(config: &BridgeConfig) -> Self {
        debug!(
            hypothesis_class = %config.hypothesis_class,
            translation_class = %config.translation_class,
            include_source = config.include_source,
            "creating marshaling context"
        );
        Self {
            runtime: ObjectModel::with_default_classes(),
            marshaller: ResultMarshaller::new(config),
        }
    }

    /// Marshal one decoder output given as JSON and render the result as JSON
    pub(crate) fn marshal_json(&self, decoder_output_json: &str) -> Result<String, MtBridgeResult> {
        let output: DecoderOutput = serde_json::from_str(decoder_output_json).map_err(|e| {
            set_last_error(format!("Invalid decoder output JSON: {}", e));
            MtBridgeResult::JsonError
        })?;

        let translation = self
            .marshaller
            .marshal(&self.runtime, &output)
            .map_err(|e| {
                warn!(error = %e, "marshaling failed");
                map_core_error(e)
            })?;

        serde_json::to_string(&translation.to_json()).map_err(|e| {
            set_last_error(format!("Failed to serialize translation: {}", e));
            MtBridgeResult::JsonError
        })
    }
}

unsafe fn load_config(config_json: *const c_char) -> Result<BridgeConfig, MtBridgeResult> {
    let config = if config_json.is_null() {
        BridgeConfig::default()
    } else {
        BridgeConfig::from_json(&c_str_to_string(config_json)?).map_err(map_core_error)?
    };
    config.with_env_overrides().map_err(map_core_error)
}

unsafe fn write_output(out_json: *mut *mut c_char, json: &str) -> Result<MtBridgeResult, MtBridgeResult> {
    *out_json = allocate_string(json);
    if (*out_json).is_null() {
        return Err(MtBridgeResult::MemoryError);
    }
    Ok(MtBridgeResult::Success)
}

/// Library version as a static null-terminated string
#[no_mangle]
pub extern "C" fn mtbridge_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Install a `tracing` subscriber writing to stderr
///
/// `filter` uses `EnvFilter` syntax (e.g. `"mtbridge_core=debug"`); null
/// means `"warn"`. Calling again after a subscriber is installed is a no-op.
///
/// # Safety
/// `filter` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn mtbridge_init_logging(filter: *const c_char) -> MtBridgeResult {
    ffi_boundary!({
        clear_last_error();

        let directives = if filter.is_null() {
            "warn".to_string()
        } else {
            c_str_to_string(filter)?
        };
        let env_filter = EnvFilter::try_new(&directives).map_err(|e| {
            set_last_error(format!("Invalid log filter '{}': {}", directives, e));
            MtBridgeResult::InvalidInput
        })?;

        // A second call finds a subscriber already installed; that is fine.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();

        Ok(MtBridgeResult::Success)
    })
}

/// Create a marshaling context
///
/// `config_json` is a JSON `BridgeConfig` or null for defaults;
/// `MTBRIDGE_*` environment variables override either. Returns null on
/// failure with the reason available from `mtbridge_get_last_error`.
///
/// # Safety
/// The returned context must be freed with `mtbridge_context_free`
#[no_mangle]
pub unsafe extern "C" fn mtbridge_context_new(config_json: *const c_char) -> *mut MtBridgeContext {
    clear_last_error();

    let created = crate::error::catch_panic(move || {
        let config = load_config(config_json)?;
        Ok(Box::new(ContextImpl::new(&config)))
    });

    match created {
        Ok(context) => Box::into_raw(context) as *mut MtBridgeContext,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a marshaling context
///
/// # Safety
/// The context pointer must have been created by `mtbridge_context_new`
#[no_mangle]
pub unsafe extern "C" fn mtbridge_context_free(context: *mut MtBridgeContext) {
    if context.is_null() {
        return;
    }
    drop(Box::from_raw(context as *mut ContextImpl));
}

/// Marshal one decoder output into a translation
///
/// # Parameters
/// - `context`: context from `mtbridge_context_new`
/// - `decoder_output_json`: `{"text", "source"?, "nbest"?, "alignment"?}`
/// - `out_json`: receives the translation as JSON
///
/// # Safety
/// - All string pointers must be valid null-terminated C strings
/// - The output string must be freed with `mtbridge_string_free`
#[no_mangle]
pub unsafe extern "C" fn mtbridge_context_marshal(
    context: *const MtBridgeContext,
    decoder_output_json: *const c_char,
    out_json: *mut *mut c_char,
) -> MtBridgeResult {
    ffi_boundary!({
        clear_last_error();

        validate_ptr(context, "context")?;
        validate_ptr(decoder_output_json, "decoder_output_json")?;
        validate_ptr(out_json, "out_json")?;

        let context = &*(context as *const ContextImpl);
        let input = c_str_to_string(decoder_output_json)?;
        let result = context.marshal_json(&input)?;

        write_output(out_json, &result)
    })
}

/// One-shot marshaling with a fresh context built from `config_json`
///
/// # Safety
/// - `decoder_output_json` must be a valid null-terminated C string
/// - `config_json` must be null or a valid null-terminated C string
/// - The output string must be freed with `mtbridge_string_free`
#[no_mangle]
pub unsafe extern "C" fn mtbridge_marshal(
    decoder_output_json: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
) -> MtBridgeResult {
    ffi_boundary!({
        clear_last_error();

        validate_ptr(decoder_output_json, "decoder_output_json")?;
        validate_ptr(out_json, "out_json")?;

        let config = load_config(config_json)?;
        let input = c_str_to_string(decoder_output_json)?;
        let result = ContextImpl::new(&config).marshal_json(&input)?;

        write_output(out_json, &result)
    })
}

/// Encode alignment pairs into a flat int array
///
/// `pairs` holds `2 * pair_count` values laid out as
/// `source0, target0, source1, target1, ...`. It may be null when
/// `pair_count` is 0; the output is then a zero-length array.
///
/// # Safety
/// - `pairs` must point to `2 * pair_count` readable values
/// - The output array must be freed with `mtbridge_int_array_free`
#[no_mangle]
pub unsafe extern "C" fn mtbridge_encode_alignment(
    pairs: *const usize,
    pair_count: usize,
    out: *mut MtBridgeIntArray,
) -> MtBridgeResult {
    ffi_boundary!({
        clear_last_error();

        validate_ptr(out, "out")?;
        let flat: &[usize] = if pair_count == 0 {
            &[]
        } else {
            validate_ptr(pairs, "pairs")?;
            let len = pair_count.checked_mul(2).ok_or_else(|| {
                set_last_error("pair_count overflows");
                MtBridgeResult::InvalidInput
            })?;
            std::slice::from_raw_parts(pairs, len)
        };

        let pairs: Vec<AlignmentPair> = flat
            .chunks_exact(2)
            .map(|chunk| AlignmentPair::new(chunk[0], chunk[1]))
            .collect();
        let encoding = encode_alignment(&pairs).map_err(map_core_error)?;

        out.write(allocate_int_array(encoding.into_vec()));
        Ok(MtBridgeResult::Success)
    })
}
