//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using pdfsift from other
//! languages such as C#, Python, and Node.js. Requests and reports cross the
//! boundary as JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::render::{self, JsonFormat};
use crate::{analyze_file, analyze_json};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct PdfsiftResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The report JSON (null if failed). Must be freed with `pdfsift_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `pdfsift_free_result`.
    pub error: *mut c_char,
}

impl PdfsiftResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }

    fn from_report(report: crate::Result<crate::DocumentReport>, pretty: bool) -> Self {
        let format = if pretty {
            JsonFormat::Pretty
        } else {
            JsonFormat::Compact
        };
        match report.and_then(|r| render::to_json(&r, format)) {
            Ok(json) => Self::success(json),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, PdfsiftResult> {
    if ptr.is_null() {
        return Err(PdfsiftResult::error(format!("{} cannot be null", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| PdfsiftResult::error(format!("Invalid UTF-8 {}", what.to_lowercase())))
}

/// Analyze a JSON request (or bare document) and return the report as JSON.
///
/// # Safety
///
/// The `request` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `pdfsift_free_result`.
#[no_mangle]
pub unsafe extern "C" fn pdfsift_analyze_json(request: *const c_char, pretty: bool) -> PdfsiftResult {
    let json = match read_str(request, "Request") {
        Ok(s) => s,
        Err(result) => return result,
    };
    PdfsiftResult::from_report(analyze_json(json), pretty)
}

/// Analyze a JSON request file and return the report as JSON.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `pdfsift_free_result`.
#[no_mangle]
pub unsafe extern "C" fn pdfsift_analyze_file(path: *const c_char, pretty: bool) -> PdfsiftResult {
    let path_str = match read_str(path, "Path") {
        Ok(s) => s,
        Err(result) => return result,
    };
    PdfsiftResult::from_report(analyze_file(Path::new(path_str)), pretty)
}

/// Free a result returned by any pdfsift function.
///
/// # Safety
///
/// The `result` must have been returned by a pdfsift function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn pdfsift_free_result(result: PdfsiftResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by pdfsift.
///
/// # Safety
///
/// The `ptr` must have been allocated by pdfsift.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn pdfsift_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the pdfsift library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn pdfsift_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = pdfsift_version();
        assert!(!version.is_null());
        let text = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(text, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_null_request() {
        unsafe {
            let result = pdfsift_analyze_json(ptr::null(), false);
            assert!(!result.success);
            assert!(!result.error.is_null());
            pdfsift_free_result(result);
        }
    }

    #[test]
    fn test_null_path() {
        unsafe {
            let result = pdfsift_analyze_file(ptr::null(), true);
            assert!(!result.success);
            pdfsift_free_result(result);
        }
    }

    #[test]
    fn test_analyze_json_roundtrip() {
        let request = CString::new(r#"{ "pages": [ { "index": 0, "text": "hello" } ] }"#).unwrap();
        unsafe {
            let result = pdfsift_analyze_json(request.as_ptr(), false);
            assert!(result.success);
            let json = CStr::from_ptr(result.data).to_str().unwrap().to_string();
            assert!(json.contains("\"documentSuspicionScore\""));
            pdfsift_free_result(result);
        }
    }

    #[test]
    fn test_invalid_request_reports_error() {
        let request = CString::new("{ \"pages\": [] }").unwrap();
        unsafe {
            let result = pdfsift_analyze_json(request.as_ptr(), false);
            assert!(!result.success);
            let message = CStr::from_ptr(result.error).to_str().unwrap().to_string();
            assert_eq!(message, "Document has no pages");
            pdfsift_free_result(result);
        }
    }
}
