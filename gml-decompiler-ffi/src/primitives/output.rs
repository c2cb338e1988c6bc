use std::ffi::CString;
use std::os::raw::c_char;

use anyhow::{anyhow, Result};

pub const ERROR_NONE: u8 = 0;
pub const ERROR_FAILED: u8 = 1;

/// Text produced by the adapter and handed to the host.
///
/// Allocated as a NUL-terminated C string so it can be released from the
/// pointer alone; `len` excludes the terminator.
#[repr(C)]
#[derive(Debug)]
pub struct OutputString {
    pub ptr: *mut c_char,
    pub len: usize,
}

impl OutputString {
    pub fn new(text: String) -> Self {
        let text = if text.contains('\0') {
            text.replace('\0', "\\0")
        } else {
            text
        };
        let c_string = CString::new(text).unwrap_or_default();
        Self {
            len: c_string.as_bytes().len(),
            ptr: c_string.into_raw(),
        }
    }

    /// # Safety
    /// `ptr` must be null or come from [`OutputString::new`] and not have
    /// been released before.
    pub(crate) unsafe fn release(ptr: *mut c_char) {
        if !ptr.is_null() {
            drop(CString::from_raw(ptr));
        }
    }

    /// # Safety
    /// `self` must still own a live buffer.
    unsafe fn to_string_lossy(&self) -> String {
        if self.ptr.is_null() {
            return String::new();
        }
        let bytes = std::slice::from_raw_parts(self.ptr as *const u8, self.len);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Result of a boundary call: output text or diagnostic, plus an error byte.
#[repr(C)]
#[derive(Debug)]
pub struct ReturnValue {
    pub string: OutputString,
    pub error: u8,
}

impl ReturnValue {
    pub fn ok(text: String) -> Self {
        Self {
            string: OutputString::new(text),
            error: ERROR_NONE,
        }
    }

    pub fn failed(diagnostic: String) -> Self {
        Self {
            string: OutputString::new(diagnostic),
            error: ERROR_FAILED,
        }
    }

    /// Copies the text out, releases the buffer, and maps the error byte.
    ///
    /// # Safety
    /// `self` must have been returned by [`crate::decompile_to_string`] and
    /// its buffer not yet released.
    pub unsafe fn into_result(self) -> Result<String> {
        let text = self.string.to_string_lossy();
        crate::free_output(self.string.ptr);
        match self.error {
            ERROR_NONE => Ok(text),
            ERROR_FAILED => Err(anyhow!(text)),
            errno => Err(anyhow!(
                "Decompilation failed with error code {}: {}",
                errno,
                text
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_nul_terminated() {
        let out = OutputString::new("x = 5;".to_string());
        assert_eq!(out.len, 6);
        let terminator = unsafe { *out.ptr.add(out.len) };
        assert_eq!(terminator, 0);
        unsafe { OutputString::release(out.ptr) };
    }

    #[test]
    fn interior_nul_is_escaped() {
        let value = ReturnValue::ok("a\0b".to_string());
        assert_eq!(value.string.len, 4);
        assert_eq!(unsafe { value.into_result() }.unwrap(), "a\\0b");
    }

    #[test]
    fn error_bytes_map_to_results() {
        let ok = ReturnValue::ok("fine".to_string());
        assert_eq!(unsafe { ok.into_result() }.unwrap(), "fine");

        let failed = ReturnValue::failed("bad opcode".to_string());
        assert_eq!(unsafe { failed.into_result() }.unwrap_err().to_string(), "bad opcode");

        let odd = ReturnValue {
            string: OutputString::new("weird".to_string()),
            error: 7,
        };
        assert_eq!(
            unsafe { odd.into_result() }.unwrap_err().to_string(),
            "Decompilation failed with error code 7: weird"
        );
    }

    #[test]
    fn releasing_null_is_a_no_op() {
        unsafe { OutputString::release(std::ptr::null_mut()) };
    }
}
