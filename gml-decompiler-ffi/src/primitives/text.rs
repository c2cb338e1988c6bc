use std::fmt;
use std::marker::PhantomData;

use crate::error::{FfiError, FfiResult};

/// Host-owned UTF-8 text, viewed in place. Not NUL-terminated.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawStr<'a> {
    ptr: *const u8,
    len: usize,
    _marker: PhantomData<&'a str>,
}

impl<'a> RawStr<'a> {
    pub const EMPTY: Self = Self {
        ptr: std::ptr::null(),
        len: 0,
        _marker: PhantomData,
    };

    pub fn new(text: &'a str) -> Self {
        Self {
            ptr: text.as_ptr(),
            len: text.len(),
            _marker: PhantomData,
        }
    }

    /// Whether the host supplied any text at all.
    pub fn exists(&self) -> bool {
        self.len != 0
    }

    /// Decodes the text. Validation runs on every call.
    pub fn content(&self) -> FfiResult<&'a str> {
        if self.len == 0 {
            return Ok("");
        }
        if self.ptr.is_null() {
            return Err(FfiError::NullPointer {
                what: "text",
                len: self.len,
            });
        }
        // SAFETY: the host guarantees `len` readable bytes at `ptr` for the
        // lifetime of the view.
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        Ok(std::str::from_utf8(bytes)?)
    }
}

impl fmt::Debug for RawStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.content() {
            Ok(text) => write!(f, "{:?}", text),
            Err(err) => write!(f, "<{}>", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        let name = RawStr::new("obj_player");
        assert!(name.exists());
        assert_eq!(name.content().unwrap(), "obj_player");

        let accented = RawStr::new("café");
        assert_eq!(accented.content().unwrap(), "café");
    }

    #[test]
    fn empty_text_is_valid_and_absent() {
        let empty = RawStr::EMPTY;
        assert!(!empty.exists());
        assert_eq!(empty.content().unwrap(), "");
    }

    #[test]
    fn invalid_utf8_is_a_fault() {
        let bytes = [0x66u8, 0xFF, 0x6F];
        let text = RawStr {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
            _marker: PhantomData,
        };
        assert!(text.exists());
        assert!(matches!(text.content(), Err(FfiError::InvalidUtf8(_))));
    }

    #[test]
    fn null_with_length_is_a_fault() {
        let text = RawStr {
            ptr: std::ptr::null(),
            len: 4,
            _marker: PhantomData,
        };
        assert_eq!(
            text.content().unwrap_err(),
            FfiError::NullPointer { what: "text", len: 4 }
        );
    }
}
