use std::fmt;
use std::marker::PhantomData;

use crate::error::{FfiError, FfiResult};

/// A host-owned contiguous sequence, viewed in place.
///
/// Layout: `{ ptr, len, cap }`. `cap` is only used to reject views whose
/// length claims more elements than were allocated.
#[repr(C)]
pub struct RawArray<'a, T> {
    ptr: *const T,
    len: usize,
    cap: usize,
    _marker: PhantomData<&'a [T]>,
}

impl<'a, T: 'a> RawArray<'a, T> {
    pub const EMPTY: Self = Self {
        ptr: std::ptr::null(),
        len: 0,
        cap: 0,
        _marker: PhantomData,
    };

    pub fn from_slice(items: &'a [T]) -> Self {
        Self {
            ptr: items.as_ptr(),
            len: items.len(),
            cap: items.len(),
            _marker: PhantomData,
        }
    }

    /// A view as the host would lay it out. Nothing is checked until an
    /// element is read.
    ///
    /// # Safety
    /// A non-null `ptr` must stay valid for `len` reads of `T` for `'a`.
    pub unsafe fn from_raw_parts(ptr: *const T, len: usize, cap: usize) -> Self {
        Self {
            ptr,
            len,
            cap,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check(&self) -> FfiResult<()> {
        if self.len > self.cap {
            return Err(FfiError::LengthExceedsCapacity {
                len: self.len,
                cap: self.cap,
            });
        }
        if self.len == 0 {
            return Ok(());
        }
        if self.ptr.is_null() {
            return Err(FfiError::NullPointer {
                what: "array",
                len: self.len,
            });
        }
        let align = std::mem::align_of::<T>();
        if self.ptr as usize % align != 0 {
            return Err(FfiError::Misaligned {
                addr: self.ptr as usize,
                align,
            });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> FfiResult<&'a T> {
        self.check()?;
        if index >= self.len {
            return Err(FfiError::IndexOutOfRange { index, len: self.len });
        }
        // SAFETY: the host guarantees `ptr` is valid for `len` elements for
        // the lifetime of the view; bounds, null and alignment checked above.
        Ok(unsafe { &*self.ptr.add(index) })
    }

    /// Indexing from a signed interface position.
    pub fn get_signed(&self, index: i32) -> FfiResult<&'a T> {
        let index = usize::try_from(index).map_err(|_| FfiError::NegativeIndex(index))?;
        self.get(index)
    }
}

impl<T> Clone for RawArray<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawArray<'_, T> {}

impl<T> fmt::Debug for RawArray<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawArray")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("cap", &self.cap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(ptr: *const u32, len: usize, cap: usize) -> RawArray<'a, u32> {
        unsafe { RawArray::from_raw_parts(ptr, len, cap) }
    }

    #[test]
    fn get_within_bounds() {
        let items = [10u32, 20, 30];
        let array = RawArray::from_slice(&items);
        assert_eq!(array.len(), 3);
        assert_eq!(*array.get(0).unwrap(), 10);
        assert_eq!(*array.get(2).unwrap(), 30);
        assert_eq!(
            array.get(3).unwrap_err(),
            FfiError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(*array.get_signed(1).unwrap(), 20);
        assert_eq!(
            array.get_signed(3).unwrap_err(),
            FfiError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn negative_index_is_a_fault() {
        let items = [1u32];
        let array = RawArray::from_slice(&items);
        assert_eq!(array.get_signed(-1).unwrap_err(), FfiError::NegativeIndex(-1));
        assert_eq!(*array.get_signed(0).unwrap(), 1);
    }

    #[test]
    fn empty_views_never_touch_the_pointer() {
        let empty = RawArray::<u32>::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(
            empty.get(0).unwrap_err(),
            FfiError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn malformed_views_are_rejected() {
        let items = [1u32, 2];
        assert_eq!(
            view(items.as_ptr(), 3, 2).get(0).unwrap_err(),
            FfiError::LengthExceedsCapacity { len: 3, cap: 2 }
        );
        assert_eq!(
            view(std::ptr::null(), 1, 1).get(0).unwrap_err(),
            FfiError::NullPointer { what: "array", len: 1 }
        );

        let misaligned = (items.as_ptr() as usize + 1) as *const u32;
        assert!(matches!(
            view(misaligned, 1, 1).get(0).unwrap_err(),
            FfiError::Misaligned { align: 4, .. }
        ));
    }
}
