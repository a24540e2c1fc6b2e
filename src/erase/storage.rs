//! Raw payload storage.
//!
//! [`Buffer`] owns one heap block sized and aligned for a payload. It only
//! lives on the stack of the operation building a handle: if anything fails
//! before the payload is fully written, dropping the guard frees the block.
//! Once the handle takes over, [`Buffer::into_raw`] releases ownership.

use alloc::alloc::{alloc, dealloc, handle_alloc_error};
use core::alloc::Layout;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

pub(crate) struct Buffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Buffer {
    /// Acquire an uninitialized block for `layout`.
    ///
    /// Zero-sized layouts get a dangling, well-aligned pointer and no
    /// allocation. Allocation failure goes through [`handle_alloc_error`].
    pub(crate) fn allocate(layout: Layout) -> Self {
        if layout.size() == 0 {
            // SAFETY: alignment is never zero
            let ptr = unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) };
            return Buffer { ptr, layout };
        }

        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc(layout) };
        match NonNull::new(raw) {
            Some(ptr) => Buffer { ptr, layout },
            None => handle_alloc_error(layout),
        }
    }

    /// Re-adopt a block previously released by [`Buffer::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `Buffer::allocate(layout).into_raw()` with the
    /// same `layout`, and must not be adopted twice.
    pub(crate) unsafe fn from_raw(ptr: NonNull<u8>, layout: Layout) -> Self {
        Buffer { ptr, layout }
    }

    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Give up ownership; the caller becomes responsible for the block.
    pub(crate) fn into_raw(self) -> NonNull<u8> {
        ManuallyDrop::new(self).ptr
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated by `alloc` with this exact layout
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}
