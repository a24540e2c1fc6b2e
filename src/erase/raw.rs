//! The type-erased half of a handle.
//!
//! A [`RawHandle`] is a payload buffer plus the [`Lifecycle`] that knows what
//! lives in it. It owns the buffer exclusively. Generated handles pair one
//! with a dispatch table; everything type-independent lives here.
//!
//! ```text
//! Shape<'a>
//!   ├── raw:   RawHandle<'a> ── Option<Payload>
//!   │                              ├── data ──────> [ Square { .. } ]   value mode
//!   │                              │                [ &'a Square  ] ─> Square   reference mode
//!   │                              └── lifecycle ─> &'static Lifecycle
//!   └── table: ShapeTable { area: trampoline::<Square>, .. }
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use super::lifecycle::{Descriptor, Lifecycle};
use super::storage::Buffer;
use crate::Error;

#[derive(Clone, Copy)]
struct Payload {
    data: NonNull<u8>,
    lifecycle: &'static Lifecycle,
}

impl Payload {
    /// Address stored by a reference-mode payload.
    fn pointee(&self) -> *const () {
        // SAFETY: reference payloads hold exactly one thin pointer
        unsafe { self.data.cast::<*const ()>().read() }
    }
}

/// Owned, type-erased payload of a handle.
///
/// `data` and `lifecycle` are present together or not at all: an empty
/// handle is `payload == None`.
pub struct RawHandle<'a> {
    payload: Option<Payload>,
    _marker: PhantomData<&'a ()>,
}

impl<'a> RawHandle<'a> {
    pub const fn empty() -> Self {
        RawHandle { payload: None, _marker: PhantomData }
    }

    /// Move `value` into a fresh buffer described by `descriptor`.
    pub fn new<U: 'a>(value: U, descriptor: Descriptor<U>) -> Self {
        let lifecycle = descriptor.lifecycle();
        let buffer = Buffer::allocate(lifecycle.layout());
        // SAFETY: the buffer is sized and aligned for `U`
        unsafe { buffer.as_ptr().cast::<U>().write(value) };

        crate::trace_event!(
            type_name = lifecycle.type_name(),
            size = lifecycle.size(),
            reference = lifecycle.is_reference(),
            "payload erased"
        );

        RawHandle {
            payload: Some(Payload { data: buffer.into_raw(), lifecycle }),
            _marker: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// Whether the payload is a borrowed reference rather than an owned value.
    pub fn is_reference(&self) -> bool {
        self.payload.is_some_and(|p| p.lifecycle.is_reference())
    }

    pub fn lifecycle(&self) -> Option<&'static Lifecycle> {
        self.payload.map(|p| p.lifecycle)
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.payload.map(|p| p.lifecycle.type_name())
    }

    /// Address of the referenced object, for reference-mode handles.
    pub fn pointee(&self) -> Option<*const ()> {
        self.payload.filter(|p| p.lifecycle.is_reference()).map(|p| p.pointee())
    }

    fn data_ptr(&self) -> *mut u8 {
        self.payload.map_or(ptr::null_mut(), |p| p.data.as_ptr())
    }

    /// Shared receiver handed to `&self` trampolines.
    pub fn receiver(&self) -> Ref<'_, 'a> {
        Ref { ptr: self.data_ptr(), _marker: PhantomData }
    }

    /// Exclusive receiver handed to `&mut self` trampolines.
    pub fn receiver_mut(&mut self) -> Mut<'_, 'a> {
        Mut { ptr: self.data_ptr(), _marker: PhantomData }
    }

    /// Deep copy through the payload's clone slot.
    ///
    /// An empty handle clones to an empty handle. `interface` only labels
    /// the error.
    pub fn try_clone(&self, interface: &'static str) -> Result<Self, Error> {
        let Some(payload) = self.payload else {
            return Ok(RawHandle::empty());
        };
        let lifecycle = payload.lifecycle;

        // A panicking clone drops `buffer` and frees the block.
        let buffer = Buffer::allocate(lifecycle.layout());
        // SAFETY: `data` holds a live payload described by `lifecycle`
        let cloned = unsafe { lifecycle.clone_into(buffer.as_ptr(), payload.data.as_ptr()) };
        if cloned.is_none() {
            return Err(Error::NotCloneable { interface, type_name: lifecycle.type_name() });
        }

        crate::trace_event!(interface, type_name = lifecycle.type_name(), "payload cloned");

        Ok(RawHandle {
            payload: Some(Payload { data: buffer.into_raw(), lifecycle }),
            _marker: PhantomData,
        })
    }

    /// Borrow the payload as a `T` if it was wrapped as one.
    ///
    /// Reference-mode payloads never match: their token is shared by every
    /// reference type. Use [`RawHandle::target_ref`] for those.
    pub fn target<T: 'static>(&self) -> Option<&T> {
        let payload = self.payload.filter(|p| p.lifecycle.is::<T>())?;
        // SAFETY: the token proves the buffer holds a `T`
        Some(unsafe { &*payload.data.as_ptr().cast::<T>() })
    }

    pub fn target_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let payload = self.payload.filter(|p| p.lifecycle.is::<T>())?;
        // SAFETY: the token proves the buffer holds a `T`; `&mut self` is exclusive
        Some(unsafe { &mut *payload.data.as_ptr().cast::<T>() })
    }

    /// Borrow the object behind a reference-mode payload as a `P`.
    ///
    /// Succeeds for *every* reference-mode handle, whatever it actually
    /// points to, because all references share one type token.
    ///
    /// # Safety
    ///
    /// The handle must have been built from a `&P` or `&mut P`.
    pub unsafe fn target_ref<P>(&self) -> Option<&P> {
        let pointee = self.pointee()?;
        // SAFETY: the caller vouches for the pointee type
        Some(unsafe { &*pointee.cast::<P>() })
    }

    /// Move the payload out as a `T`, or give the handle back untouched.
    pub fn into_target<T: 'static>(mut self) -> Result<T, Self> {
        let Some(payload) = self.payload.filter(|p| p.lifecycle.is::<T>()) else {
            return Err(self);
        };
        self.payload = None;

        // SAFETY: released by `Buffer::into_raw` with this layout
        let buffer = unsafe { Buffer::from_raw(payload.data, payload.lifecycle.layout()) };
        // SAFETY: the token proves the buffer holds a `T`; the buffer is
        // freed without dropping the moved-out value
        let value = unsafe { buffer.as_ptr().cast::<T>().read() };

        crate::trace_event!(type_name = payload.lifecycle.type_name(), "payload moved out");
        Ok(value)
    }
}

impl Default for RawHandle<'_> {
    fn default() -> Self {
        RawHandle::empty()
    }
}

impl Drop for RawHandle<'_> {
    fn drop(&mut self) {
        if let Some(Payload { data, lifecycle }) = self.payload.take() {
            crate::trace_event!(type_name = lifecycle.type_name(), "payload dropped");
            // Freed after the payload, even if its destructor unwinds.
            // SAFETY: released by `Buffer::into_raw` with this layout
            let buffer = unsafe { Buffer::from_raw(data, lifecycle.layout()) };
            // SAFETY: `data` holds a live payload described by `lifecycle`
            unsafe { lifecycle.drop_in_place(buffer.as_ptr()) };
        }
    }
}

/// Identity equality.
///
/// Two raw handles are equal when both are empty, or when both are in
/// reference mode and point at the same object. Value-mode payloads are
/// never equal, not even to themselves.
impl PartialEq for RawHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.payload, other.payload) {
            (None, None) => true,
            (Some(a), Some(b)) if a.lifecycle.is_reference() && b.lifecycle.is_reference() => {
                a.pointee() == b.pointee()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for RawHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            None => f.write_str("empty"),
            Some(payload) if payload.lifecycle.is_reference() => f
                .debug_struct("Reference")
                .field("kind", &payload.lifecycle.type_name())
                .field("pointee", &payload.pointee())
                .finish(),
            Some(payload) => f
                .debug_struct("Value")
                .field("type_name", &payload.lifecycle.type_name())
                .field("size", &payload.lifecycle.size())
                .finish(),
        }
    }
}

// =============================================================================
// Trampoline Receivers
// =============================================================================

/// Shared receiver of a trampoline: the payload pointer, borrowed for `'s`
/// from a handle living for `'a`.
#[derive(Clone, Copy)]
pub struct Ref<'s, 'a: 's> {
    ptr: *mut u8,
    _marker: PhantomData<(&'s (), fn(&'a ()))>,
}

impl<'s, 'a: 's> Ref<'s, 'a> {
    /// # Safety
    ///
    /// The receiver must come from a non-empty handle whose payload is a `U`.
    pub unsafe fn cast<U: 'a>(self) -> &'s U {
        unsafe { &*self.ptr.cast::<U>() }
    }
}

/// Exclusive receiver of a trampoline.
pub struct Mut<'s, 'a: 's> {
    ptr: *mut u8,
    _marker: PhantomData<(&'s mut (), fn(&'a ()))>,
}

impl<'s, 'a: 's> Mut<'s, 'a> {
    /// # Safety
    ///
    /// The receiver must come from a non-empty handle whose payload is a `U`.
    pub unsafe fn cast<U: 'a>(self) -> &'s mut U {
        unsafe { &mut *self.ptr.cast::<U>() }
    }
}
