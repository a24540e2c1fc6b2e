//! Per-type lifecycle descriptors.
//!
//! A [`Lifecycle`] is everything a handle needs to manage a payload whose
//! type it no longer knows: how to clone it into a fresh buffer, how to drop
//! it in place, how big the buffer is, and which type it was.
//!
//! ```text
//! Square      -> ValueLifecycle::<Square>::LIFECYCLE   (token: TypeId::of::<Square>)
//! Circle      -> ValueLifecycle::<Circle>::LIFECYCLE   (token: TypeId::of::<Circle>)
//! &'a Square  -> SHARED_REFERENCE                      (token: Reference)
//! &'a mut Foo -> EXCLUSIVE_REFERENCE                   (token: Reference)
//! ```
//!
//! Every reference, whatever its pointee, collapses onto the single
//! `Reference` token. Equality relies on it to recognize reference mode.

use core::alloc::Layout;
use core::any::{type_name, TypeId};
use core::fmt;
use core::marker::PhantomData;

/// Type-erased clone / drop / layout record for one payload type.
pub struct Lifecycle {
    clone: Option<unsafe fn(*mut u8, *const u8)>,
    drop: unsafe fn(*mut u8),
    layout: Layout,
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
}

/// Token shared by all reference-mode payloads.
enum Reference {}

impl Lifecycle {
    /// Descriptor of a value-mode payload of type `U`.
    pub fn of_value<U: Clone + 'static>() -> &'static Lifecycle {
        ValueLifecycle::<U>::LIFECYCLE
    }

    /// Canonical descriptor for every shared reference `&P`.
    pub fn shared_reference() -> &'static Lifecycle {
        &SHARED_REFERENCE
    }

    /// Canonical descriptor for every exclusive reference `&mut P`.
    pub fn exclusive_reference() -> &'static Lifecycle {
        &EXCLUSIVE_REFERENCE
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn is_cloneable(&self) -> bool {
        self.clone.is_some()
    }

    /// Runtime type token of the payload.
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Whether this descriptor carries the shared reference token.
    pub fn is_reference(&self) -> bool {
        self.type_id() == TypeId::of::<Reference>()
    }

    /// Whether a payload described by `self` can be viewed as a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// Clone the payload at `src` into the uninitialized buffer `dst`.
    ///
    /// Returns `None` (and leaves `dst` untouched) when the payload has no
    /// clone slot.
    ///
    /// # Safety
    ///
    /// `src` must point to a live payload of the type this descriptor was
    /// built for, and `dst` must be valid for writes of [`Lifecycle::layout`].
    pub(crate) unsafe fn clone_into(&self, dst: *mut u8, src: *const u8) -> Option<()> {
        let clone = self.clone?;
        unsafe { clone(dst, src) };
        Some(())
    }

    /// Drop the payload at `ptr` in place. The buffer itself is not freed.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live payload of the type this descriptor was
    /// built for. The payload must not be used afterwards.
    pub(crate) unsafe fn drop_in_place(&self, ptr: *mut u8) {
        unsafe { (self.drop)(ptr) }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("type_name", &self.type_name())
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .field("cloneable", &self.is_cloneable())
            .finish()
    }
}

// =============================================================================
// Value Mode
// =============================================================================

struct ValueLifecycle<U>(PhantomData<U>);

impl<U: Clone + 'static> ValueLifecycle<U> {
    const LIFECYCLE: &'static Lifecycle = &Lifecycle {
        clone: Some(clone_value::<U>),
        drop: drop_value::<U>,
        layout: Layout::new::<U>(),
        type_id: TypeId::of::<U>,
        type_name: type_name::<U>,
    };
}

unsafe fn clone_value<U: Clone>(dst: *mut u8, src: *const u8) {
    unsafe {
        let value = (*src.cast::<U>()).clone();
        dst.cast::<U>().write(value);
    }
}

unsafe fn drop_value<U>(ptr: *mut u8) {
    unsafe { ptr.cast::<U>().drop_in_place() }
}

// =============================================================================
// Reference Mode
// =============================================================================
//
// The buffer holds the reference itself. References to sized types are thin,
// so one pointer-sized layout covers every pointee.

static SHARED_REFERENCE: Lifecycle = Lifecycle {
    clone: Some(copy_reference),
    drop: forget_reference,
    layout: Layout::new::<*const ()>(),
    type_id: TypeId::of::<Reference>,
    type_name: shared_name,
};

static EXCLUSIVE_REFERENCE: Lifecycle = Lifecycle {
    clone: None,
    drop: forget_reference,
    layout: Layout::new::<*mut ()>(),
    type_id: TypeId::of::<Reference>,
    type_name: exclusive_name,
};

unsafe fn copy_reference(dst: *mut u8, src: *const u8) {
    unsafe { dst.cast::<*const ()>().write(src.cast::<*const ()>().read()) }
}

// References never own their pointee.
unsafe fn forget_reference(_: *mut u8) {}

fn shared_name() -> &'static str {
    "&_"
}

fn exclusive_name() -> &'static str {
    "&mut _"
}

// =============================================================================
// Typed Witness
// =============================================================================

/// A [`Lifecycle`] statically tied to the payload type `U`.
///
/// Only this crate can build one, so a `Descriptor<U>` handed to
/// [`RawHandle::new`](crate::RawHandle::new) always describes `U`.
///
/// Invariant in `U`: subtyping must not move a descriptor onto a type with
/// a different [`TypeId`].
///
/// ```
/// # use tola_dyn::Descriptor;
/// fn keep(d: Descriptor<for<'x> fn(&'x u8)>) -> Descriptor<for<'x> fn(&'x u8)> { d }
/// ```
///
/// ```compile_fail
/// # use tola_dyn::Descriptor;
/// fn narrow(d: Descriptor<for<'x> fn(&'x u8)>) -> Descriptor<fn(&'static u8)> { d }
/// ```
pub struct Descriptor<U> {
    lifecycle: &'static Lifecycle,
    _marker: PhantomData<fn(U) -> U>,
}

impl<U> Descriptor<U> {
    pub fn lifecycle(&self) -> &'static Lifecycle {
        self.lifecycle
    }
}

impl<U: Clone + 'static> Descriptor<U> {
    pub(crate) fn value() -> Self {
        Descriptor { lifecycle: Lifecycle::of_value::<U>(), _marker: PhantomData }
    }
}

impl<'a, P> Descriptor<&'a P> {
    pub(crate) fn shared() -> Self {
        Descriptor { lifecycle: Lifecycle::shared_reference(), _marker: PhantomData }
    }
}

impl<'a, P> Descriptor<&'a mut P> {
    pub(crate) fn exclusive() -> Self {
        Descriptor { lifecycle: Lifecycle::exclusive_reference(), _marker: PhantomData }
    }
}

impl<U> Clone for Descriptor<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Descriptor<U> {}
