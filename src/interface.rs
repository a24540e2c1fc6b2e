//! Traits implemented by every generated handle.
//!
//! [`Interface`] is the type-independent surface of a handle: emptiness,
//! downcasting, cloning and narrowing. The contract methods themselves are
//! inherent methods on the generated type.
//!
//! Narrowing is keyed by method *name*. Each generated dispatch table
//! implements [`Provides`] once per method, indexed by [`method_id`]:
//!
//! ```text
//! ShapeTable:  Provides<{ method_id("area") }>   Slot = for<'s> unsafe fn(Ref<'s, 'a>) -> f64
//!              Provides<{ method_id("scale") }>  Slot = for<'s> unsafe fn(Mut<'s, 'a>, f64)
//!
//! Area: NarrowFrom<S>  where  S::Table: Provides<{ method_id("area") }, Slot = ..>
//! ```
//!
//! so `Shape -> Area` compiles and `Area -> Shape` does not.
//!
//! [`method_id`]: crate::method_id

use crate::{Error, RawHandle};

/// A generated, type-erased handle for one contract.
pub trait Interface<'a>: Sized + Default {
    /// Contract name, for diagnostics.
    const NAME: &'static str;

    /// The contract's dispatch table.
    type Table: Copy;

    fn raw(&self) -> &RawHandle<'a>;

    /// # Safety
    ///
    /// The payload must not be replaced: the table was built for it.
    unsafe fn raw_mut(&mut self) -> &mut RawHandle<'a>;

    fn table(&self) -> &Self::Table;

    fn into_parts(self) -> (RawHandle<'a>, Self::Table);

    /// # Safety
    ///
    /// `table` must have been built for the payload type of `raw` (or be the
    /// vacant table, if `raw` is empty).
    unsafe fn from_parts(raw: RawHandle<'a>, table: Self::Table) -> Self;

    fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    /// Whether the handle borrows its target instead of owning it.
    fn is_reference(&self) -> bool {
        self.raw().is_reference()
    }

    fn type_name(&self) -> Option<&'static str> {
        self.raw().type_name()
    }

    /// Move the payload out, leaving `self` empty.
    fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Borrow the payload if it was wrapped as a `T`.
    ///
    /// Never matches a reference-mode handle; see [`Interface::target_ref`].
    fn target<'s, T: 'static>(&'s self) -> Option<&'s T>
    where
        'a: 's,
    {
        self.raw().target::<T>()
    }

    fn target_mut<'s, T: 'static>(&'s mut self) -> Option<&'s mut T>
    where
        'a: 's,
    {
        // SAFETY: only the payload is borrowed, never replaced
        unsafe { self.raw_mut() }.target_mut::<T>()
    }

    /// Borrow the object behind a reference-mode handle.
    ///
    /// # Safety
    ///
    /// All reference-mode handles share one type token, so nothing checks
    /// that the handle really points to a `P`. The caller must know it does.
    unsafe fn target_ref<'s, P>(&'s self) -> Option<&'s P>
    where
        'a: 's,
    {
        unsafe { self.raw().target_ref::<P>() }
    }

    /// Move the payload out as a `T`, or hand the handle back.
    fn into_target<T: 'static>(self) -> Result<T, Self> {
        let (raw, table) = self.into_parts();
        // SAFETY: the pair was taken apart just above
        raw.into_target::<T>().map_err(|raw| unsafe { Self::from_parts(raw, table) })
    }

    fn try_clone(&self) -> Result<Self, Error> {
        let raw = self.raw().try_clone(Self::NAME)?;
        // SAFETY: the clone has the same payload type
        Ok(unsafe { Self::from_parts(raw, *self.table()) })
    }

    /// Convert into a handle of a contract whose methods are a subset of
    /// this one's. The payload is moved, not copied.
    fn into_narrow<N: NarrowFrom<'a, Self>>(self) -> N {
        if self.is_empty() {
            return N::default();
        }
        let table = N::narrow_table(self.table());
        let (raw, _) = self.into_parts();

        crate::trace_event!(from = Self::NAME, to = N::NAME, type_name = raw.type_name(), "handle narrowed");

        // SAFETY: every slot of `table` was taken from the source table
        unsafe { N::from_parts(raw, table) }
    }

    /// Narrow a clone of the payload.
    fn try_to_narrow<N: NarrowFrom<'a, Self>>(&self) -> Result<N, Error> {
        Ok(self.try_clone()?.into_narrow())
    }

    /// Narrow a clone of the payload.
    ///
    /// # Panics
    ///
    /// If the payload cannot be cloned.
    fn to_narrow<N: NarrowFrom<'a, Self>>(&self) -> N {
        match self.try_to_narrow() {
            Ok(narrow) => narrow,
            Err(err) => panic!("{}", err),
        }
    }
}

/// `Self`'s contract is a subset of `S`'s, by method name and signature.
///
/// Implemented by the generated code for every compatible `S`.
pub trait NarrowFrom<'a, S: Interface<'a>>: Interface<'a> {
    fn narrow_table(source: &S::Table) -> Self::Table;
}

/// A dispatch table with a slot for the method whose [`method_id`] is
/// `METHOD`.
///
/// [`method_id`]: crate::method_id
pub trait Provides<const METHOD: u64> {
    type Slot: Copy;

    fn slot(&self) -> Self::Slot;
}
