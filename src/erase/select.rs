//! Wrap-site mode selection.
//!
//! Same trick as method-priority trait detection: inherent methods on
//! [`Select`] win over trait methods of the same name, so
//!
//! ```ignore
//! use tola_dyn::__private::ValueMode as _;
//! Select::of(&value).descriptor()
//! ```
//!
//! picks the reference descriptors when `value` is `&P` / `&mut P`, and
//! falls back to [`ValueMode`] otherwise. The fallback carries the
//! `Clone + 'static` requirement of value mode, so a non-cloneable value
//! fails to compile right at the wrap site.
//!
//! This only works for concrete types known at the call site, which is
//! always the case inside the generated constructor macros.

use core::marker::PhantomData;

use super::lifecycle::Descriptor;

#[doc(hidden)]
pub struct Select<U>(PhantomData<fn() -> U>);

impl<U> Select<U> {
    pub fn of(_: &U) -> Self {
        Select(PhantomData)
    }
}

impl<'a, P> Select<&'a P> {
    pub fn descriptor(&self) -> Descriptor<&'a P> {
        Descriptor::shared()
    }
}

impl<'a, P> Select<&'a mut P> {
    pub fn descriptor(&self) -> Descriptor<&'a mut P> {
        Descriptor::exclusive()
    }
}

/// Fallback: everything that is not a reference is stored by value.
#[doc(hidden)]
pub trait ValueMode<U> {
    fn descriptor(&self) -> Descriptor<U>;
}

impl<U: Clone + 'static> ValueMode<U> for Select<U> {
    fn descriptor(&self) -> Descriptor<U> {
        Descriptor::value()
    }
}
