//! Runtime support for generated trampolines.

use crate::Error;

/// Materialize a value of a zero-sized closure type.
///
/// Generated trampolines are parameterized by the type of a non-capturing
/// wrap-site closure `|this, ..| this.method(..)`. Such a closure has no
/// state, so any instance of its type is *the* instance.
///
/// # Safety
///
/// `F` must be the type of a closure without captures. Other zero-sized
/// types may carry invariants this bypasses.
#[inline(always)]
pub unsafe fn conjure<F: Copy>() -> F {
    const { assert!(size_of::<F>() == 0, "trampoline closures must not capture") };
    // SAFETY: `F` has no bytes to initialize
    unsafe { core::mem::zeroed() }
}

/// Body of every slot in a vacant dispatch table.
#[cold]
#[inline(never)]
pub fn vacant(interface: &'static str, method: &'static str) -> ! {
    panic!("{}", Error::Empty { interface, method })
}
