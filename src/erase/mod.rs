//! Type erasure: payload storage, lifecycle descriptors and the raw handle.
//!
//! ```text
//! Layer 0: storage     Buffer (RAII guard over one payload block)
//! Layer 1: lifecycle   Lifecycle, Descriptor<U>
//! Layer 2: raw         RawHandle<'a>, Ref / Mut receivers
//! Layer 3: select      value vs reference mode at the wrap site
//! ```

pub(crate) mod storage;

pub mod lifecycle;
pub mod raw;
pub mod select;
pub mod trampoline;

pub use lifecycle::{Descriptor, Lifecycle};
pub use raw::{Mut, RawHandle, Ref};
