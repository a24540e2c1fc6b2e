#![cfg_attr(not(test), no_std)]

// Feature flags handled:
// - tracing: structured lifecycle events through `tracing`

//! # tola-dyn
//!
//! Runtime polymorphism over structural contracts.
//!
//! **Hand-built dynamic dispatch for Rust.**
//!
//! ## Architecture
//!
//! A *contract* is a named list of method signatures. Any value with those
//! methods can be wrapped into the contract's *handle*, without declaring,
//! implementing or even knowing about the contract.
//!
//! ### 1. Erasure
//! The value is moved into an owned buffer, described by a per-type
//! [`Lifecycle`] (clone, drop, layout, type token).
//!
//! ### 2. Dispatch
//! The handle carries a table of trampolines, one per method, each bound to
//! the concrete type at the wrap site:
//!
//! ```text
//! Shape!(Square { side: 4.0 })
//!     |
//!     v
//! Shape { raw: RawHandle { data, lifecycle }, table: { area: area::<Square>, .. } }
//!     |
//!     v
//! shape.area()  ->  (table.area)(raw.receiver())  ->  Square::area(&*data)
//! ```
//!
//! ### 3. Modes
//! Wrapping a reference `&x` / `&mut x` stores the reference itself
//! (*reference mode*). Reference handles compare equal when they point at the
//! same object; value handles never compare equal.
//!
//! ```text
//! +-------------------------------------------------------------------+
//! |  Layer 0: Primitives                                              |
//! |  - FNV-1a, method_id                                              |
//! +-------------------------------------------------------------------+
//!                                |
//!                                v
//! +-------------------------------------------------------------------+
//! |  Layer 1: Erasure                                                 |
//! |  - Buffer, Lifecycle, RawHandle, Ref / Mut, mode selection        |
//! +-------------------------------------------------------------------+
//!                                |
//!                                v
//! +-------------------------------------------------------------------+
//! |  Layer 2: User API                                                |
//! |  - interface!, Interface, NarrowFrom, Provides                    |
//! +-------------------------------------------------------------------+
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use tola_dyn::prelude::*;
//!
//! interface! {
//!     pub Shape {
//!         fn area(&self) -> f64;
//!         fn scale(&mut self, factor: f64);
//!     }
//!
//!     pub Area {
//!         fn area(&self) -> f64;
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Square { side: f64 }
//!
//! impl Square {
//!     fn area(&self) -> f64 { self.side * self.side }
//!     fn scale(&mut self, factor: f64) { self.side *= factor }
//! }
//!
//! let mut shape = Shape!(Square { side: 4.0 });
//! assert_eq!(shape.area(), 16.0);
//!
//! shape.scale(0.5);
//! assert_eq!(shape.target::<Square>().map(|s| s.side), Some(2.0));
//!
//! let area: Area = shape.into_narrow();
//! assert_eq!(area.area(), 4.0);
//! ```
//!
//! ## Compile-time rejections
//!
//! A value missing a contract method does not wrap:
//!
//! ```compile_fail
//! use tola_dyn::prelude::*;
//! interface! { Shape { fn area(&self) -> f64; } }
//!
//! #[derive(Clone)]
//! struct Point;
//! let _ = Shape!(Point);
//! ```
//!
//! Value mode needs `Clone`:
//!
//! ```compile_fail
//! use tola_dyn::prelude::*;
//! interface! { Shape { fn area(&self) -> f64; } }
//!
//! struct Square;
//! impl Square { fn area(&self) -> f64 { 1.0 } }
//! let _ = Shape!(Square);
//! ```
//!
//! `&mut self` methods cannot be reached through a shared reference:
//!
//! ```compile_fail
//! use tola_dyn::prelude::*;
//! interface! { Counter { fn bump(&mut self); } }
//!
//! #[derive(Clone)]
//! struct Count(u32);
//! impl Count { fn bump(&mut self) { self.0 += 1 } }
//! let count = Count(0);
//! let _ = Counter!(&count);
//! ```
//!
//! Narrowing only goes to a subset of methods:
//!
//! ```compile_fail
//! use tola_dyn::prelude::*;
//! interface! {
//!     Shape { fn area(&self) -> f64; fn scale(&mut self, factor: f64); }
//!     Area { fn area(&self) -> f64; }
//! }
//!
//! let area = Area::default();
//! let _: Shape = area.into_narrow();
//! ```
//!
//! Slot signatures must match too, not just names:
//!
//! ```compile_fail
//! use tola_dyn::prelude::*;
//! interface! {
//!     Shape { fn area(&self) -> f64; }
//!     Rough { fn area(&self) -> f32; }
//! }
//!
//! let _: Rough = Shape::default().into_narrow();
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `trace!` events when payloads are erased, cloned,
//!   narrowed, moved out and dropped.

extern crate alloc;

// Allow `::tola_dyn` to work inside the crate itself
extern crate self as tola_dyn;

// =============================================================================
// Layer 0: Primitives
// =============================================================================
pub mod primitives;

mod syntax_macros;
pub(crate) use syntax_macros::trace_event;

// =============================================================================
// Layer 1: Erasure
// =============================================================================
pub mod erase;

// =============================================================================
// Layer 2: User API
// =============================================================================
mod error;
pub mod interface;

// =============================================================================
// Re-exports at Crate Root
// =============================================================================

pub use erase::{Descriptor, Lifecycle, Mut, RawHandle, Ref};
pub use error::Error;
pub use interface::{Interface, NarrowFrom, Provides};
pub use primitives::method_id;

pub use macros::interface;

/// Support items for code generated by [`interface!`]. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::erase::select::{Select, ValueMode};
    pub use crate::erase::trampoline::{conjure, vacant};
}

/// Common items for defining and using handles.
pub mod prelude {
    pub use crate::{Interface, NarrowFrom};
    pub use macros::interface;
}
