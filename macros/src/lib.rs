//! Procedural macros for the tola-dyn interface system
//!
//! | Macro | Target | Purpose |
//! |-------|--------|---------|
//! | `interface!{}` | - | Define contracts, their handles and constructor macros |
//!
//! ## Example
//!
//! ```ignore
//! interface! {
//!     pub Shape {
//!         fn area(&self) -> f64;
//!         fn scale(&mut self, factor: f64);
//!     }
//! }
//!
//! let shape = Shape!(Square { side: 4.0 });
//! assert_eq!(shape.area(), 16.0);
//! ```

use proc_macro::TokenStream;
use syn::parse_macro_input;

// =============================================================================
// Module Declarations (Two-tier: common / user)
// =============================================================================

mod common;
mod user;

// =============================================================================
// User-facing Macros (user/)
// =============================================================================

/// Define one or more contracts.
///
/// Each contract `[attrs] vis Name { fn m(&self | &mut self, args..) -> R; .. }`
/// expands to:
///
/// - a handle type `Name<'a>` with one inherent method per contract method,
/// - a constructor macro `Name!(value)` that wraps any value providing
///   those methods (`&x` / `&mut x` wrap by reference),
/// - `Default` (empty), `Clone`, identity `PartialEq`, `Debug`,
///   `tola_dyn::Interface` and `tola_dyn::NarrowFrom` for every contract
///   whose methods are a superset.
///
/// The constructor macro is textually scoped like any `macro_rules!` macro:
/// it is usable after the `interface!` invocation in the same module and its
/// children, or anywhere below a `#[macro_use]` module declaration.
///
/// # Handles in signatures
///
/// `Self` is the contract's own handle, and a bare contract name from the
/// same invocation (`fn leaf(&self) -> Leaf;`) gets the handle's lifetime:
/// both mean `Name<'a>`. Other types with a lifetime parameter must spell it
/// in outputs, as in `Cow<'_, str>`; the well-known library ones are
/// rejected when they hide it.
///
/// # Rejected declarations
///
/// Generic, `async`, `const` or `unsafe` methods, default bodies, `self` by
/// value, non-identifier argument patterns, duplicate names, and `impl Trait`,
/// `Self::..` paths or named lifetimes (other than `'static`) in signatures.
#[proc_macro]
pub fn interface(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::InterfaceInput);
    user::expand_interface(input).into()
}
