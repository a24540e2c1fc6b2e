//! User-facing macro implementations
//!
//! | Macro | Usage | Purpose |
//! |-------|-------|---------|
//! | `interface!` | function macro | Define contracts and their handles |

mod interface;

pub use interface::{expand_interface, InterfaceInput};
