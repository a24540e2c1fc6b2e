//! # Layer 0: Primitives
//!
//! Const-evaluable helpers shared by the runtime and the generated code:
//! - `const_utils.rs`: FNV-1a hashing and [`method_id`].

pub mod const_utils;

pub use const_utils::{fnv1a_64_str, method_id};
