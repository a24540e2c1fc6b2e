// Common utilities for contract macros
//
// This module contains:
// - contract_model: Contract parsing and validation
// - lifetimes: Elided lifetime binding for slot types

pub mod contract_model;
mod lifetimes;

pub use contract_model::*;
pub use lifetimes::*;
