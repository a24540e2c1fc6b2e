//! Checked failures of the handle lifecycle.
//!
//! Contract mismatches never reach this type: they are compile errors.
//! What remains are the two runtime preconditions of a handle, both reported
//! instead of being left undefined.

use core::fmt;

/// Runtime failure of a handle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A contract method was called on an empty handle.
    Empty {
        interface: &'static str,
        method: &'static str,
    },
    /// The payload has no clone slot (e.g. an exclusive `&mut` reference).
    NotCloneable {
        interface: &'static str,
        type_name: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Empty { interface, method } => {
                write!(f, "called `{}::{}` on an empty handle", interface, method)
            }
            Error::NotCloneable { interface, type_name } => {
                write!(
                    f,
                    "cannot clone `{}` handle: payload `{}` is not cloneable",
                    interface, type_name
                )
            }
        }
    }
}

impl core::error::Error for Error {}
