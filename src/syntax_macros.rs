//! Internal logging macro.
//!
//! `trace_event!` forwards to `tracing::trace!` under the `tracing` feature
//! and expands to nothing otherwise, so the arguments are never evaluated
//! in default builds.

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($($field:tt)*) => {
        ::tracing::trace!(target: "tola_dyn", $($field)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($($field:tt)*) => {};
}

pub(crate) use trace_event;
