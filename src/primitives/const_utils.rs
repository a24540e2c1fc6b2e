//! Const evaluation utilities

/// FNV-1a 64-bit Hash for strings (const fn)
pub const fn fnv1a_64_str(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Compile-time key of a contract method.
///
/// Dispatch tables are matched by method *name* when one contract is
/// narrowed into another. The name is routed through this hash so it can be
/// used as a const generic argument:
///
/// ```ignore
/// S::Table: Provides<{ tola_dyn::method_id("area") }, Slot = ...>
/// ```
pub const fn method_id(name: &str) -> u64 {
    fnv1a_64_str(name)
}
