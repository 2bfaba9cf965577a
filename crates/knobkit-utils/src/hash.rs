//! Hash functions for stable parameter ids.
//!
//! Parameter names are unique within one effect instance. Hashing them gives
//! a compact `u32` id that stays the same across sessions, so a host can key
//! saved keyframes and GUI state by id instead of by string.

/// Compute FNV-1a 32-bit hash of a string.
///
/// Deterministic across platforms and compiler versions, allocation free and
/// usable in `const` context.
///
/// 1. Start with FNV offset basis: `2166136261`
/// 2. For each byte: XOR with hash, then multiply by FNV prime `16777619`
///
/// # Examples
///
/// ```
/// use knobkit_utils::fnv1a_32;
///
/// let id = fnv1a_32("blur_size");
///
/// const OPACITY_ID: u32 = fnv1a_32("opacity");
/// assert_ne!(id, OPACITY_ID);
/// ```
///
/// Collisions are possible (2^32 values). The store checks every id of an
/// effect instance at instantiation and refuses colliding names.
#[inline]
pub const fn fnv1a_32(s: &str) -> u32 {
    const FNV_OFFSET: u32 = 2166136261;
    const FNV_PRIME: u32 = 16777619;

    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Parameter id for a name, or `None` for the empty name.
///
/// The empty name hashes to the offset basis, which would make every
/// unnamed descriptor share one id.
#[inline]
pub const fn name_id(name: &str) -> Option<u32> {
    if name.is_empty() {
        None
    } else {
        Some(fnv1a_32(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_empty() {
        // FNV-1a of empty string is the offset basis
        assert_eq!(fnv1a_32(""), 2166136261);
    }

    #[test]
    fn test_fnv1a_single_char() {
        // Known test vector for "a"
        assert_eq!(fnv1a_32("a"), 0xe40c292c);
    }

    #[test]
    fn test_fnv1a_const() {
        const HASH: u32 = fnv1a_32("translate");
        assert_eq!(HASH, fnv1a_32("translate"));
    }

    #[test]
    fn test_fnv1a_different_names() {
        assert_ne!(fnv1a_32("center"), fnv1a_32("radius"));
    }

    #[test]
    fn test_name_id_rejects_empty() {
        assert_eq!(name_id(""), None);
        assert_eq!(name_id("gamma"), Some(fnv1a_32("gamma")));
    }
}
