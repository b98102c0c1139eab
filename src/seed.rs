//! Seed derivation and keystream generation.
//!
//! Everything here is a `const fn` so the proc-macro expansion can run the
//! whole derivation during const evaluation at the call site. Two call sites
//! that differ in literal content, file path, line number or build timestamp
//! derive different seeds, so rebuilding a project or moving a call to
//! another line changes every key in the binary.

/// FNV-1 64-bit offset basis.
pub const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1 64-bit prime.
pub const FNV_PRIME: u64 = 0x100000001b3;

/// LCG constants from MMIX by Donald Knuth; full period over 64-bit state.
pub const LCG_MULTIPLIER: u64 = 6364136223846793005;
pub const LCG_INCREMENT: u64 = 1442695040888963407;

/// Width of the vector lane the buffers are padded and aligned to.
pub const LANE: usize = 16;

/// 64-bit FNV-1 hash of a byte slice.
pub const fn fnv1(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(FNV_PRIME) ^ bytes[i] as u64;
        i += 1;
    }
    hash
}

/// SplitMix64 avalanche mixer.
pub const fn splitmix64(x: u64) -> u64 {
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// One linear-congruential iteration of the keystream state.
pub const fn lcg_step(state: u64) -> u64 {
    state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT)
}

/// Keystream byte at an arbitrary index.
///
/// Advances the state `index / 8` steps from the seed, then extracts byte
/// `index % 8`, least-significant byte first. Random access by index needs
/// no external iteration state.
pub const fn keystream_byte(seed: u64, index: usize) -> u8 {
    let mut state = seed;
    let mut i = 0;
    while i < index / 8 {
        state = lcg_step(state);
        i += 1;
    }
    (state >> ((index % 8) * 8)) as u8
}

/// Per-site seed: any change to the literal, its file, its line or the build
/// timestamp changes the result (barring hash collision).
pub const fn derive_seed(lit: &[u8], file: &[u8], line: u64, stamp: &[u8]) -> u64 {
    fnv1(lit) ^ fnv1(file) ^ fnv1(stamp) ^ splitmix64(line)
}

/// Buffer length for a literal of `len` bytes: `len + 1` for the trailing
/// NUL, rounded up to a multiple of the vector lane.
pub const fn padded_len(len: usize) -> usize {
    let raw = len + 1;
    if raw % LANE == 0 {
        raw
    } else {
        (raw | (LANE - 1)) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1_empty_is_offset_basis() {
        assert_eq!(fnv1(b""), FNV_OFFSET);
    }

    #[test]
    fn fnv1_distinguishes_content_and_length() {
        assert_ne!(fnv1(b"a"), fnv1(b"b"));
        assert_ne!(fnv1(b"a"), fnv1(b"a\0"));
        assert_eq!(fnv1(b"hello"), fnv1(b"hello"));
    }

    #[test]
    fn splitmix_fixed_point_at_zero() {
        assert_eq!(splitmix64(0), 0);
        assert_ne!(splitmix64(1), splitmix64(2));
        assert_ne!(splitmix64(10), 10);
    }

    #[test]
    fn keystream_first_word_is_the_seed() {
        let seed = 0x0123456789abcdefu64;
        for i in 0..8 {
            assert_eq!(keystream_byte(seed, i), (seed >> (i * 8)) as u8);
        }
        assert_eq!(keystream_byte(seed, 8), lcg_step(seed) as u8);
    }

    #[test]
    fn keystream_random_access_matches_sequential() {
        let seed = derive_seed(b"hello", b"a.cpp", 10, b"Jan  1 2026 00:00:00");
        let mut state = seed;
        let mut sequential = Vec::new();
        for word in 0..20 {
            if word > 0 {
                state = lcg_step(state);
            }
            for b in 0..8 {
                sequential.push((state >> (b * 8)) as u8);
            }
        }
        for (i, &expect) in sequential.iter().enumerate() {
            assert_eq!(keystream_byte(seed, i), expect, "index {i}");
        }
    }

    #[test]
    fn seed_changes_with_every_input() {
        let base = derive_seed(b"hello", b"a.cpp", 10, b"stamp");
        assert_ne!(base, derive_seed(b"hellp", b"a.cpp", 10, b"stamp"));
        assert_ne!(base, derive_seed(b"hello", b"b.cpp", 10, b"stamp"));
        assert_ne!(base, derive_seed(b"hello", b"a.cpp", 11, b"stamp"));
        assert_ne!(base, derive_seed(b"hello", b"a.cpp", 10, b"stomp"));
        assert_eq!(base, derive_seed(b"hello", b"a.cpp", 10, b"stamp"));
    }

    #[test]
    fn padded_len_rounds_up_to_lane() {
        assert_eq!(padded_len(0), 16);
        assert_eq!(padded_len(5), 16);
        assert_eq!(padded_len(15), 16);
        assert_eq!(padded_len(16), 32);
        assert_eq!(padded_len(31), 32);
        assert_eq!(padded_len(32), 48);
    }
}
