//! Obfuscation context and decrypted buffer types.

use core::fmt;

use zeroize::Zeroize;

use crate::runtime;
use crate::seed::{keystream_byte, LANE};

/// Byte array aligned to the vector lane so the decrypt pass can use aligned
/// 128-bit loads and stores.
#[repr(C, align(16))]
pub struct Aligned<const N: usize>(pub(crate) [u8; N]);

/// Key and ciphertext for one obfuscated literal at one call site.
///
/// Both buffers are materialized entirely during const evaluation and end up
/// in the binary's read-only data; the plaintext never does. `N` is the
/// padded length: literal length plus NUL, rounded up to a multiple of 16,
/// so key and ciphertext are structurally guaranteed to match in size.
pub struct XorContext<const N: usize> {
    key: Aligned<N>,
    cipher: Aligned<N>,
    len: usize,
}

impl<const N: usize> XorContext<N> {
    /// Builds the key and ciphertext buffers for `plain` under `seed`.
    ///
    /// Plaintext bytes past the literal are zero: index `plain.len()` is the
    /// NUL terminator and the remaining filler is zero as well, XOR'd with
    /// the keystream like every other byte. Padding bytes beyond the NUL are
    /// garbage after decryption and must not be relied upon.
    ///
    /// Fails const evaluation if the literal does not fit or `N` is not a
    /// whole number of lanes.
    pub const fn new(seed: u64, plain: &[u8]) -> Self {
        assert!(N % LANE == 0, "padded length must be a multiple of the lane width");
        assert!(plain.len() < N, "literal does not fit the padded buffer");
        let mut key = [0u8; N];
        let mut cipher = [0u8; N];
        let mut i = 0;
        while i < N {
            let k = keystream_byte(seed, i);
            let p = if i < plain.len() { plain[i] } else { 0 };
            key[i] = k;
            cipher[i] = k ^ p;
            i += 1;
        }
        Self {
            key: Aligned(key),
            cipher: Aligned(cipher),
            len: plain.len(),
        }
    }

    /// Decrypts into a fresh caller-owned buffer.
    ///
    /// Runs at runtime on every call; the XOR happens behind an un-inlinable
    /// vectorized boundary so the optimizer cannot fold the plaintext back
    /// into a compile-time constant.
    pub fn decrypt(&self) -> XorBuffer<N> {
        XorBuffer {
            data: runtime::xor_blocks(&self.key, &self.cipher),
            len: self.len,
        }
    }

    /// Length of the original literal, excluding the NUL terminator.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The raw key buffer.
    pub const fn key_bytes(&self) -> &[u8; N] {
        &self.key.0
    }

    /// The raw ciphertext buffer.
    pub const fn cipher_bytes(&self) -> &[u8; N] {
        &self.cipher.0
    }
}

/// A decrypted copy of an obfuscated literal.
///
/// Stack-resident and owned by the caller; the first `len` bytes are the
/// literal, followed by a NUL terminator. The whole buffer is zeroized on
/// drop so the plaintext does not linger after the owning scope exits.
pub struct XorBuffer<const N: usize> {
    data: Aligned<N>,
    len: usize,
}

impl<const N: usize> XorBuffer<N> {
    /// Builds a buffer directly from plaintext, bypassing the obfuscation
    /// machinery. This is the disabled-mode path: a plain copy plus NUL,
    /// with no keystream and no vector work.
    pub const fn from_plain(plain: &[u8]) -> Self {
        assert!(plain.len() < N, "literal does not fit the padded buffer");
        let mut data = [0u8; N];
        let mut i = 0;
        while i < plain.len() {
            data[i] = plain[i];
            i += 1;
        }
        Self {
            data: Aligned(data),
            len: plain.len(),
        }
    }

    /// The literal bytes, without the NUL terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data.0[..self.len]
    }

    /// The literal as `&str`.
    ///
    /// Only meaningful for buffers produced from string literals; buffers
    /// from byte-string literals may hold arbitrary bytes.
    pub fn as_str(&self) -> &str {
        #[cfg(debug_assertions)]
        return core::str::from_utf8(self.as_bytes()).expect("literal was valid UTF-8");
        #[cfg(not(debug_assertions))]
        return unsafe { core::str::from_utf8_unchecked(self.as_bytes()) };
    }

    /// Pointer to the first byte; the string is NUL-terminated at `len()`.
    /// Valid for as long as the buffer itself.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.0.as_ptr()
    }

    /// The full padded array, including the NUL terminator and the filler
    /// bytes after it. Bytes past `len()` + 1 are unspecified.
    pub const fn padded(&self) -> &[u8; N] {
        &self.data.0
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Drop for XorBuffer<N> {
    fn drop(&mut self) {
        self.data.0.zeroize();
    }
}

impl<const N: usize> fmt::Debug for XorBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XorBuffer")
            .field("len", &self.len)
            .field("padded", &N)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::derive_seed;

    const SEED: u64 = derive_seed(b"hello", b"a.cpp", 10, b"Mar 18 2021 11:48:00");

    #[test]
    fn context_xor_recovers_plaintext() {
        const CTX: XorContext<16> = XorContext::new(SEED, b"hello");
        let mut recovered = [0u8; 16];
        for i in 0..16 {
            recovered[i] = CTX.key_bytes()[i] ^ CTX.cipher_bytes()[i];
        }
        assert_eq!(&recovered[..6], b"hello\0");
    }

    #[test]
    fn decrypt_yields_literal_and_terminator() {
        const CTX: XorContext<16> = XorContext::new(SEED, b"hello");
        let buf = CTX.decrypt();
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.as_str(), "hello");
        assert_eq!(buf.padded()[5], 0);
        assert_eq!(buf.len(), 5);
        assert_eq!(unsafe { *buf.as_ptr().add(4) }, b'o');
    }

    #[test]
    fn decrypt_is_idempotent() {
        const CTX: XorContext<16> = XorContext::new(SEED, b"hello");
        let a = CTX.decrypt();
        let b = CTX.decrypt();
        assert_eq!(a.padded(), b.padded());
    }

    #[test]
    fn ciphertext_is_not_plaintext() {
        const CTX: XorContext<16> = XorContext::new(SEED, b"hello");
        assert_ne!(&CTX.cipher_bytes()[..5], b"hello");
    }

    #[test]
    fn empty_literal_round_trips() {
        const CTX: XorContext<16> = XorContext::new(SEED, b"");
        let buf = CTX.decrypt();
        assert!(buf.is_empty());
        assert_eq!(buf.padded()[0], 0);
    }

    #[test]
    fn from_plain_copies_without_keystream() {
        let buf = XorBuffer::<16>::from_plain(b"hello");
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.padded()[5], 0);
    }

    #[test]
    fn buffers_are_lane_aligned() {
        const CTX: XorContext<32> = XorContext::new(SEED, b"a longer literal!");
        assert_eq!(CTX.key_bytes().as_ptr() as usize % 16, 0);
        assert_eq!(CTX.cipher_bytes().as_ptr() as usize % 16, 0);
        let buf = CTX.decrypt();
        assert_eq!(buf.as_ptr() as usize % 16, 0);
    }
}
