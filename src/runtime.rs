//! Runtime decrypt pass.
//!
//! The key and ciphertext are compile-time constants, so a plain XOR loop
//! would be folded back to the plaintext during optimization and embedded in
//! the binary anyway. The pass therefore runs behind an `#[inline(never)]`
//! boundary with `black_box`-laundered inputs, and uses 128-bit vector
//! instructions where available. Targets without a vector path fall back to
//! a scalar loop over volatile loads, which the optimizer also cannot fold.

use core::hint::black_box;

use crate::buffer::Aligned;

/// XORs the two aligned buffers into a fresh one. `N` is a multiple of the
/// lane width and both inputs are lane-aligned, enforced by `XorContext`.
#[inline(never)]
pub(crate) fn xor_blocks<const N: usize>(key: &Aligned<N>, cipher: &Aligned<N>) -> Aligned<N> {
    let key = black_box(key);
    let cipher = black_box(cipher);
    let mut out = Aligned([0u8; N]);
    xor_lanes(key, cipher, &mut out);
    out
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
fn xor_lanes<const N: usize>(key: &Aligned<N>, cipher: &Aligned<N>, out: &mut Aligned<N>) {
    use core::arch::x86_64::{__m128i, _mm_load_si128, _mm_store_si128, _mm_xor_si128};

    use crate::seed::LANE;
    // SAFETY: all three buffers are 16-byte aligned by repr(align(16)) and N
    // is a whole number of lanes, so every load and store is in bounds and
    // aligned.
    unsafe {
        let mut i = 0;
        while i < N {
            let k = _mm_load_si128(key.0.as_ptr().add(i) as *const __m128i);
            let c = _mm_load_si128(cipher.0.as_ptr().add(i) as *const __m128i);
            _mm_store_si128(out.0.as_mut_ptr().add(i) as *mut __m128i, _mm_xor_si128(k, c));
            i += LANE;
        }
    }
}

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
fn xor_lanes<const N: usize>(key: &Aligned<N>, cipher: &Aligned<N>, out: &mut Aligned<N>) {
    use core::arch::aarch64::{veorq_u8, vld1q_u8, vst1q_u8};

    use crate::seed::LANE;
    // SAFETY: buffers are 16-byte aligned and N is a whole number of lanes.
    unsafe {
        let mut i = 0;
        while i < N {
            let k = vld1q_u8(key.0.as_ptr().add(i));
            let c = vld1q_u8(cipher.0.as_ptr().add(i));
            vst1q_u8(out.0.as_mut_ptr().add(i), veorq_u8(k, c));
            i += LANE;
        }
    }
}

#[cfg(not(any(
    all(target_arch = "x86_64", target_feature = "sse2"),
    all(target_arch = "aarch64", target_feature = "neon")
)))]
fn xor_lanes<const N: usize>(key: &Aligned<N>, cipher: &Aligned<N>, out: &mut Aligned<N>) {
    for i in 0..N {
        // SAFETY: i < N, in bounds of key.0. The volatile load keeps the
        // constant key bytes opaque to the optimizer.
        let k = unsafe { core::ptr::read_volatile(key.0.as_ptr().add(i)) };
        out.0[i] = k ^ cipher.0[i];
    }
}
