//! Call-site entry points.
//!
//! With the `obfuscate` feature (the default) these delegate to the proc
//! macros; without it they expand to the plain literal with zero overhead.

#[cfg(feature = "obfuscate")]
#[macro_export]
macro_rules! xor_str {
    ($s:literal) => {
        $crate::cloakstr_macros::xor_str!($s)
    };
}

#[cfg(feature = "obfuscate")]
#[macro_export]
macro_rules! xor_buf {
    ($s:literal) => {
        $crate::cloakstr_macros::xor_buf!($s)
    };
}

#[cfg(feature = "obfuscate")]
#[macro_export]
macro_rules! xor_bytes {
    ($b:literal) => {
        $crate::cloakstr_macros::xor_bytes!($b)
    };
}

#[cfg(not(feature = "obfuscate"))]
#[macro_export]
macro_rules! xor_str {
    ($s:literal) => {
        $s
    };
}

#[cfg(not(feature = "obfuscate"))]
#[macro_export]
macro_rules! xor_buf {
    ($s:literal) => {{
        const __XS_PADDED: usize = $crate::seed::padded_len($s.len());
        $crate::XorBuffer::<__XS_PADDED>::from_plain($s.as_bytes())
    }};
}

#[cfg(not(feature = "obfuscate"))]
#[macro_export]
macro_rules! xor_bytes {
    ($b:literal) => {{
        const __XS_PADDED: usize = $crate::seed::padded_len($b.len());
        $crate::XorBuffer::<__XS_PADDED>::from_plain($b)
    }};
}
