//! Compile-time XOR obfuscation of string literals.
//!
//! Every literal routed through [`xor_str!`], [`xor_buf!`] or [`xor_bytes!`]
//! is stored in the binary as a (key, ciphertext) pair instead of plaintext.
//! The key is derived from the literal's content, its `file!()`/`line!()`
//! call site and a per-compilation build timestamp, so the same literal
//! written twice obfuscates differently, and every rebuild changes every
//! ciphertext. Decryption happens in memory on each use, through a
//! vectorized pass that the optimizer cannot fold back into a constant.
//!
//! This is string obfuscation, not encryption: the keystream is a plain LCG
//! and the decryption routine ships in the binary. It raises the bar against
//! `strings`-style triage, nothing more. Do not hide secrets with it.
//!
//! ```
//! assert_eq!(cloakstr::xor_str!("Hello world!"), "Hello world!");
//! ```
//!
//! [`xor_str!`] returns a `&str` borrowing a temporary buffer, so it must be
//! consumed in the statement that produced it. To keep the plaintext around,
//! or to hand a NUL-terminated pointer to a C API, take the owned buffer:
//!
//! ```
//! let buf = cloakstr::xor_buf!("Hello world!");
//! assert_eq!(buf.as_bytes(), b"Hello world!");
//! assert_eq!(buf.padded()[buf.len()], 0);
//! let _c_string: *const u8 = buf.as_ptr();
//! ```
//!
//! The decrypted buffer is zeroized when dropped. Disabling the default
//! `obfuscate` feature turns every macro into the identity on its literal
//! and drops the proc-macro dependency entirely.

pub mod seed;

mod buffer;
mod lit;
mod runtime;

pub use buffer::{XorBuffer, XorContext};

#[cfg(feature = "obfuscate")]
#[doc(hidden)]
pub use cloakstr_macros;
