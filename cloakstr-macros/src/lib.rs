//! Proc macros behind `cloakstr`'s `xor_str!`, `xor_buf!` and `xor_bytes!`.
//!
//! The macros emit a const block that derives the per-site seed and builds
//! the key/ciphertext buffers during const evaluation, then ends in a
//! runtime `decrypt()`. The call site's `file!()` and `line!()` are emitted
//! into the expansion so they resolve at the invocation; the build timestamp
//! is captured once per compilation here and injected as a literal.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, LitByteStr, LitStr};

/// Deobfuscate a string literal and yield a `&str` valid for the enclosing
/// statement.
#[proc_macro]
pub fn xor_str(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    let value = lit.value();
    let body = context_block(value.as_bytes().len(), quote! { #lit.as_bytes() });

    TokenStream::from(quote! {
        ::cloakstr::XorBuffer::as_str(&{
            #body
            __XS_CTX.decrypt()
        })
    })
}

/// Deobfuscate a string literal and yield the owned padded buffer.
#[proc_macro]
pub fn xor_buf(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    let value = lit.value();
    let body = context_block(value.as_bytes().len(), quote! { #lit.as_bytes() });

    TokenStream::from(quote! {{
        #body
        __XS_CTX.decrypt()
    }})
}

/// Deobfuscate a byte-string literal and yield the owned padded buffer.
#[proc_macro]
pub fn xor_bytes(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitByteStr);
    let value = lit.value();
    let body = context_block(value.len(), quote! { #lit });

    TokenStream::from(quote! {{
        #body
        __XS_CTX.decrypt()
    }})
}

/// Const items shared by every expansion: padded length, per-site seed and
/// the fully materialized obfuscation context. `plain` tokens must evaluate
/// to the literal as `&[u8]` in const context.
fn context_block(len: usize, plain: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    let padded = padded_len(len);
    let stamp = build_stamp();
    quote! {
        const __XS_PADDED: usize = #padded;
        const __XS_SEED: u64 = ::cloakstr::seed::derive_seed(
            #plain,
            ::core::file!().as_bytes(),
            ::core::line!() as u64,
            #stamp.as_bytes(),
        );
        const __XS_CTX: ::cloakstr::XorContext<__XS_PADDED> =
            ::cloakstr::XorContext::new(__XS_SEED, #plain);
    }
}

/// Literal length plus NUL, rounded up to the 16-byte vector lane.
fn padded_len(len: usize) -> usize {
    let raw = len + 1;
    if raw % 16 == 0 {
        raw
    } else {
        (raw | 15) + 1
    }
}

static STAMP: OnceLock<String> = OnceLock::new();

/// Build timestamp, captured once per macro-host process so every site in a
/// compilation shares one stamp while each rebuild gets a fresh one.
fn build_stamp() -> &'static str {
    STAMP.get_or_init(|| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch");
        format_stamp(now.as_secs())
    })
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// "Mon DD YYYY HH:MM:SS", the classic `__DATE__`/`__TIME__` shape.
fn format_stamp(secs: u64) -> String {
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let tod = secs % 86_400;
    format!(
        "{} {:>2} {} {:02}:{:02}:{:02}",
        MONTHS[(month - 1) as usize],
        day,
        year,
        tod / 3_600,
        (tod / 60) % 60,
        tod % 60,
    )
}

/// Gregorian date from days since 1970-01-01 (Hinnant's civil_from_days).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (yoe + era * 400 + (month <= 2) as i64, month, day)
}
