use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{parse_macro_input, LitInt};

/// Largest fractional bit count the table generator accepts.
///
/// The table holds `2^FRAC_BITS + 1` entries, so anything above 16 would
/// emit hundreds of thousands of literals and overflow the `u32` entry type
/// well past index 1.
const MAX_FRAC_BITS: u32 = 16;

/// Emit the reciprocal lookup table for a fixed-point format with the given
/// number of fractional bits, as an array literal of `u32`.
///
/// Entry `v` holds `floor(2^(2 * FRAC_BITS) / v)`, i.e. the fixed-point
/// encoding of `1 / (v / SCALE)`, clamped to `u32::MAX`. Entry 0 has no
/// reciprocal and is set to `u32::MAX` so the table stays non-increasing.
///
/// # Example
/// ```ignore
/// pub static RECIPROCAL_TABLE: [u32; 65537] = reciprocal_table!(16);
/// ```
///
/// The array length is `2^FRAC_BITS + 1`; binding it to a static whose type
/// is derived from the crate's own `FRAC_BITS` makes a mismatched argument a
/// compile error instead of a silently wrong table.
#[proc_macro]
pub fn reciprocal_table(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitInt);

    let frac_bits: u32 = match lit.base10_parse() {
        Ok(bits) => bits,
        Err(err) => return err.to_compile_error().into(),
    };

    if frac_bits == 0 || frac_bits > MAX_FRAC_BITS {
        return syn::Error::new(
            lit.span(),
            format!("fractional bits must be in 1..={}, got {}", MAX_FRAC_BITS, frac_bits),
        )
        .to_compile_error()
        .into();
    }

    let scale = 1u64 << frac_bits;
    let numerator = 1u64 << (2 * frac_bits);

    let entries = (0..=scale).map(|v| {
        let entry = if v == 0 {
            u32::MAX
        } else {
            (numerator / v).min(u32::MAX as u64) as u32
        };
        Literal::u32_unsuffixed(entry)
    });

    let output = quote! {
        [#(#entries),*]
    };

    output.into()
}
