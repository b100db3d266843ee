use std::{
    error::Error,
    fmt::{Display, Formatter},
};
use proc_macro::TokenStream;
use syn::{parse_macro_input, LitStr};
use quote::quote;

// Duplicates `Relpath::is_canonical`'s rules so non-canonical literals are
// caught at compile time instead of silently canonicalized away.
#[derive(Debug, PartialEq, Eq)]
enum RelpathLiteralError {
    LeadingSlash,
    TrailingSlash,
    EmptySegment,
    DotSegment,
}

impl Display for RelpathLiteralError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            RelpathLiteralError::LeadingSlash => write!(fmt, "relpath literal must not start with '/'"),
            RelpathLiteralError::TrailingSlash => write!(fmt, "relpath literal must not end with '/'"),
            RelpathLiteralError::EmptySegment => write!(fmt, "relpath literal contains an empty segment (\"//\")"),
            RelpathLiteralError::DotSegment => write!(fmt, "relpath literal contains a \".\" segment"),
        }
    }
}

impl Error for RelpathLiteralError {}

fn validated(s: &str) -> Result<(), RelpathLiteralError> {
    if s.is_empty() {
        return Ok(());
    }
    if s.starts_with('/') {
        return Err(RelpathLiteralError::LeadingSlash);
    }
    if s.ends_with('/') {
        return Err(RelpathLiteralError::TrailingSlash);
    }
    for segment in s.split('/') {
        if segment.is_empty() {
            return Err(RelpathLiteralError::EmptySegment);
        }
        if segment == "." {
            return Err(RelpathLiteralError::DotSegment);
        }
    }
    Ok(())
}

/// Implementation of [`revtree_core::relpath`]; see that crate for docs.
#[proc_macro]
pub fn relpath(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LitStr);
    let value = input.value();
    if let Err(e) = validated(&value) {
        return proc_macro::TokenStream::from(
            syn::parse::Error::new_spanned(input, e.to_string()).to_compile_error(),
        );
    }
    (quote! {
        ::revtree_core::path::relpath::Relpath::from_str_preverified(#value)
    })
    .into()
}
