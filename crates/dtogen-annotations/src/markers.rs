// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Passthrough marker attributes.
//!
//! Both macros leave the annotated item unchanged in the compiled crate; the
//! markers exist so the `dtogen` generator can read them back from source.
//!
//! - [`dto_exclude`] keeps a struct, enum or trait out of generation entirely
//! - [`dto_methods`] strips `#[dto_method]` markers from an impl block so the
//!   marked methods compile (inert derive helpers cannot reach impl items)

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Item, ItemImpl};

/// Validate the target shape and pass the item through unchanged.
pub fn dto_exclude(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "dto_exclude takes no arguments")
            .to_compile_error();
    }

    let item: Item = match syn::parse2(input) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error(),
    };

    match &item {
        Item::Struct(_) | Item::Enum(_) | Item::Trait(_) => item.into_token_stream(),
        other => syn::Error::new_spanned(
            other,
            "dto_exclude can only be applied to structs, enums and traits",
        )
        .to_compile_error(),
    }
}

/// Strip `#[dto_method]` markers from every method of the impl block.
pub fn dto_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "dto_methods takes no arguments")
            .to_compile_error();
    }

    let mut item: ItemImpl = match syn::parse2(input) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error(),
    };

    for impl_item in &mut item.items {
        if let syn::ImplItem::Fn(method) = impl_item {
            method
                .attrs
                .retain(|attr| !attr.path().is_ident("dto_method"));
        }
    }

    quote!(#item)
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    #[test]
    fn dto_exclude_passes_struct_through() {
        let input = quote! {
            pub struct Internal {
                secret: String,
            }
        };
        let output = dto_exclude(TokenStream::new(), input.clone());
        assert_eq!(output.to_string(), input.to_string());
    }

    #[test]
    fn dto_exclude_passes_trait_through() {
        let input = quote! {
            pub trait Hidden {}
        };
        let output = dto_exclude(TokenStream::new(), input.clone());
        assert_eq!(output.to_string(), input.to_string());
    }

    #[test]
    fn dto_exclude_rejects_functions() {
        let input = quote! {
            fn helper() {}
        };
        let output = dto_exclude(TokenStream::new(), input).to_string();
        assert!(output.contains("compile_error"));
    }

    #[test]
    fn dto_exclude_rejects_arguments() {
        let output = dto_exclude(quote!(reason = "legacy"), quote!(struct S;)).to_string();
        assert!(output.contains("compile_error"));
    }

    #[test]
    fn dto_methods_strips_markers() {
        let input = quote! {
            impl User {
                #[dto_method]
                pub fn display_name(&self) -> String {
                    self.login.clone()
                }

                pub fn untouched(&self) {}
            }
        };
        let output = dto_methods(TokenStream::new(), input).to_string();
        assert!(!output.contains("dto_method"));
        assert!(output.contains("display_name"));
        assert!(output.contains("untouched"));
    }

    #[test]
    fn dto_methods_keeps_other_attributes() {
        let input = quote! {
            impl User {
                #[dto_method]
                #[inline]
                pub fn display_name(&self) -> String {
                    self.login.clone()
                }
            }
        };
        let output = dto_methods(TokenStream::new(), input).to_string();
        assert!(output.contains("inline"));
        assert!(!output.contains("dto_method"));
    }
}
