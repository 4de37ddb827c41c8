// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Structural view of applied attributes.
//!
//! Attribute copying cannot treat attributes as opaque token soup: the
//! inclusion mask matches on the attribute path, and values nest.
//! `#[validate(length(min = 1, max = 64), email)]` is an instance holding a
//! nested instance. [`AnnotationInstance`] and [`AnnotationValue`] form the
//! closed union the copier recurses over, and [`AnnotationInstance::to_tokens`]
//! renders the structure back onto generated fields.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Attribute, Expr, Meta, Token,
    punctuated::Punctuated,
};

/// One applied attribute: a path plus its parameters.
#[derive(Debug, Clone)]
pub struct AnnotationInstance {
    /// Attribute path as written, e.g. `validate` or `validator::custom`.
    pub path: syn::Path,
    /// Parameters in declaration order.
    pub params: Vec<AnnotationParam>,
    /// True when the attribute was written `#[path = value]` rather than
    /// `#[path(...)]`; the single value is the only parameter.
    pub name_value: bool,
}

/// A single attribute parameter, named (`min = 1`) or positional (`email`).
#[derive(Debug, Clone)]
pub struct AnnotationParam {
    /// Parameter name; `None` for positional values.
    pub name: Option<syn::Path>,
    /// Parameter value.
    pub value: AnnotationValue,
}

/// Closed union of attribute parameter values.
#[derive(Debug, Clone)]
pub enum AnnotationValue {
    /// A literal expression, including negative numbers.
    Literal(Expr),
    /// A bare path, typically an enum variant or function reference.
    Path(syn::Path),
    /// A nested annotation instance, e.g. `length(min = 1)`.
    Nested(AnnotationInstance),
    /// A bracketed list of values.
    List(Vec<AnnotationValue>),
}

impl AnnotationInstance {
    /// Parses an attribute into its structural form.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`syn::Error`] when the attribute arguments are
    /// not meta- or expression-shaped.
    pub fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
        Self::from_meta(&attr.meta)
    }

    fn from_meta(meta: &Meta) -> syn::Result<Self> {
        match meta {
            Meta::Path(path) => Ok(Self {
                path: path.clone(),
                params: Vec::new(),
                name_value: false,
            }),
            Meta::NameValue(name_value) => Ok(Self {
                path: name_value.path.clone(),
                params: vec![AnnotationParam {
                    name: None,
                    value: AnnotationValue::from_expr(&name_value.value),
                }],
                name_value: true,
            }),
            Meta::List(list) => {
                let params = if list.tokens.is_empty() {
                    Vec::new()
                } else if let Ok(metas) =
                    list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                {
                    metas.iter().map(AnnotationParam::from_meta).collect()
                } else {
                    let exprs =
                        list.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?;
                    exprs
                        .iter()
                        .map(|expr| AnnotationParam {
                            name: None,
                            value: AnnotationValue::from_expr(expr),
                        })
                        .collect()
                };
                Ok(Self {
                    path: list.path.clone(),
                    params,
                    name_value: false,
                })
            }
        }
    }

    /// Attribute path with segments joined by `::`, as matched by the
    /// inclusion mask.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::")
    }

    fn inner_tokens(&self) -> TokenStream {
        let path = &self.path;
        if self.name_value
            && let Some(param) = self.params.first()
        {
            let value = param.value.to_tokens();
            return quote!(#path = #value);
        }
        if self.params.is_empty() {
            quote!(#path)
        } else {
            let params = self.params.iter().map(AnnotationParam::to_tokens);
            quote!(#path(#(#params),*))
        }
    }
}

impl ToTokens for AnnotationInstance {
    /// Renders the instance as an outer attribute, structurally recursing
    /// through nested values.
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let inner = self.inner_tokens();
        tokens.extend(quote!(#[#inner]));
    }
}

impl AnnotationParam {
    fn from_meta(meta: &Meta) -> Self {
        match meta {
            Meta::Path(path) => Self {
                name: None,
                value: AnnotationValue::Path(path.clone()),
            },
            Meta::NameValue(name_value) => Self {
                name: Some(name_value.path.clone()),
                value: AnnotationValue::from_expr(&name_value.value),
            },
            Meta::List(_) => Self {
                name: None,
                value: AnnotationInstance::from_meta(meta)
                    .map(AnnotationValue::Nested)
                    .unwrap_or_else(|_| {
                        AnnotationValue::Literal(Expr::Verbatim(meta.to_token_stream()))
                    }),
            },
        }
    }

    fn to_tokens(&self) -> TokenStream {
        let value = self.value.to_tokens();
        match &self.name {
            Some(name) => quote!(#name = #value),
            None => value,
        }
    }
}

impl AnnotationValue {
    fn from_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Path(path) if path.attrs.is_empty() && path.qself.is_none() => {
                Self::Path(path.path.clone())
            }
            Expr::Array(array) => Self::List(array.elems.iter().map(Self::from_expr).collect()),
            other => Self::Literal(other.clone()),
        }
    }

    fn to_tokens(&self) -> TokenStream {
        match self {
            Self::Literal(expr) => quote!(#expr),
            Self::Path(path) => quote!(#path),
            Self::Nested(instance) => instance.inner_tokens(),
            Self::List(values) => {
                let values = values.iter().map(Self::to_tokens);
                quote!([#(#values),*])
            }
        }
    }
}
