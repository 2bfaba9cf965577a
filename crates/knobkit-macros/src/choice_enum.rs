//! Derive macro for the `ChoiceValue` trait.
//!
//! Each variant becomes one entry of the choice parameter's table, in
//! declaration order. The variant index is the stored value.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Copy, Clone, PartialEq, ChoiceEnum)]
//! pub enum Edge {
//!     #[help = "Repeat the edge pixel"]
//!     Clamp,
//!     #[default]
//!     Wrap,
//!     #[name = "Mirror Repeat"]
//!     Mirror,
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

struct VariantInfo {
    ident: syn::Ident,
    /// From `#[name = "..."]` or the identifier
    symbol: String,
    /// From `#[help = "..."]`, empty if absent
    help: String,
    is_default: bool,
}

/// Parse and generate the ChoiceValue implementation for an enum.
pub fn derive_choice_enum_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let data_enum = match &input.data {
        Data::Enum(e) => e,
        Data::Struct(_) => {
            return Err(syn::Error::new_spanned(
                &input,
                "#[derive(ChoiceEnum)] only supports enums, not structs",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input,
                "#[derive(ChoiceEnum)] only supports enums, not unions",
            ))
        }
    };

    let mut variants = Vec::new();
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "#[derive(ChoiceEnum)] only supports unit variants (no fields)",
            ));
        }

        let symbol = string_attribute(&variant.attrs, "name")?
            .unwrap_or_else(|| variant.ident.to_string());
        let help = string_attribute(&variant.attrs, "help")?.unwrap_or_default();

        variants.push(VariantInfo {
            ident: variant.ident.clone(),
            symbol,
            help,
            is_default: variant.attrs.iter().any(|a| a.path().is_ident("default")),
        });
    }

    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "#[derive(ChoiceEnum)] requires at least one variant",
        ));
    }

    for (i, v) in variants.iter().enumerate() {
        if variants[..i].iter().any(|earlier| earlier.symbol == v.symbol) {
            return Err(syn::Error::new_spanned(
                &v.ident,
                format!("#[derive(ChoiceEnum)] duplicate entry name \"{}\"", v.symbol),
            ));
        }
    }

    let default_indices: Vec<usize> = variants
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_default)
        .map(|(i, _)| i)
        .collect();

    if default_indices.len() > 1 {
        return Err(syn::Error::new_spanned(
            &input,
            "#[derive(ChoiceEnum)] only one variant can be marked as #[default]",
        ));
    }

    let default_index = default_indices.first().copied().unwrap_or(0);

    let enum_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let count = variants.len();

    let from_index_arms = variants.iter().enumerate().map(|(idx, v)| {
        let ident = &v.ident;
        quote! { #idx => Some(#enum_name::#ident), }
    });

    let to_index_arms = variants.iter().enumerate().map(|(idx, v)| {
        let ident = &v.ident;
        quote! { #enum_name::#ident => #idx, }
    });

    let entries = variants.iter().map(|v| {
        let symbol = &v.symbol;
        let help = &v.help;
        quote! { (#symbol, #help) }
    });

    let default_ident = &variants[default_index].ident;

    Ok(quote! {
        impl #impl_generics ::knobkit::core::choice::ChoiceValue for #enum_name #ty_generics #where_clause {
            const COUNT: usize = #count;
            const DEFAULT_INDEX: usize = #default_index;

            fn from_index(index: usize) -> Option<Self> {
                match index {
                    #(#from_index_arms)*
                    _ => None,
                }
            }

            fn to_index(self) -> usize {
                match self {
                    #(#to_index_arms)*
                }
            }

            fn default_value() -> Self {
                #enum_name::#default_ident
            }

            fn entries() -> &'static [(&'static str, &'static str)] {
                &[#(#entries),*]
            }
        }
    })
}

/// Value of a `#[key = "..."]` attribute, if present.
fn string_attribute(attrs: &[syn::Attribute], key: &str) -> syn::Result<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident(key) {
            let name_value = attr.meta.require_name_value()?;
            return match &name_value.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit_str),
                    ..
                }) => Ok(Some(lit_str.value())),
                other => Err(syn::Error::new_spanned(
                    other,
                    format!("expected string literal for #[{} = \"...\"]", key),
                )),
            };
        }
    }
    Ok(None)
}
