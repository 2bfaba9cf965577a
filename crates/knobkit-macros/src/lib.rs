//! Derive macros for the knobkit parameter store.
//!
//! This crate provides `#[derive(ChoiceEnum)]`, which lets a unit-only enum
//! stand in for the index stored by a choice parameter.
//!
//! # Example
//!
//! ```ignore
//! use knobkit::prelude::*;
//!
//! #[derive(Copy, Clone, PartialEq, Debug, ChoiceEnum)]
//! pub enum Blend {
//!     Over,
//!     #[default]
//!     #[name = "Screen"]
//!     #[help = "Inverse multiply of the inverted inputs"]
//!     Screen,
//!     Multiply,
//! }
//!
//! let descriptor = ParameterDescriptor::choice_from::<Blend>("blend");
//! ```

use proc_macro::TokenStream;

mod choice_enum;

/// Derive macro for implementing the `ChoiceValue` trait on enums.
///
/// # Requirements
///
/// - The type must be an enum with at least one variant
/// - All variants must be unit variants (no fields)
/// - The enum must also derive `Copy`, `Clone`, and `PartialEq`
///
/// # Attributes
///
/// - `#[name = "..."]` - Entry symbol shown in the dropdown. Defaults to the
///   variant identifier.
/// - `#[help = "..."]` - Tooltip text for the entry. Defaults to empty.
/// - `#[default]` - The default variant. If not specified, the first
///   variant is used. Only one variant can be marked as default.
#[proc_macro_derive(ChoiceEnum, attributes(name, help, default))]
pub fn derive_choice_enum(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    match choice_enum::derive_choice_enum_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
