//! Typed access to choice parameters through Rust enums.
//!
//! A choice parameter stores an index into its entry table. Implementing
//! [`ChoiceValue`] for a unit-only enum lets code read and write that index
//! as the enum instead. Use `#[derive(ChoiceEnum)]` from the `knobkit`
//! crate rather than implementing the trait by hand:
//!
//! ```ignore
//! use knobkit::prelude::*;
//!
//! #[derive(Copy, Clone, PartialEq, Debug, ChoiceEnum)]
//! pub enum Filter {
//!     #[name = "Box"]
//!     #[help = "Average of the kernel footprint"]
//!     Box,
//!     #[default]
//!     #[name = "Gaussian"]
//!     Gaussian,
//!     Lanczos,
//! }
//!
//! let descriptor = ParameterDescriptor::choice_from::<Filter>("filter");
//! // later, on the instantiated parameter:
//! // let filter: Filter = parameter.choice_value()?;
//! ```

/// Enum usable as the value of a choice parameter.
pub trait ChoiceValue: Copy + PartialEq + Send + Sync + 'static {
    /// Number of variants.
    const COUNT: usize;

    /// Index of the default variant (from `#[default]` or the first variant).
    const DEFAULT_INDEX: usize;

    /// Variant at `index`, `None` when out of range.
    fn from_index(index: usize) -> Option<Self>;

    /// Index of this variant.
    fn to_index(self) -> usize;

    /// The default variant.
    fn default_value() -> Self;

    /// `(symbol, help)` pairs in variant order.
    fn entries() -> &'static [(&'static str, &'static str)];
}
