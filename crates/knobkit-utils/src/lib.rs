//! Internal utilities for the knobkit parameter store.
//!
//! Low-level helpers shared by `knobkit-core`. Everything here is `const fn`
//! where possible and has no external dependencies.
//!
//! # Contents
//!
//! - [`fnv1a_32`] - FNV-1a hash turning parameter names into stable ids
//! - [`name_id`] - the same hash, with the empty name rejected

pub mod hash;

pub use hash::{fnv1a_32, name_id};
