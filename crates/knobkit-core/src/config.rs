//! Store-wide configuration.
//!
//! # Example
//!
//! ```ignore
//! use knobkit_core::{StoreConfig, WritePolicy};
//!
//! pub static CONFIG: StoreConfig = StoreConfig::new()
//!     .with_write_policy(WritePolicy::Clamp)
//!     .with_default_decimals(3);
//! ```

/// What a numeric write outside the static range does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Store the value as given and report [`Validation::OutOfRange`].
    #[default]
    Accept,
    /// Clamp into the static range and report [`Validation::Clamped`].
    Clamp,
}

/// Outcome of a successful write.
///
/// Out-of-range numeric writes are soft issues: the write still happens
/// (possibly clamped) and the caller decides whether to surface it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    /// Value stored as given and within bounds.
    Accepted,
    /// Value stored as given although outside `[minimum, maximum]`.
    OutOfRange { minimum: f64, maximum: f64 },
    /// Value was outside bounds and has been clamped to `stored`.
    Clamped { requested: f64, stored: f64 },
}

impl Validation {
    /// True unless the write hit a bounds issue.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The more severe of two outcomes, for multi-dimension writes.
    pub(crate) fn merge(self, other: Validation) -> Validation {
        match self {
            Self::Accepted => other,
            _ => self,
        }
    }
}

/// Configuration shared by every parameter of one store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Handling of out-of-range numeric writes.
    pub write_policy: WritePolicy,

    /// Display precision for double kinds whose bounds declare none.
    pub default_decimals: u32,
}

impl StoreConfig {
    /// Accept out-of-range writes, two decimals.
    pub const fn new() -> Self {
        Self {
            write_policy: WritePolicy::Accept,
            default_decimals: 2,
        }
    }

    /// Set the write policy.
    pub const fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Set the fallback display precision.
    pub const fn with_default_decimals(mut self, decimals: u32) -> Self {
        self.default_decimals = decimals;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
