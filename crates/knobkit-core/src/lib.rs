//! # knobkit-core
//!
//! Typed, time-varying parameter store for effect hosts.
//!
//! A plugin declares its parameters as [`ParameterDescriptor`]s. When the
//! host creates an effect instance it builds a [`ParameterStore`] from them;
//! every [`Parameter`] in the store owns one value cell per dimension, each
//! holding a static value and optionally a keyframe curve. The host's
//! evaluation loop supplies "now" through an [`EvaluationClock`].
//!
//! ## Main Types
//!
//! - [`ParameterStore`] - All parameters of one effect instance
//! - [`Parameter`] - Uniform get/set/animate access for every kind
//! - [`ParameterDescriptor`] - Immutable parameter declaration
//! - [`ValueCell`] - Static value plus keyframes
//! - [`Interpolator`] - Pluggable interpolation strategy
//! - [`TabContainer`] - The shared tabbed view of tab-flagged groups
//! - [`ParameterError`] - Error types
//!
//! ## Supporting Types
//!
//! - [`Bounds`] - Static and display range, increment, precision
//! - [`Value`] / [`Keyframe`] - Kind-independent values and curve anchors
//! - [`StoreConfig`] / [`WritePolicy`] - Out-of-range write handling
//! - [`Formatter`] - Display text for values
//! - [`ParameterSnapshot`] - Plain-data state for project persistence
//! - [`ChoiceValue`] - Typed enum access to choice parameters

pub mod bounds;
pub mod cell;
pub mod choice;
pub mod clock;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod parameter;
pub mod pattern;
pub mod snapshot;
pub mod store;
pub mod tab;
pub mod types;
pub mod value;

// Re-exports for convenience
pub use bounds::Bounds;
pub use cell::ValueCell;
pub use choice::ChoiceValue;
pub use clock::{EvaluationClock, FixedClock, ManualClock};
pub use config::{StoreConfig, Validation, WritePolicy};
pub use descriptor::{ChoiceEntry, ParameterDescriptor, ParameterKind, StringMode};
pub use error::{ParameterError, ParameterResult};
pub use format::Formatter;
pub use parameter::Parameter;
pub use snapshot::{CellSnapshot, ParameterSnapshot};
pub use store::ParameterStore;
pub use tab::{Container, TabContainer, TabPage};
pub use types::{frame_at, Frame, ParameterId, Time, MAX_DIMENSIONS};
pub use value::{CellValue, Interpolator, Keyframe, Linear, Numeric, Value};
