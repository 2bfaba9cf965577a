//! # knobkit
//!
//! Typed, time-varying parameter store for effect hosts.
//!
//! ## Architecture
//!
//! ```text
//! Plugin descriptors (ParameterDescriptor)
//!        ↓
//! ParameterStore::instantiate (one per effect instance)
//!        ↓
//! Parameter (uniform get/set/animate) → ValueCell<T> per dimension
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use knobkit::prelude::*;
//!
//! #[derive(Copy, Clone, PartialEq, Debug, ChoiceEnum)]
//! pub enum Filter {
//!     Box,
//!     #[default]
//!     Gaussian,
//! }
//!
//! let clock = Arc::new(ManualClock::new(0.0));
//! let store = ParameterStore::instantiate(
//!     vec![
//!         ParameterDescriptor::double("radius", 2.0, Bounds::new(0.0, 50.0)),
//!         ParameterDescriptor::choice_from::<Filter>("filter"),
//!     ],
//!     clock.clone(),
//!     StoreConfig::new(),
//! )?;
//!
//! let radius = store.lookup("radius")?;
//! radius.set_at(0, 0.0, Value::Double(0.0))?;
//! radius.set_at(0, 24.0, Value::Double(10.0))?;
//!
//! clock.set_time(12.0);
//! assert_eq!(radius.get(0)?, Value::Double(5.0));
//! let filter: Filter = store.lookup("filter")?.choice_value()?;
//! ```

// Re-export sub-crates
pub use knobkit_core as core;

// Re-export derive macros when feature is enabled
#[cfg(feature = "derive")]
pub use knobkit_macros::ChoiceEnum;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use knobkit::prelude::*;
/// ```
pub mod prelude {
    pub use knobkit_core::{
        // Declarations
        Bounds, ChoiceEntry, ParameterDescriptor, ParameterKind, StringMode,
        // Store and parameters
        Parameter, ParameterStore, StoreConfig, Validation, WritePolicy,
        // Values and animation
        Interpolator, Keyframe, Linear, Value, ValueCell,
        // Time
        EvaluationClock, FixedClock, ManualClock, Time,
        // Grouping
        Container, TabContainer,
        // Typed choices
        ChoiceValue,
        // Persistence
        CellSnapshot, ParameterSnapshot,
        // Error types
        ParameterError, ParameterResult,
    };

    #[cfg(feature = "derive")]
    pub use knobkit_macros::ChoiceEnum;
}
