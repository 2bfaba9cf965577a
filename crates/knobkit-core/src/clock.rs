//! Evaluation time supplied by the host.
//!
//! The store never tracks time itself. The host's evaluation loop owns the
//! timeline and exposes "now" through an [`EvaluationClock`]; parameters
//! read it for [`Parameter::get`](crate::Parameter::get) on animated values
//! and for frame-pattern file names.
//!
//! # Example
//!
//! ```ignore
//! let clock = Arc::new(ManualClock::new(0.0));
//! let store = ParameterStore::instantiate(descriptors, clock.clone(), StoreConfig::new())?;
//!
//! // Host scrubs the timeline:
//! clock.set_time(24.0);
//! let size = store.lookup("size")?.get(0)?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{frame_at, Frame, Time};

/// Source of the current evaluation time.
///
/// Implementations must be cheap and non-blocking; they are read on every
/// non-explicit-time value access.
pub trait EvaluationClock: Send + Sync {
    /// Current timeline time in frames.
    fn time(&self) -> Time;

    /// Current whole frame.
    fn frame(&self) -> Frame {
        frame_at(self.time())
    }
}

/// Host-driven clock.
///
/// Lock-free: the time is stored as `f64` bits in an `AtomicU64`. A
/// [`set_time`](Self::set_time) is visible to every subsequent read on any
/// thread.
#[derive(Debug)]
pub struct ManualClock {
    time: AtomicU64,
}

impl ManualClock {
    pub fn new(time: Time) -> Self {
        Self {
            time: AtomicU64::new(time.to_bits()),
        }
    }

    /// Move the clock. Non-finite times are ignored.
    pub fn set_time(&self, time: Time) {
        if time.is_finite() {
            self.time.store(time.to_bits(), Ordering::Release);
        } else {
            log::warn!("Ignoring non-finite evaluation time {}", time);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl EvaluationClock for ManualClock {
    #[inline]
    fn time(&self) -> Time {
        f64::from_bits(self.time.load(Ordering::Acquire))
    }
}

/// Clock stuck at one time. Useful for offline evaluation of a single frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub Time);

impl EvaluationClock for FixedClock {
    #[inline]
    fn time(&self) -> Time {
        self.0
    }
}
