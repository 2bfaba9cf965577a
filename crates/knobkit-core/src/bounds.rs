//! Per-dimension numeric bounds.
//!
//! A [`Bounds`] carries the static range a value may take, the narrower
//! display range a GUI slider spans, the slider increment and the display
//! precision. Integer kinds use the same type; their limits are whole
//! numbers stored as `f64`, which represents every `i32` exactly.
//!
//! # Example
//!
//! ```ignore
//! use knobkit_core::bounds::Bounds;
//!
//! let radius = Bounds::new(0.0, 1000.0)
//!     .with_display(0.0, 100.0)
//!     .with_increment(0.5)
//!     .with_decimals(1);
//!
//! assert_eq!(radius.normalize(50.0), 0.5);
//! assert_eq!(radius.denormalize(1.0), 100.0);
//! ```

use crate::error::ParameterError;

/// Slider increment used when none (or a non-positive one) is declared.
pub const DEFAULT_INCREMENT: f64 = 1.0;

/// Static and display limits for one value cell.
///
/// Invariant after [`validated`](Self::validated):
/// `minimum <= display_minimum <= display_maximum <= maximum` and
/// `increment > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest value the cell is meant to hold.
    pub minimum: f64,
    /// Largest value the cell is meant to hold.
    pub maximum: f64,
    /// Left end of the GUI slider.
    pub display_minimum: f64,
    /// Right end of the GUI slider.
    pub display_maximum: f64,
    /// Slider step.
    pub increment: f64,
    /// Display precision. `None` falls back to the store configuration.
    pub decimals: Option<u32>,
}

impl Bounds {
    /// Bounds with the display range equal to the static range.
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            display_minimum: minimum,
            display_maximum: maximum,
            increment: DEFAULT_INCREMENT,
            decimals: None,
        }
    }

    /// Bounds spanning every finite `f64`.
    pub const fn unbounded() -> Self {
        Self::new(f64::MIN, f64::MAX)
    }

    /// Bounds spanning every `i32`, with zero decimals.
    pub const fn for_int() -> Self {
        Self::new(i32::MIN as f64, i32::MAX as f64).with_decimals(0)
    }

    /// Bounds for a color channel: static range unbounded, slider over 0..1.
    pub const fn color() -> Self {
        Self::unbounded().with_display(0.0, 1.0).with_increment(0.01)
    }

    /// Set the display (slider) range.
    pub const fn with_display(mut self, minimum: f64, maximum: f64) -> Self {
        self.display_minimum = minimum;
        self.display_maximum = maximum;
        self
    }

    /// Set the slider increment.
    pub const fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Set the display precision.
    pub const fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Repair inconsistent bounds.
    ///
    /// - NaN limits fall back to the unbounded extremes
    /// - a reversed static or display range is swapped
    /// - a display range that is not a subset of the static range is clamped
    ///   into it
    /// - a non-positive or non-finite increment becomes [`DEFAULT_INCREMENT`]
    ///
    /// Returns the repaired bounds and, when anything had to change, a
    /// [`ParameterError::MalformedBounds`] describing the first problem.
    pub fn validated(self) -> (Self, Option<ParameterError>) {
        let mut b = self;
        let mut issue: Option<String> = None;
        let mut note = |msg: String| {
            if issue.is_none() {
                issue = Some(msg);
            }
        };

        if b.minimum.is_nan() {
            note("minimum is NaN".to_string());
            b.minimum = f64::MIN;
        }
        if b.maximum.is_nan() {
            note("maximum is NaN".to_string());
            b.maximum = f64::MAX;
        }
        if b.display_minimum.is_nan() {
            note("display minimum is NaN".to_string());
            b.display_minimum = b.minimum;
        }
        if b.display_maximum.is_nan() {
            note("display maximum is NaN".to_string());
            b.display_maximum = b.maximum;
        }

        if b.minimum > b.maximum {
            note(format!("minimum {} exceeds maximum {}", b.minimum, b.maximum));
            std::mem::swap(&mut b.minimum, &mut b.maximum);
        }
        if b.display_minimum > b.display_maximum {
            note(format!(
                "display minimum {} exceeds display maximum {}",
                b.display_minimum, b.display_maximum
            ));
            std::mem::swap(&mut b.display_minimum, &mut b.display_maximum);
        }
        if b.display_minimum < b.minimum || b.display_maximum > b.maximum {
            note(format!(
                "display range [{}, {}] outside range [{}, {}]",
                b.display_minimum, b.display_maximum, b.minimum, b.maximum
            ));
            b.display_minimum = b.display_minimum.clamp(b.minimum, b.maximum);
            b.display_maximum = b.display_maximum.clamp(b.minimum, b.maximum);
        }

        if !(b.increment.is_finite() && b.increment > 0.0) {
            note(format!("increment {} is not positive", b.increment));
            b.increment = DEFAULT_INCREMENT;
        }

        (b, issue.map(ParameterError::MalformedBounds))
    }

    /// True if `value` lies within the static range.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }

    /// Clamp `value` into the static range.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.minimum, self.maximum)
    }

    /// Map a plain value to a slider position (0.0-1.0) over the display range.
    ///
    /// Values outside the display range are clamped.
    pub fn normalize(&self, plain: f64) -> f64 {
        let span = self.display_maximum - self.display_minimum;
        if span.abs() < f64::EPSILON || !span.is_finite() {
            return 0.5;
        }
        ((plain - self.display_minimum) / span).clamp(0.0, 1.0)
    }

    /// Map a slider position (0.0-1.0) back to a plain value.
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = normalized.clamp(0.0, 1.0);
        self.display_minimum + normalized * (self.display_maximum - self.display_minimum)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}
