//! Values, keyframes and interpolation strategies.
//!
//! [`Value`] is the kind-independent currency of the store API. Inside a
//! parameter, values live in typed [`ValueCell`](crate::cell::ValueCell)s
//! whose element type implements [`CellValue`].
//!
//! Between two keyframes a cell asks an [`Interpolator`] for the value. The
//! built-in [`Linear`] strategy defers to [`CellValue::blend`]: a true linear
//! blend for doubles, a rounded one for integers, and a step (hold the
//! earlier key) for booleans, choice indices and strings. Custom parameters
//! may carry their own strategy supplied by the plugin.

use crate::types::Time;

/// A single parameter value, independent of kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i32),
    Double(f64),
    Bool(bool),
    /// Index into a choice parameter's entries.
    Choice(usize),
    String(String),
}

impl Value {
    /// Integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload as `f64` (`Int` widens).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Choice index, if this is a `Choice`.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Choice(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// A `(time, value)` anchor of an animation curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub time: Time,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: Time, value: T) -> Self {
        Self { time, value }
    }
}

/// Element type of a value cell.
pub trait CellValue: Clone + PartialEq + Send + Sync + 'static {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Value at fraction `t` (0.0-1.0) of the way from `a` to `b`.
    fn blend(a: &Self, b: &Self, t: f64) -> Self;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`], `None` on a variant mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

impl CellValue for f64 {
    const TYPE_NAME: &'static str = "double";

    #[inline]
    fn blend(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl CellValue for i32 {
    const TYPE_NAME: &'static str = "int";

    #[inline]
    fn blend(a: &Self, b: &Self, t: f64) -> Self {
        let v = *a as f64 + (*b as f64 - *a as f64) * t;
        v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl CellValue for bool {
    const TYPE_NAME: &'static str = "bool";

    #[inline]
    fn blend(a: &Self, _b: &Self, _t: f64) -> Self {
        *a
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl CellValue for usize {
    const TYPE_NAME: &'static str = "choice";

    #[inline]
    fn blend(a: &Self, _b: &Self, _t: f64) -> Self {
        *a
    }

    fn into_value(self) -> Value {
        Value::Choice(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_index()
    }
}

impl CellValue for String {
    const TYPE_NAME: &'static str = "string";

    fn blend(a: &Self, _b: &Self, _t: f64) -> Self {
        a.clone()
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

/// Cell values with a numeric reading, for derivatives and integrals.
pub trait Numeric: CellValue + Copy {
    fn to_f64(self) -> f64;
}

impl Numeric for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Numeric for i32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Strategy computing a cell value strictly between two keyframes.
///
/// Called only with `before.time < time < after.time`. Exact keyframe hits and
/// times outside the keyed span never reach the strategy.
///
/// Plugins with custom parameters implement this to interpolate their opaque
/// string payloads:
///
/// ```ignore
/// struct Crossfade;
///
/// impl Interpolator<String> for Crossfade {
///     fn interpolate(&self, before: &Keyframe<String>, after: &Keyframe<String>, time: Time) -> String {
///         let t = (time - before.time) / (after.time - before.time);
///         format!("{}|{}|{:.3}", before.value, after.value, t)
///     }
/// }
/// ```
pub trait Interpolator<T>: Send + Sync {
    fn interpolate(&self, before: &Keyframe<T>, after: &Keyframe<T>, time: Time) -> T;
}

/// Default interpolation rule: [`CellValue::blend`] at the time fraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl<T: CellValue> Interpolator<T> for Linear {
    #[inline]
    fn interpolate(&self, before: &Keyframe<T>, after: &Keyframe<T>, time: Time) -> T {
        let span = after.time - before.time;
        let t = if span > 0.0 { (time - before.time) / span } else { 0.0 };
        T::blend(&before.value, &after.value, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_double_blend() {
        let a = Keyframe::new(0.0, 10.0);
        let b = Keyframe::new(10.0, 20.0);
        let v: f64 = Linear.interpolate(&a, &b, 2.5);
        assert!((v - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_linear_int_rounds() {
        let a = Keyframe::new(0.0, 0);
        let b = Keyframe::new(4.0, 3);
        let v: i32 = Linear.interpolate(&a, &b, 2.0);
        // 1.5 rounds away from zero
        assert_eq!(v, 2);
    }

    #[test]
    fn test_step_types_hold_earlier_key() {
        let a = Keyframe::new(0.0, false);
        let b = Keyframe::new(10.0, true);
        assert!(!Linear.interpolate(&a, &b, 9.9));

        let a = Keyframe::new(0.0, "left".to_string());
        let b = Keyframe::new(10.0, "right".to_string());
        assert_eq!(Linear.interpolate(&a, &b, 5.0), "left");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Double(0.5).as_int(), None);
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(<f64 as CellValue>::from_value(&Value::Int(2)), Some(2.0));
        assert_eq!(<i32 as CellValue>::from_value(&Value::Double(2.0)), None);
    }
}
