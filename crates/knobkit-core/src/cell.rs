//! A single addressable value slot, optionally animated.
//!
//! [`ValueCell`] holds a static value plus an ordered keyframe list. With no
//! keyframes the static value is the cell's value at every time. Once keyed,
//! reads evaluate the curve: exact keyframe times return the keyed value,
//! times between two keys ask the cell's [`Interpolator`], and times outside
//! the keyed span hold the nearest end value.
//!
//! # Thread Safety
//!
//! The static value and the keyframes sit behind one `parking_lot::RwLock`.
//! A write is visible to every read that starts after the write returns, on
//! any thread. Two threads writing the same cell concurrently will not
//! corrupt it, but which write lands last is unspecified; the owning effect
//! serializes its writers.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ParameterError, ParameterResult};
use crate::types::Time;
use crate::value::{CellValue, Interpolator, Keyframe, Linear, Numeric};

struct CellState<T> {
    value: T,
    /// Strictly increasing by time.
    keys: Vec<Keyframe<T>>,
}

/// Typed, optionally time-varying value slot.
pub struct ValueCell<T: CellValue> {
    state: RwLock<CellState<T>>,
    interpolator: Arc<dyn Interpolator<T>>,
}

impl<T: CellValue> ValueCell<T> {
    /// Create a cell using the [`Linear`] rule between keyframes.
    pub fn new(value: T) -> Self {
        Self::with_interpolator(value, Arc::new(Linear))
    }

    /// Create a cell with a custom interpolation strategy.
    pub fn with_interpolator(value: T, interpolator: Arc<dyn Interpolator<T>>) -> Self {
        Self {
            state: RwLock::new(CellState {
                value,
                keys: Vec::new(),
            }),
            interpolator,
        }
    }

    // === Reads ===

    /// Current value: the static value, or the curve at `now` once keyed.
    ///
    /// `now` comes from the host's evaluation clock.
    pub fn get_static(&self, now: Time) -> T {
        self.get_at(now)
    }

    /// Value at an explicit time.
    pub fn get_at(&self, time: Time) -> T {
        let state = self.state.read();
        if state.keys.is_empty() {
            state.value.clone()
        } else {
            self.evaluate(&state.keys, time)
        }
    }

    /// The non-animated value, ignoring any keyframes.
    pub fn static_value(&self) -> T {
        self.state.read().value.clone()
    }

    fn evaluate(&self, keys: &[Keyframe<T>], time: Time) -> T {
        let idx = keys.partition_point(|k| k.time < time);
        if idx < keys.len() && keys[idx].time == time {
            return keys[idx].value.clone();
        }
        if idx == 0 {
            return keys[0].value.clone();
        }
        if idx == keys.len() {
            return keys[idx - 1].value.clone();
        }
        self.interpolator.interpolate(&keys[idx - 1], &keys[idx], time)
    }

    // === Writes ===

    /// Overwrite the non-animated value. Keyframes are left untouched.
    pub fn set_static(&self, value: T) {
        self.state.write().value = value;
    }

    /// Insert a keyframe, or overwrite the one already at `time`.
    ///
    /// Returns `true` if a new keyframe was inserted.
    pub fn set_at(&self, time: Time, value: T) -> ParameterResult<bool> {
        if !time.is_finite() {
            return Err(ParameterError::NonFinite);
        }
        let mut state = self.state.write();
        let idx = state.keys.partition_point(|k| k.time < time);
        if idx < state.keys.len() && state.keys[idx].time == time {
            state.keys[idx].value = value;
            Ok(false)
        } else {
            state.keys.insert(idx, Keyframe::new(time, value));
            Ok(true)
        }
    }

    /// Replace the static value and the whole keyframe list in one step.
    ///
    /// Keys are sorted by time; of two keys at the same time the later one in
    /// `keys` wins. Fails without mutating on a non-finite time.
    pub fn restore(&self, value: T, mut keys: Vec<Keyframe<T>>) -> ParameterResult<()> {
        if keys.iter().any(|k| !k.time.is_finite()) {
            return Err(ParameterError::NonFinite);
        }
        // Stable sort keeps input order among equal times.
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut deduped: Vec<Keyframe<T>> = Vec::with_capacity(keys.len());
        for key in keys {
            match deduped.last_mut() {
                Some(last) if last.time == key.time => *last = key,
                _ => deduped.push(key),
            }
        }

        let mut state = self.state.write();
        state.value = value;
        state.keys = deduped;
        Ok(())
    }

    // === Keyframe access ===

    /// True if the cell has at least one keyframe.
    pub fn has_keyframes(&self) -> bool {
        !self.state.read().keys.is_empty()
    }

    pub fn keyframe_count(&self) -> usize {
        self.state.read().keys.len()
    }

    /// All keyframes in time order.
    pub fn keyframes(&self) -> Vec<Keyframe<T>> {
        self.state.read().keys.clone()
    }

    /// Keyframe times in increasing order.
    pub fn keyframe_times(&self) -> Vec<Time> {
        self.state.read().keys.iter().map(|k| k.time).collect()
    }

    /// Remove the keyframe at exactly `time`. Returns `true` if one existed.
    pub fn remove_keyframe(&self, time: Time) -> bool {
        let mut state = self.state.write();
        match state.keys.iter().position(|k| k.time == time) {
            Some(idx) => {
                state.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every keyframe. The static value becomes current again.
    pub fn clear_keyframes(&self) {
        self.state.write().keys.clear();
    }
}

// =============================================================================
// Numeric calculus
// =============================================================================

/// Unrounded piecewise-linear reading of a keyed curve.
fn linear_at<T: Numeric>(keys: &[Keyframe<T>], time: Time) -> f64 {
    let idx = keys.partition_point(|k| k.time < time);
    if idx == 0 {
        return keys[0].value.to_f64();
    }
    if idx == keys.len() {
        return keys[idx - 1].value.to_f64();
    }
    let (a, b) = (&keys[idx - 1], &keys[idx]);
    let t = (time - a.time) / (b.time - a.time);
    a.value.to_f64() + (b.value.to_f64() - a.value.to_f64()) * t
}

impl<T: Numeric> ValueCell<T> {
    /// Instantaneous rate of change (value per frame) at `time`.
    ///
    /// Exact for the linear rule: the slope of the segment containing `time`,
    /// taking the segment that starts at `time` when `time` is a keyframe.
    /// Zero for unkeyed cells and outside the keyed span. Integer cells report
    /// the slope of the unrounded curve.
    pub fn derivative(&self, time: Time) -> f64 {
        let state = self.state.read();
        let keys = &state.keys;
        if keys.len() < 2 {
            return 0.0;
        }
        let idx = keys.partition_point(|k| k.time <= time);
        if idx == 0 || idx == keys.len() {
            return 0.0;
        }
        let (a, b) = (&keys[idx - 1], &keys[idx]);
        (b.value.to_f64() - a.value.to_f64()) / (b.time - a.time)
    }

    /// Definite integral of the value over `[t1, t2]`.
    ///
    /// Exact for the linear rule: unkeyed cells integrate their constant,
    /// keyed cells are integrated segment by segment with the trapezoid rule,
    /// which is exact on straight lines. Integer cells integrate the
    /// unrounded curve. `t2 < t1` yields the negated integral.
    pub fn integral(&self, t1: Time, t2: Time) -> f64 {
        if t2 < t1 {
            return -self.integral(t2, t1);
        }
        let state = self.state.read();
        let keys = &state.keys;
        if keys.is_empty() {
            return state.value.to_f64() * (t2 - t1);
        }

        let mut total = 0.0;
        let mut a = t1;
        let mut fa = linear_at(keys, a);
        for key in keys.iter().filter(|k| k.time > t1 && k.time < t2) {
            let fb = key.value.to_f64();
            total += (fa + fb) * 0.5 * (key.time - a);
            a = key.time;
            fa = fb;
        }
        let fb = linear_at(keys, t2);
        total + (fa + fb) * 0.5 * (t2 - a)
    }
}

impl<T: CellValue + fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ValueCell")
            .field("value", &state.value)
            .field("keys", &state.keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_static_value_without_keys() {
        let cell = ValueCell::new(3.0);
        assert_eq!(cell.get_static(100.0), 3.0);
        assert_eq!(cell.get_at(-5.0), 3.0);
        assert!(!cell.has_keyframes());
    }

    #[test]
    fn test_set_static_leaves_keys() {
        let cell = ValueCell::new(0.0);
        cell.set_static(7.0);
        assert!(!cell.has_keyframes());
        assert_eq!(cell.get_static(0.0), 7.0);

        cell.set_at(10.0, 1.0).unwrap();
        cell.set_static(9.0);
        assert_eq!(cell.keyframe_count(), 1);
        assert_eq!(cell.static_value(), 9.0);
        // The curve still wins while keyed.
        assert_eq!(cell.get_at(10.0), 1.0);
    }

    #[test]
    fn test_exact_keyframe_read() {
        let cell = ValueCell::new(0.0);
        cell.set_at(3.0, 0.1).unwrap();
        cell.set_at(7.0, 0.7).unwrap();
        assert_eq!(cell.get_at(3.0), 0.1);
        assert_eq!(cell.get_at(7.0), 0.7);
    }

    #[test]
    fn test_linear_between_keys() {
        let cell = ValueCell::new(0.0);
        cell.set_at(10.0, 2.0).unwrap();
        cell.set_at(20.0, 4.0).unwrap();
        let t = 13.0;
        let expected = 2.0 + (4.0 - 2.0) * (t - 10.0) / (20.0 - 10.0);
        assert!((cell.get_at(t) - expected).abs() < EPS);
    }

    #[test]
    fn test_hold_outside_keyed_span() {
        let cell = ValueCell::new(0.0);
        cell.set_at(10.0, 2.0).unwrap();
        cell.set_at(20.0, 4.0).unwrap();
        assert_eq!(cell.get_at(0.0), 2.0);
        assert_eq!(cell.get_at(50.0), 4.0);
    }

    #[test]
    fn test_keys_stay_strictly_increasing() {
        let cell = ValueCell::new(0);
        assert!(cell.set_at(5.0, 1).unwrap());
        assert!(cell.set_at(1.0, 2).unwrap());
        assert!(cell.set_at(3.0, 3).unwrap());
        assert!(!cell.set_at(3.0, 4).unwrap());
        assert_eq!(cell.keyframe_times(), vec![1.0, 3.0, 5.0]);
        assert_eq!(cell.get_at(3.0), 4);
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let cell = ValueCell::new(0.0);
        assert_eq!(cell.set_at(f64::NAN, 1.0), Err(ParameterError::NonFinite));
        assert!(!cell.has_keyframes());
    }

    #[test]
    fn test_remove_and_clear() {
        let cell = ValueCell::new(1.0);
        cell.set_at(1.0, 5.0).unwrap();
        cell.set_at(2.0, 6.0).unwrap();
        assert!(cell.remove_keyframe(1.0));
        assert!(!cell.remove_keyframe(1.0));
        assert_eq!(cell.keyframe_count(), 1);
        cell.clear_keyframes();
        assert_eq!(cell.get_at(2.0), 1.0);
    }

    #[test]
    fn test_restore_sorts_and_dedups() {
        let cell = ValueCell::new(0.0);
        cell.restore(
            2.0,
            vec![
                Keyframe::new(5.0, 50.0),
                Keyframe::new(1.0, 10.0),
                Keyframe::new(5.0, 55.0),
            ],
        )
        .unwrap();
        assert_eq!(cell.static_value(), 2.0);
        assert_eq!(cell.keyframe_times(), vec![1.0, 5.0]);
        assert_eq!(cell.get_at(5.0), 55.0);
    }

    #[test]
    fn test_restore_rejects_bad_time_without_mutation() {
        let cell = ValueCell::new(1.0);
        cell.set_at(0.0, 3.0).unwrap();
        let result = cell.restore(9.0, vec![Keyframe::new(f64::INFINITY, 1.0)]);
        assert!(result.is_err());
        assert_eq!(cell.static_value(), 1.0);
        assert_eq!(cell.keyframe_count(), 1);
    }

    struct Midpoint;

    impl Interpolator<String> for Midpoint {
        fn interpolate(&self, before: &Keyframe<String>, after: &Keyframe<String>, _time: Time) -> String {
            format!("{}~{}", before.value, after.value)
        }
    }

    #[test]
    fn test_custom_interpolator_used_between_keys_only() {
        let cell = ValueCell::with_interpolator(String::new(), Arc::new(Midpoint));
        cell.set_at(0.0, "a".to_string()).unwrap();
        cell.set_at(10.0, "b".to_string()).unwrap();
        assert_eq!(cell.get_at(5.0), "a~b");
        assert_eq!(cell.get_at(0.0), "a");
        assert_eq!(cell.get_at(11.0), "b");
    }

    #[test]
    fn test_derivative() {
        let cell = ValueCell::new(5.0);
        assert_eq!(cell.derivative(3.0), 0.0);

        cell.set_at(0.0, 0.0).unwrap();
        cell.set_at(10.0, 20.0).unwrap();
        cell.set_at(20.0, 20.0).unwrap();
        assert!((cell.derivative(5.0) - 2.0).abs() < EPS);
        assert!((cell.derivative(0.0) - 2.0).abs() < EPS);
        assert!((cell.derivative(15.0)).abs() < EPS);
        assert_eq!(cell.derivative(-1.0), 0.0);
        assert_eq!(cell.derivative(20.0), 0.0);
    }

    #[test]
    fn test_integral_static() {
        let cell = ValueCell::new(2.0);
        assert!((cell.integral(1.0, 4.0) - 6.0).abs() < EPS);
        assert!((cell.integral(4.0, 1.0) + 6.0).abs() < EPS);
    }

    #[test]
    fn test_integral_over_curve() {
        let cell = ValueCell::new(0.0);
        cell.set_at(0.0, 0.0).unwrap();
        cell.set_at(10.0, 10.0).unwrap();
        // Ramp 0..10 then held at 10 until 15.
        assert!((cell.integral(0.0, 10.0) - 50.0).abs() < EPS);
        assert!((cell.integral(0.0, 15.0) - 100.0).abs() < EPS);
        // Before the first key the value holds at 0.
        assert!((cell.integral(-5.0, 0.0)).abs() < EPS);
        assert!((cell.integral(2.0, 4.0) - 6.0).abs() < EPS);
    }

    #[test]
    fn test_integral_int_cell_uses_unrounded_curve() {
        let cell = ValueCell::new(0);
        cell.set_at(0.0, 0).unwrap();
        cell.set_at(2.0, 1).unwrap();
        assert!((cell.integral(0.0, 2.0) - 1.0).abs() < EPS);
    }
}
