//! Instantiated parameters with uniform, kind-independent access.
//!
//! A [`Parameter`] is built from one [`ParameterDescriptor`] when the store
//! is instantiated. Every kind goes through the same API; per-kind behavior
//! lives in a private storage enum:
//!
//! | Kind | Storage | Animates |
//! |------|---------|----------|
//! | Int, Vec2Int, Vec3Int | `ValueCell<i32>` per dimension | yes |
//! | Double, colors, Vec2/Vec3 Double | `ValueCell<f64>` per dimension | yes |
//! | Bool | `ValueCell<bool>` | yes |
//! | Choice | `ValueCell<usize>` + entry table | no |
//! | String | one of four string storages | no |
//! | Custom | `ValueCell<String>` + interpolator | when declared |
//! | PushButton, Group | no value | no |
//!
//! # Reads and writes
//!
//! [`get`](Parameter::get) evaluates at the store clock's current time,
//! [`get_at`](Parameter::get_at) at an explicit one. [`set`](Parameter::set)
//! writes the static value, or a keyframe at the current time once that
//! dimension is keyed, so that `set(v)` followed by `get()` reads `v` back.
//! [`set_at`](Parameter::set_at) always writes a keyframe.
//!
//! Numeric writes outside the static range follow the store's
//! [`WritePolicy`]. Failed writes leave the parameter unchanged; multi-value
//! writes validate every value before storing any.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::bounds::Bounds;
use crate::cell::ValueCell;
use crate::choice::ChoiceValue;
use crate::clock::EvaluationClock;
use crate::config::{StoreConfig, Validation, WritePolicy};
use crate::descriptor::{ChoiceEntry, ParameterDescriptor, ParameterKind, StringMode};
use crate::error::{ParameterError, ParameterResult};
use crate::format::Formatter;
use crate::pattern;
use crate::snapshot::{CellSnapshot, ParameterSnapshot};
use crate::tab::{Container, TabContainer};
use crate::types::{frame_at, Frame, ParameterId, Time};
use crate::value::{CellValue, Interpolator, Keyframe, Linear, Value};

// =============================================================================
// Storage
// =============================================================================

/// Exactly one string storage is active per string parameter.
enum StringStorage {
    FilePathIn(ValueCell<String>),
    FilePathOut(ValueCell<String>),
    SingleLine(ValueCell<String>),
    MultiLine(ValueCell<String>),
}

impl StringStorage {
    fn for_mode(mode: StringMode, value: String) -> Self {
        let cell = ValueCell::new(value);
        match mode {
            StringMode::FilePath => Self::FilePathIn(cell),
            StringMode::OutputFilePath => Self::FilePathOut(cell),
            StringMode::SingleLine | StringMode::Label => Self::SingleLine(cell),
            StringMode::MultiLine => Self::MultiLine(cell),
        }
    }

    fn cell(&self) -> &ValueCell<String> {
        match self {
            Self::FilePathIn(cell)
            | Self::FilePathOut(cell)
            | Self::SingleLine(cell)
            | Self::MultiLine(cell) => cell,
        }
    }

    fn is_file_path(&self) -> bool {
        matches!(self, Self::FilePathIn(_) | Self::FilePathOut(_))
    }
}

enum GroupStorage {
    Folder {
        open: AtomicBool,
        children: Vec<ParameterId>,
    },
    Tab(Weak<TabContainer>),
}

enum Storage {
    PushButton,
    Int(Vec<ValueCell<i32>>),
    Double(Vec<ValueCell<f64>>),
    Bool(ValueCell<bool>),
    Choice(ValueCell<usize>),
    String(StringStorage),
    Group(GroupStorage),
    Custom(ValueCell<String>),
}

/// Borrowed view of one dimension's cell.
#[derive(Clone, Copy)]
enum CellRef<'a> {
    Int(&'a ValueCell<i32>),
    Double(&'a ValueCell<f64>),
    Bool(&'a ValueCell<bool>),
    Choice(&'a ValueCell<usize>),
    Text(&'a ValueCell<String>),
}

/// Run `$body` with `$cell` bound to the typed cell behind a [`CellRef`].
macro_rules! with_cell {
    ($cell_ref:expr, $cell:ident => $body:expr) => {
        match $cell_ref {
            CellRef::Int($cell) => $body,
            CellRef::Double($cell) => $body,
            CellRef::Bool($cell) => $body,
            CellRef::Choice($cell) => $body,
            CellRef::Text($cell) => $body,
        }
    };
}

fn value_keyframes<T: CellValue>(cell: &ValueCell<T>) -> Vec<Keyframe<Value>> {
    cell.keyframes()
        .into_iter()
        .map(|k| Keyframe::new(k.time, k.value.into_value()))
        .collect()
}

impl CellRef<'_> {
    fn get_at(&self, time: Time) -> Value {
        with_cell!(*self, cell => cell.get_at(time).into_value())
    }

    fn static_value(&self) -> Value {
        with_cell!(*self, cell => cell.static_value().into_value())
    }

    fn has_keyframes(&self) -> bool {
        with_cell!(*self, cell => cell.has_keyframes())
    }

    fn keyframes(&self) -> Vec<Keyframe<Value>> {
        with_cell!(*self, cell => value_keyframes(cell))
    }

    fn keyframe_times(&self) -> Vec<Time> {
        with_cell!(*self, cell => cell.keyframe_times())
    }

    fn remove_keyframe(&self, time: Time) -> bool {
        with_cell!(*self, cell => cell.remove_keyframe(time))
    }

    fn clear_keyframes(&self) {
        with_cell!(*self, cell => cell.clear_keyframes())
    }
}

/// A validated write, ready to be stored.
enum Pending<'a> {
    Int(&'a ValueCell<i32>, i32),
    Double(&'a ValueCell<f64>, f64),
    Bool(&'a ValueCell<bool>, bool),
    Choice(&'a ValueCell<usize>, usize),
    Text(&'a ValueCell<String>, String),
}

fn store_in<T: CellValue>(cell: &ValueCell<T>, value: T, key_time: Option<Time>) -> ParameterResult<()> {
    match key_time {
        Some(time) => cell.set_at(time, value).map(|_| ()),
        None => {
            cell.set_static(value);
            Ok(())
        }
    }
}

impl Pending<'_> {
    fn has_keyframes(&self) -> bool {
        match self {
            Self::Int(cell, _) => cell.has_keyframes(),
            Self::Double(cell, _) => cell.has_keyframes(),
            Self::Bool(cell, _) => cell.has_keyframes(),
            Self::Choice(cell, _) => cell.has_keyframes(),
            Self::Text(cell, _) => cell.has_keyframes(),
        }
    }

    fn commit(self, key_time: Option<Time>) -> ParameterResult<()> {
        match self {
            Self::Int(cell, v) => store_in(cell, v, key_time),
            Self::Double(cell, v) => store_in(cell, v, key_time),
            Self::Bool(cell, v) => store_in(cell, v, key_time),
            Self::Choice(cell, v) => store_in(cell, v, key_time),
            Self::Text(cell, v) => store_in(cell, v, key_time),
        }
    }
}

/// A validated snapshot cell, ready to replace a cell's state.
enum PendingRestore<'a> {
    Int(&'a ValueCell<i32>, i32, Vec<Keyframe<i32>>),
    Double(&'a ValueCell<f64>, f64, Vec<Keyframe<f64>>),
    Bool(&'a ValueCell<bool>, bool, Vec<Keyframe<bool>>),
    Choice(&'a ValueCell<usize>, usize, Vec<Keyframe<usize>>),
    Text(&'a ValueCell<String>, String, Vec<Keyframe<String>>),
}

impl PendingRestore<'_> {
    fn commit(self) -> ParameterResult<()> {
        match self {
            Self::Int(cell, v, keys) => cell.restore(v, keys),
            Self::Double(cell, v, keys) => cell.restore(v, keys),
            Self::Bool(cell, v, keys) => cell.restore(v, keys),
            Self::Choice(cell, v, keys) => cell.restore(v, keys),
            Self::Text(cell, v, keys) => cell.restore(v, keys),
        }
    }
}

// =============================================================================
// Parameter
// =============================================================================

/// One instantiated parameter.
///
/// Shared between the host's GUI and render threads through `&Parameter`;
/// every method takes `&self`.
pub struct Parameter {
    descriptor: Arc<ParameterDescriptor>,
    id: ParameterId,
    /// Validated bounds, one per dimension for numeric kinds.
    bounds: Vec<Bounds>,
    malformed: Vec<ParameterError>,
    storage: Storage,
    enabled: AtomicBool,
    secret: AtomicBool,
    parent: Option<ParameterId>,
    write_policy: WritePolicy,
    default_decimals: u32,
    clock: Arc<dyn EvaluationClock>,
}

impl Parameter {
    /// Build a parameter from its descriptor.
    ///
    /// A tab-flagged group creates the effect's tab container in `tabs` if
    /// none exists yet, then adds its page to it.
    pub(crate) fn new(
        descriptor: Arc<ParameterDescriptor>,
        id: ParameterId,
        clock: Arc<dyn EvaluationClock>,
        config: &StoreConfig,
        tabs: &mut Option<Arc<TabContainer>>,
    ) -> Self {
        let kind = descriptor.kind();
        let dims = kind.dimensionality();

        let mut bounds = Vec::with_capacity(descriptor.bounds().len());
        let mut malformed = Vec::new();
        for declared in descriptor.bounds() {
            let (repaired, issue) = declared.validated();
            if let Some(err) = issue {
                log::warn!("Parameter '{}': {}", descriptor.name(), err);
                malformed.push(err);
            }
            bounds.push(repaired);
        }

        let storage = match kind {
            ParameterKind::PushButton => Storage::PushButton,
            ParameterKind::Int | ParameterKind::Vec2Int | ParameterKind::Vec3Int => Storage::Int(
                (0..dims)
                    .map(|d| ValueCell::new(declared_default::<i32>(&descriptor, d)))
                    .collect(),
            ),
            ParameterKind::Double
            | ParameterKind::ColorRGB
            | ParameterKind::ColorRGBA
            | ParameterKind::Vec2Double
            | ParameterKind::Vec3Double => Storage::Double(
                (0..dims)
                    .map(|d| {
                        let mut v = declared_default::<f64>(&descriptor, d);
                        if !v.is_finite() {
                            log::warn!(
                                "Parameter '{}': non-finite default {} replaced by 0",
                                descriptor.name(),
                                v
                            );
                            v = 0.0;
                        }
                        ValueCell::new(v)
                    })
                    .collect(),
            ),
            ParameterKind::Bool => Storage::Bool(ValueCell::new(declared_default(&descriptor, 0))),
            ParameterKind::Choice => {
                Storage::Choice(ValueCell::new(choice_default(&descriptor)))
            }
            ParameterKind::String(mode) => {
                Storage::String(StringStorage::for_mode(mode, declared_default(&descriptor, 0)))
            }
            ParameterKind::Group if descriptor.is_tab() => {
                let container = tabs.get_or_insert_with(|| {
                    log::debug!("Group '{}' creates the tab container", descriptor.name());
                    Arc::new(TabContainer::new(descriptor.label()))
                });
                container.add_page(id, descriptor.label());
                log::debug!(
                    "Group '{}' attached to tab container {}",
                    descriptor.name(),
                    container.id()
                );
                Storage::Group(GroupStorage::Tab(Arc::downgrade(container)))
            }
            ParameterKind::Group => Storage::Group(GroupStorage::Folder {
                open: AtomicBool::new(descriptor.is_open()),
                children: Vec::new(),
            }),
            ParameterKind::Custom => {
                let interpolator: Arc<dyn Interpolator<String>> = match descriptor.interpolator() {
                    Some(custom) => custom.clone(),
                    None => Arc::new(Linear),
                };
                Storage::Custom(ValueCell::with_interpolator(
                    declared_default(&descriptor, 0),
                    interpolator,
                ))
            }
        };

        let starts_enabled = descriptor.string_mode() != Some(StringMode::Label);

        Self {
            descriptor,
            id,
            bounds,
            malformed,
            storage,
            enabled: AtomicBool::new(starts_enabled),
            secret: AtomicBool::new(false),
            parent: None,
            write_policy: config.write_policy,
            default_decimals: config.default_decimals,
            clock,
        }
    }

    // === Identity ===

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    /// Tooltip text, empty if none was declared.
    pub fn hint(&self) -> &str {
        self.descriptor.hint()
    }

    /// Stable id derived from the name.
    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn kind(&self) -> ParameterKind {
        self.descriptor.kind()
    }

    pub fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    pub fn dimensionality(&self) -> usize {
        self.kind().dimensionality()
    }

    /// True if this parameter accepts keyframes.
    pub fn animates(&self) -> bool {
        self.descriptor.animates()
    }

    /// Id of the group this parameter was attached to, if any.
    pub fn parent(&self) -> Option<ParameterId> {
        self.parent
    }

    /// Bounds of one dimension after construction-time repair. `None` for
    /// non-numeric kinds and out-of-range dimensions.
    pub fn bounds(&self, dimension: usize) -> Option<Bounds> {
        self.bounds.get(dimension).copied()
    }

    /// Bounds problems found and repaired during construction.
    pub fn malformed_bounds(&self) -> &[ParameterError] {
        &self.malformed
    }

    // === Cell access ===

    fn cell(&self, dimension: usize) -> ParameterResult<CellRef<'_>> {
        let dims = self.dimensionality();
        let out_of_range = ParameterError::IndexOutOfRange {
            index: dimension,
            len: dims,
        };
        let cell = match &self.storage {
            Storage::PushButton | Storage::Group(_) => {
                return Err(ParameterError::NoValue(self.kind()))
            }
            Storage::Int(cells) => CellRef::Int(cells.get(dimension).ok_or(out_of_range)?),
            Storage::Double(cells) => CellRef::Double(cells.get(dimension).ok_or(out_of_range)?),
            Storage::Bool(cell) if dimension == 0 => CellRef::Bool(cell),
            Storage::Choice(cell) if dimension == 0 => CellRef::Choice(cell),
            Storage::String(storage) if dimension == 0 => CellRef::Text(storage.cell()),
            Storage::Custom(cell) if dimension == 0 => CellRef::Text(cell),
            _ => return Err(out_of_range),
        };
        Ok(cell)
    }

    /// Per-time access is only allowed on kinds with a value.
    fn timed_cell(&self, dimension: usize) -> ParameterResult<CellRef<'_>> {
        match self.storage {
            Storage::PushButton | Storage::Group(_) => {
                Err(ParameterError::NotAnimatable(self.kind()))
            }
            _ => self.cell(dimension),
        }
    }

    fn mismatch(&self, expected: &'static str) -> ParameterError {
        ParameterError::TypeMismatch {
            kind: self.kind(),
            expected,
        }
    }

    // === Reads ===

    /// Value of one dimension at the clock's current time.
    ///
    /// File path strings resolve their frame pattern at the current frame.
    pub fn get(&self, dimension: usize) -> ParameterResult<Value> {
        self.get_at_time(dimension, self.clock.time())
    }

    /// Value of one dimension at `time`.
    ///
    /// Kinds that do not animate return their static value.
    pub fn get_at(&self, dimension: usize, time: Time) -> ParameterResult<Value> {
        self.timed_cell(dimension)?;
        self.get_at_time(dimension, time)
    }

    fn get_at_time(&self, dimension: usize, time: Time) -> ParameterResult<Value> {
        let value = self.cell(dimension)?.get_at(time);
        match (&self.storage, value) {
            (Storage::String(storage), Value::String(raw)) if storage.is_file_path() => {
                Ok(Value::String(pattern::resolve(&raw, frame_at(time))))
            }
            (_, value) => Ok(value),
        }
    }

    /// Every dimension at the current time.
    pub fn get_values(&self) -> ParameterResult<Vec<Value>> {
        self.get_values_at_time(self.clock.time())
    }

    /// Every dimension at `time`.
    pub fn get_values_at(&self, time: Time) -> ParameterResult<Vec<Value>> {
        self.timed_cell(0)?;
        self.get_values_at_time(time)
    }

    fn get_values_at_time(&self, time: Time) -> ParameterResult<Vec<Value>> {
        if !self.kind().has_value() {
            return Err(ParameterError::NoValue(self.kind()));
        }
        (0..self.dimensionality())
            .map(|d| self.get_at_time(d, time))
            .collect()
    }

    /// The stored string, before frame pattern resolution.
    pub fn raw_string(&self) -> Option<String> {
        match &self.storage {
            Storage::String(storage) => Some(storage.cell().get_at(self.clock.time())),
            Storage::Custom(cell) => Some(cell.get_at(self.clock.time())),
            _ => None,
        }
    }

    // === Writes ===

    fn prepare(&self, dimension: usize, value: &Value) -> ParameterResult<(Pending<'_>, Validation)> {
        match self.cell(dimension)? {
            CellRef::Int(cell) => {
                let v = value.as_int().ok_or_else(|| self.mismatch(i32::TYPE_NAME))?;
                let (stored, validation) = self.check_range(dimension, v as f64);
                let stored = stored.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
                Ok((Pending::Int(cell, stored), validation))
            }
            CellRef::Double(cell) => {
                let v = value.as_f64().ok_or_else(|| self.mismatch(f64::TYPE_NAME))?;
                if !v.is_finite() {
                    return Err(ParameterError::NonFinite);
                }
                let (stored, validation) = self.check_range(dimension, v);
                Ok((Pending::Double(cell, stored), validation))
            }
            CellRef::Bool(cell) => {
                let v = value.as_bool().ok_or_else(|| self.mismatch(bool::TYPE_NAME))?;
                Ok((Pending::Bool(cell, v), Validation::Accepted))
            }
            CellRef::Choice(cell) => {
                let index = value.as_index().ok_or_else(|| self.mismatch(usize::TYPE_NAME))?;
                let len = self.descriptor.entries().len();
                if index >= len {
                    return Err(ParameterError::IndexOutOfRange { index, len });
                }
                Ok((Pending::Choice(cell, index), Validation::Accepted))
            }
            CellRef::Text(cell) => {
                let v = value.as_str().ok_or_else(|| self.mismatch(String::TYPE_NAME))?;
                Ok((Pending::Text(cell, v.to_string()), Validation::Accepted))
            }
        }
    }

    fn check_range(&self, dimension: usize, value: f64) -> (f64, Validation) {
        let Some(bounds) = self.bounds.get(dimension) else {
            return (value, Validation::Accepted);
        };
        if bounds.contains(value) {
            return (value, Validation::Accepted);
        }
        match self.write_policy {
            WritePolicy::Accept => {
                log::warn!(
                    "Parameter '{}': {} outside [{}, {}]",
                    self.name(),
                    value,
                    bounds.minimum,
                    bounds.maximum
                );
                (
                    value,
                    Validation::OutOfRange {
                        minimum: bounds.minimum,
                        maximum: bounds.maximum,
                    },
                )
            }
            WritePolicy::Clamp => {
                let stored = bounds.clamp(value);
                (
                    stored,
                    Validation::Clamped {
                        requested: value,
                        stored,
                    },
                )
            }
        }
    }

    /// Write one dimension.
    ///
    /// Writes the static value, or a keyframe at the current time if the
    /// dimension is already keyed.
    pub fn set(&self, dimension: usize, value: Value) -> ParameterResult<Validation> {
        let (pending, validation) = self.prepare(dimension, &value)?;
        let keyed = pending.has_keyframes();
        let now = self.key_time_now(keyed)?;
        pending.commit(keyed.then_some(now))?;
        Ok(validation)
    }

    /// Insert or overwrite the keyframe of one dimension at `time`.
    pub fn set_at(&self, dimension: usize, time: Time, value: Value) -> ParameterResult<Validation> {
        self.check_keyable(time)?;
        let (pending, validation) = self.prepare(dimension, &value)?;
        pending.commit(Some(time))?;
        Ok(validation)
    }

    /// Current time for keyed writes. Fails before anything is stored if a
    /// keyed dimension would be written at a non-finite time.
    fn key_time_now(&self, keyed: bool) -> ParameterResult<Time> {
        let now = self.clock.time();
        if keyed && !now.is_finite() {
            return Err(ParameterError::NonFinite);
        }
        Ok(now)
    }

    fn check_keyable(&self, time: Time) -> ParameterResult<()> {
        if !self.animates() {
            return Err(ParameterError::NotAnimatable(self.kind()));
        }
        if !time.is_finite() {
            return Err(ParameterError::NonFinite);
        }
        Ok(())
    }

    /// Write every dimension at once. Nothing is stored unless all values
    /// are valid.
    pub fn set_values(&self, values: &[Value]) -> ParameterResult<Validation> {
        let pending = self.prepare_all(values)?;
        let now = self.key_time_now(pending.iter().any(|(p, _)| p.has_keyframes()))?;
        let mut validation = Validation::Accepted;
        for (p, v) in pending {
            let key_time = p.has_keyframes().then_some(now);
            p.commit(key_time)?;
            validation = validation.merge(v);
        }
        Ok(validation)
    }

    /// Key every dimension at `time`. Nothing is stored unless all values
    /// are valid.
    pub fn set_values_at(&self, time: Time, values: &[Value]) -> ParameterResult<Validation> {
        self.check_keyable(time)?;
        let pending = self.prepare_all(values)?;
        let mut validation = Validation::Accepted;
        for (p, v) in pending {
            p.commit(Some(time))?;
            validation = validation.merge(v);
        }
        Ok(validation)
    }

    fn prepare_all(&self, values: &[Value]) -> ParameterResult<Vec<(Pending<'_>, Validation)>> {
        if !self.kind().has_value() {
            return Err(ParameterError::NoValue(self.kind()));
        }
        let dims = self.dimensionality();
        if values.len() != dims {
            return Err(ParameterError::IndexOutOfRange {
                index: values.len(),
                len: dims,
            });
        }
        values
            .iter()
            .enumerate()
            .map(|(d, v)| self.prepare(d, v))
            .collect()
    }

    // === Keyframes ===

    /// True if any dimension carries a keyframe.
    pub fn has_keyframes(&self) -> bool {
        (0..self.dimensionality()).any(|d| self.cell(d).map_or(false, |c| c.has_keyframes()))
    }

    /// Keyframes of one dimension in time order.
    pub fn keyframes(&self, dimension: usize) -> ParameterResult<Vec<Keyframe<Value>>> {
        Ok(self.timed_cell(dimension)?.keyframes())
    }

    /// Keyframe times of one dimension in increasing order.
    pub fn keyframe_times(&self, dimension: usize) -> ParameterResult<Vec<Time>> {
        Ok(self.timed_cell(dimension)?.keyframe_times())
    }

    /// Remove the keyframe at exactly `time`. Returns `true` if one existed.
    pub fn remove_keyframe(&self, dimension: usize, time: Time) -> ParameterResult<bool> {
        Ok(self.timed_cell(dimension)?.remove_keyframe(time))
    }

    /// Drop the keyframes of every dimension.
    pub fn clear_keyframes(&self) {
        for d in 0..self.dimensionality() {
            if let Ok(cell) = self.cell(d) {
                cell.clear_keyframes();
            }
        }
    }

    /// Rate of change of one numeric dimension, in value per frame.
    pub fn derivative(&self, dimension: usize, time: Time) -> ParameterResult<f64> {
        match self.cell(dimension)? {
            CellRef::Int(cell) => Ok(cell.derivative(time)),
            CellRef::Double(cell) => Ok(cell.derivative(time)),
            _ => Err(self.mismatch("numeric")),
        }
    }

    /// Integral of one numeric dimension over `[t1, t2]`.
    pub fn integral(&self, dimension: usize, t1: Time, t2: Time) -> ParameterResult<f64> {
        if !(t1.is_finite() && t2.is_finite()) {
            return Err(ParameterError::NonFinite);
        }
        match self.cell(dimension)? {
            CellRef::Int(cell) => Ok(cell.integral(t1, t2)),
            CellRef::Double(cell) => Ok(cell.integral(t1, t2)),
            _ => Err(self.mismatch("numeric")),
        }
    }

    // === Flags ===

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Set by the host whenever the plugin's enable expression is re-evaluated.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// True if the parameter is hidden from the GUI.
    pub fn secret(&self) -> bool {
        self.secret.load(Ordering::Acquire)
    }

    pub fn set_secret(&self, secret: bool) {
        self.secret.store(secret, Ordering::Release);
    }

    // === Display ===

    fn formatter(&self, dimension: usize) -> Formatter {
        let decimals = self
            .bounds
            .get(dimension)
            .and_then(|b| b.decimals)
            .unwrap_or(self.default_decimals);
        Formatter::for_kind(self.kind(), decimals)
    }

    /// Current value of one dimension as display text.
    pub fn display(&self, dimension: usize) -> ParameterResult<String> {
        let value = self.get(dimension)?;
        Ok(self.formatter(dimension).format(&value, self.choice_entries()))
    }

    /// Parse display text into a value for one dimension. Does not write.
    pub fn parse(&self, dimension: usize, text: &str) -> Option<Value> {
        self.cell(dimension).ok()?;
        self.formatter(dimension).parse(text, self.choice_entries())
    }

    /// Current value of one numeric dimension as a slider position (0.0-1.0).
    pub fn get_normalized(&self, dimension: usize) -> ParameterResult<f64> {
        let bounds = self.bounds(dimension).ok_or_else(|| self.mismatch("numeric"))?;
        let value = self.get(dimension)?;
        let plain = value.as_f64().ok_or_else(|| self.mismatch("numeric"))?;
        Ok(bounds.normalize(plain))
    }

    /// Write one numeric dimension from a slider position (0.0-1.0).
    pub fn set_normalized(&self, dimension: usize, normalized: f64) -> ParameterResult<Validation> {
        if !normalized.is_finite() {
            return Err(ParameterError::NonFinite);
        }
        let bounds = self.bounds(dimension).ok_or_else(|| self.mismatch("numeric"))?;
        let plain = bounds.denormalize(normalized);
        let value = if self.kind().is_integer() {
            Value::Int(plain.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
        } else {
            Value::Double(plain)
        };
        self.set(dimension, value)
    }

    // === Choice ===

    /// Entry table of a choice parameter, empty for other kinds.
    pub fn choice_entries(&self) -> &[ChoiceEntry] {
        self.descriptor.entries()
    }

    /// Current choice as a typed enum.
    pub fn choice_value<C: ChoiceValue>(&self) -> ParameterResult<C> {
        match self.cell(0) {
            Ok(CellRef::Choice(cell)) => {
                let index = cell.get_at(self.clock.time());
                C::from_index(index).ok_or(ParameterError::IndexOutOfRange {
                    index,
                    len: C::COUNT,
                })
            }
            _ => Err(self.mismatch(usize::TYPE_NAME)),
        }
    }

    /// Select a choice by typed enum.
    pub fn set_choice_value<C: ChoiceValue>(&self, choice: C) -> ParameterResult<()> {
        self.set(0, Value::Choice(choice.to_index())).map(|_| ())
    }

    // === Strings ===

    pub fn string_mode(&self) -> Option<StringMode> {
        self.descriptor.string_mode()
    }

    /// True if this is an output file path.
    pub fn is_output_path(&self) -> bool {
        matches!(&self.storage, Storage::String(StringStorage::FilePathOut(_)))
    }

    /// File path resolved at `frame`. `None` for anything but file path strings.
    pub fn resolve_path(&self, frame: Frame) -> Option<String> {
        match &self.storage {
            Storage::String(storage) if storage.is_file_path() => {
                let raw = storage.cell().static_value();
                if pattern::is_sequence(&raw) {
                    Some(pattern::resolve(&raw, frame))
                } else {
                    Some(raw)
                }
            }
            _ => None,
        }
    }

    /// For file path strings, true if the pattern resolves to a non-empty
    /// path at the current frame. Always true for other kinds.
    pub fn is_valid(&self) -> bool {
        match self.resolve_path(self.clock.frame()) {
            Some(path) => !path.is_empty(),
            None => true,
        }
    }

    // === Groups ===

    /// Container this group renders its children into. `None` for non-groups.
    pub fn container(&self) -> Option<Container> {
        match &self.storage {
            Storage::Group(GroupStorage::Folder { .. }) => Some(Container::Folder(self.id)),
            Storage::Group(GroupStorage::Tab(tabs)) => tabs.upgrade().map(Container::Tab),
            _ => None,
        }
    }

    /// Ids of this group's children in declaration order.
    pub fn children(&self) -> Vec<ParameterId> {
        match &self.storage {
            Storage::Group(GroupStorage::Folder { children, .. }) => children.clone(),
            Storage::Group(GroupStorage::Tab(tabs)) => tabs
                .upgrade()
                .map(|t| t.children_of(self.id))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// True if this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.storage, Storage::Group(_))
    }

    /// Open state of a folder. Tabs count as open; other kinds as closed.
    pub fn is_open(&self) -> bool {
        match &self.storage {
            Storage::Group(GroupStorage::Folder { open, .. }) => open.load(Ordering::Acquire),
            Storage::Group(GroupStorage::Tab(_)) => true,
            _ => false,
        }
    }

    /// Open or close a folder. Returns `false` if this is not a folder.
    pub fn set_open(&self, is_open: bool) -> bool {
        match &self.storage {
            Storage::Group(GroupStorage::Folder { open, .. }) => {
                open.store(is_open, Ordering::Release);
                true
            }
            _ => false,
        }
    }

    /// Attach a child during store construction. Returns `false` if this is
    /// not a group.
    pub(crate) fn attach_child(&mut self, child: ParameterId) -> bool {
        match &mut self.storage {
            Storage::Group(GroupStorage::Folder { children, .. }) => {
                children.push(child);
                true
            }
            Storage::Group(GroupStorage::Tab(tabs)) => match tabs.upgrade() {
                Some(container) => container.attach(self.id, child),
                None => false,
            },
            _ => false,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: ParameterId) {
        self.parent = Some(parent);
    }

    // === Persistence ===

    /// Copy of every cell's static value and keyframes.
    pub fn snapshot(&self) -> ParameterSnapshot {
        let cells = (0..self.dimensionality())
            .filter_map(|d| self.cell(d).ok())
            .map(|cell| CellSnapshot {
                static_value: cell.static_value(),
                keyframes: cell.keyframes(),
            })
            .collect();
        ParameterSnapshot {
            name: self.name().to_string(),
            cells,
        }
    }

    /// Replace every cell's state from a snapshot.
    ///
    /// The snapshot is validated as a whole first: the cell count must match
    /// the dimensionality, values must fit the kind, keyframes are only
    /// accepted on animating parameters. On error nothing changes. Restored
    /// values are not checked against the bounds.
    pub fn restore(&self, snapshot: &ParameterSnapshot) -> ParameterResult<()> {
        let dims = self.dimensionality();
        if snapshot.cells.len() != dims {
            return Err(ParameterError::IndexOutOfRange {
                index: snapshot.cells.len(),
                len: dims,
            });
        }
        let animates = self.animates();
        if !animates && snapshot.cells.iter().any(|c| !c.keyframes.is_empty()) {
            return Err(ParameterError::NotAnimatable(self.kind()));
        }

        let entries = self.descriptor.entries().len();
        let mut pending = Vec::with_capacity(dims);
        for (d, snap) in snapshot.cells.iter().enumerate() {
            let restore = match self.cell(d)? {
                CellRef::Int(cell) => {
                    let (v, keys) = self.typed_cell(snap, |_: &i32| Ok(()))?;
                    PendingRestore::Int(cell, v, keys)
                }
                CellRef::Double(cell) => {
                    let (v, keys) = self.typed_cell(snap, |v: &f64| {
                        if v.is_finite() {
                            Ok(())
                        } else {
                            Err(ParameterError::NonFinite)
                        }
                    })?;
                    PendingRestore::Double(cell, v, keys)
                }
                CellRef::Bool(cell) => {
                    let (v, keys) = self.typed_cell(snap, |_: &bool| Ok(()))?;
                    PendingRestore::Bool(cell, v, keys)
                }
                CellRef::Choice(cell) => {
                    let (v, keys) = self.typed_cell(snap, |index: &usize| {
                        if *index < entries {
                            Ok(())
                        } else {
                            Err(ParameterError::IndexOutOfRange {
                                index: *index,
                                len: entries,
                            })
                        }
                    })?;
                    PendingRestore::Choice(cell, v, keys)
                }
                CellRef::Text(cell) => {
                    let (v, keys) = self.typed_cell(snap, |_: &String| Ok(()))?;
                    PendingRestore::Text(cell, v, keys)
                }
            };
            pending.push(restore);
        }

        for restore in pending {
            restore.commit()?;
        }
        Ok(())
    }

    fn typed_cell<T: CellValue>(
        &self,
        snap: &CellSnapshot,
        check: impl Fn(&T) -> ParameterResult<()>,
    ) -> ParameterResult<(T, Vec<Keyframe<T>>)> {
        let convert = |value: &Value| -> ParameterResult<T> {
            let v = T::from_value(value).ok_or_else(|| self.mismatch(T::TYPE_NAME))?;
            check(&v)?;
            Ok(v)
        };
        let value = convert(&snap.static_value)?;
        let keys = snap
            .keyframes
            .iter()
            .map(|k| {
                if !k.time.is_finite() {
                    return Err(ParameterError::NonFinite);
                }
                Ok(Keyframe::new(k.time, convert(&k.value)?))
            })
            .collect::<ParameterResult<Vec<_>>>()?;
        Ok((value, keys))
    }
}

/// Declared default of one dimension, falling back to `T::default()` when the
/// descriptor gives none or one of the wrong type.
fn declared_default<T: CellValue + Default>(descriptor: &ParameterDescriptor, dimension: usize) -> T {
    match descriptor.defaults().get(dimension) {
        Some(value) => T::from_value(value).unwrap_or_else(|| {
            log::warn!(
                "Parameter '{}': default {:?} is not a {} value",
                descriptor.name(),
                value,
                T::TYPE_NAME
            );
            T::default()
        }),
        None => {
            log::warn!(
                "Parameter '{}': no default for dimension {}",
                descriptor.name(),
                dimension
            );
            T::default()
        }
    }
}

/// Declared choice default, clamped into the entry table.
fn choice_default(descriptor: &ParameterDescriptor) -> usize {
    let index: usize = declared_default(descriptor, 0);
    let len = descriptor.entries().len();
    if len == 0 {
        log::warn!("Choice '{}' has no entries", descriptor.name());
        return 0;
    }
    if index >= len {
        log::warn!(
            "Choice '{}': default {} clamped to {}",
            descriptor.name(),
            index,
            len - 1
        );
        return len - 1;
    }
    index
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name())
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("enabled", &self.enabled())
            .field("secret", &self.secret())
            .field("parent", &self.parent)
            .finish()
    }
}
