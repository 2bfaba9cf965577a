//! Immutable parameter declarations.
//!
//! A [`ParameterDescriptor`] is what a plugin declares for one parameter:
//! its kind, per-dimension bounds, defaults, label, choice entries, string
//! mode and grouping. The host reads descriptors from the plugin's property
//! bag once, when an effect instance is created, and never changes them.
//!
//! # Example
//!
//! ```ignore
//! use knobkit_core::{Bounds, ParameterDescriptor, StringMode};
//!
//! let descriptors = vec![
//!     ParameterDescriptor::group("controls").with_tab().with_label("Controls"),
//!     ParameterDescriptor::double("size", 5.0, Bounds::new(0.0, 100.0).with_display(0.0, 20.0))
//!         .with_label("Size")
//!         .with_parent("controls"),
//!     ParameterDescriptor::rgba("tint", [1.0, 1.0, 1.0, 1.0]).with_parent("controls"),
//!     ParameterDescriptor::string("output", StringMode::OutputFilePath, "render_#.png"),
//! ];
//! ```

use std::fmt;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::choice::ChoiceValue;
use crate::types::MAX_DIMENSIONS;
use crate::value::{Interpolator, Value};

/// String storage mode, selected once per string parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMode {
    /// Input file path, possibly a `#` frame pattern.
    FilePath,
    /// Output file path pattern.
    OutputFilePath,
    /// One line of text.
    SingleLine,
    /// Free text spanning several lines.
    MultiLine,
    /// Read-only single-line text.
    Label,
}

/// Closed set of parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    PushButton,
    Int,
    Double,
    Bool,
    Choice,
    ColorRGB,
    ColorRGBA,
    Vec2Double,
    Vec2Int,
    Vec3Double,
    Vec3Int,
    Group,
    String(StringMode),
    Custom,
}

const _: () = assert!(ParameterKind::ColorRGBA.dimensionality() == MAX_DIMENSIONS);

impl ParameterKind {
    /// Number of value cells an instance of this kind owns, at most
    /// [`MAX_DIMENSIONS`].
    pub const fn dimensionality(self) -> usize {
        match self {
            Self::PushButton | Self::Group => 0,
            Self::Int
            | Self::Double
            | Self::Bool
            | Self::Choice
            | Self::String(_)
            | Self::Custom => 1,
            Self::Vec2Double | Self::Vec2Int => 2,
            Self::ColorRGB | Self::Vec3Double | Self::Vec3Int => 3,
            Self::ColorRGBA => 4,
        }
    }

    /// Every kind, for iteration. String kinds use [`StringMode::SingleLine`].
    pub const ALL: [ParameterKind; 14] = [
        Self::PushButton,
        Self::Int,
        Self::Double,
        Self::Bool,
        Self::Choice,
        Self::ColorRGB,
        Self::ColorRGBA,
        Self::Vec2Double,
        Self::Vec2Int,
        Self::Vec3Double,
        Self::Vec3Int,
        Self::Group,
        Self::String(StringMode::SingleLine),
        Self::Custom,
    ];

    /// True for kinds that hold at least one value.
    pub const fn has_value(self) -> bool {
        self.dimensionality() > 0
    }

    /// True for kinds whose values may carry keyframes.
    pub const fn is_animatable(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Double
                | Self::Bool
                | Self::ColorRGB
                | Self::ColorRGBA
                | Self::Vec2Double
                | Self::Vec2Int
                | Self::Vec3Double
                | Self::Vec3Int
                | Self::Custom
        )
    }

    /// True for kinds stored as `i32` cells.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::Vec2Int | Self::Vec3Int)
    }

    /// True for kinds stored as `f64` cells.
    pub const fn is_double(self) -> bool {
        matches!(
            self,
            Self::Double | Self::ColorRGB | Self::ColorRGBA | Self::Vec2Double | Self::Vec3Double
        )
    }

    /// The kind's default for one dimension when the descriptor declares none.
    pub fn default_value(self) -> Option<Value> {
        match self {
            Self::PushButton | Self::Group => None,
            Self::Int | Self::Vec2Int | Self::Vec3Int => Some(Value::Int(0)),
            Self::Double
            | Self::ColorRGB
            | Self::ColorRGBA
            | Self::Vec2Double
            | Self::Vec3Double => Some(Value::Double(0.0)),
            Self::Bool => Some(Value::Bool(false)),
            Self::Choice => Some(Value::Choice(0)),
            Self::String(_) | Self::Custom => Some(Value::String(String::new())),
        }
    }

    /// The kind's default bounds for one dimension.
    pub fn default_bounds(self) -> Bounds {
        match self {
            Self::Int | Self::Vec2Int | Self::Vec3Int => Bounds::for_int(),
            Self::ColorRGB | Self::ColorRGBA => Bounds::color(),
            _ => Bounds::unbounded(),
        }
    }
}

/// One entry of a choice parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceEntry {
    /// Text shown in the dropdown.
    pub symbol: String,
    /// Longer description shown as a tooltip.
    pub help: String,
}

impl ChoiceEntry {
    pub fn new(symbol: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            help: help.into(),
        }
    }
}

impl From<&str> for ChoiceEntry {
    fn from(symbol: &str) -> Self {
        Self::new(symbol, "")
    }
}

impl From<(&str, &str)> for ChoiceEntry {
    fn from((symbol, help): (&str, &str)) -> Self {
        Self::new(symbol, help)
    }
}

/// Immutable declaration of one parameter.
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: String,
    label: String,
    hint: String,
    kind: ParameterKind,
    bounds: Vec<Bounds>,
    defaults: Vec<Value>,
    entries: Vec<ChoiceEntry>,
    is_tab: bool,
    open: bool,
    parent: Option<String>,
    animates: bool,
    interpolator: Option<Arc<dyn Interpolator<String>>>,
}

impl ParameterDescriptor {
    /// Create a descriptor with the kind's default bounds and values.
    ///
    /// The label defaults to the name.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        let name = name.into();
        let dims = kind.dimensionality();
        Self {
            label: name.clone(),
            name,
            hint: String::new(),
            kind,
            bounds: if kind.is_integer() || kind.is_double() {
                vec![kind.default_bounds(); dims]
            } else {
                Vec::new()
            },
            defaults: kind.default_value().map(|v| vec![v; dims]).unwrap_or_default(),
            entries: Vec::new(),
            is_tab: false,
            open: true,
            parent: None,
            animates: kind.is_animatable() && kind != ParameterKind::Custom,
            interpolator: None,
        }
    }

    // === Per-kind constructors ===

    /// Stateless button.
    pub fn push_button(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PushButton)
    }

    /// Integer with the given static range.
    pub fn int(name: impl Into<String>, default: i32, bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Int)
            .with_bounds(bounds)
            .with_defaults(vec![Value::Int(default)])
    }

    /// Double with the given bounds.
    pub fn double(name: impl Into<String>, default: f64, bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Double)
            .with_bounds(bounds)
            .with_defaults(vec![Value::Double(default)])
    }

    /// Toggle.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, ParameterKind::Bool).with_defaults(vec![Value::Bool(default)])
    }

    /// Choice over the given entries. Out-of-range defaults are clamped when
    /// the parameter is instantiated.
    pub fn choice<I, E>(name: impl Into<String>, entries: I, default: usize) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ChoiceEntry>,
    {
        Self::new(name, ParameterKind::Choice)
            .with_entries(entries)
            .with_defaults(vec![Value::Choice(default)])
    }

    /// Choice whose entries and default come from a [`ChoiceValue`] enum.
    pub fn choice_from<C: ChoiceValue>(name: impl Into<String>) -> Self {
        Self::choice(name, C::entries().iter().copied(), C::DEFAULT_INDEX)
    }

    /// RGB color.
    pub fn rgb(name: impl Into<String>, default: [f64; 3]) -> Self {
        Self::new(name, ParameterKind::ColorRGB)
            .with_defaults(default.iter().map(|v| Value::Double(*v)).collect())
    }

    /// RGBA color.
    pub fn rgba(name: impl Into<String>, default: [f64; 4]) -> Self {
        Self::new(name, ParameterKind::ColorRGBA)
            .with_defaults(default.iter().map(|v| Value::Double(*v)).collect())
    }

    /// 2D double vector, same bounds on both axes.
    pub fn vec2_double(name: impl Into<String>, default: [f64; 2], bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Vec2Double)
            .with_bounds(bounds)
            .with_defaults(default.iter().map(|v| Value::Double(*v)).collect())
    }

    /// 2D integer vector, same bounds on both axes.
    pub fn vec2_int(name: impl Into<String>, default: [i32; 2], bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Vec2Int)
            .with_bounds(bounds)
            .with_defaults(default.iter().map(|v| Value::Int(*v)).collect())
    }

    /// 3D double vector, same bounds on every axis.
    pub fn vec3_double(name: impl Into<String>, default: [f64; 3], bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Vec3Double)
            .with_bounds(bounds)
            .with_defaults(default.iter().map(|v| Value::Double(*v)).collect())
    }

    /// 3D integer vector, same bounds on every axis.
    pub fn vec3_int(name: impl Into<String>, default: [i32; 3], bounds: Bounds) -> Self {
        Self::new(name, ParameterKind::Vec3Int)
            .with_bounds(bounds)
            .with_defaults(default.iter().map(|v| Value::Int(*v)).collect())
    }

    /// Folder of parameters. Call [`with_tab`](Self::with_tab) to make it a tab.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Group)
    }

    /// String in the given mode.
    pub fn string(name: impl Into<String>, mode: StringMode, default: &str) -> Self {
        Self::new(name, ParameterKind::String(mode))
            .with_defaults(vec![Value::String(default.to_string())])
    }

    /// Opaque plugin-defined string payload. Does not animate unless
    /// [`with_interpolator`](Self::with_interpolator) or
    /// [`with_animates`](Self::with_animates) says so.
    pub fn custom(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, ParameterKind::Custom)
            .with_defaults(vec![Value::String(default.to_string())])
    }

    // === Builder methods ===

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the tooltip text.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Use the same bounds on every dimension. Ignored by non-numeric kinds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        for b in &mut self.bounds {
            *b = bounds;
        }
        self
    }

    /// Set the bounds of a single dimension. Out-of-range dimensions are ignored.
    pub fn with_dimension_bounds(mut self, dimension: usize, bounds: Bounds) -> Self {
        if let Some(b) = self.bounds.get_mut(dimension) {
            *b = bounds;
        }
        self
    }

    /// Set the default value of each dimension, in dimension order.
    pub fn with_defaults(mut self, defaults: Vec<Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the choice entries.
    pub fn with_entries<I, E>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ChoiceEntry>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        self
    }

    /// Make a group contribute a page to the effect's shared tab container.
    pub fn with_tab(mut self) -> Self {
        self.is_tab = true;
        self
    }

    /// Initial open state of a folder group.
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Name of the group this parameter is declared in.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Enable or disable keyframes. Has no effect on kinds that never animate.
    pub fn with_animates(mut self, animates: bool) -> Self {
        self.animates = animates;
        self
    }

    /// Interpolation strategy for a custom parameter's keyframes.
    ///
    /// Also enables animation.
    pub fn with_interpolator(mut self, interpolator: Arc<dyn Interpolator<String>>) -> Self {
        self.interpolator = Some(interpolator);
        self.animates = true;
        self
    }

    // === Accessors ===

    /// Identity of the parameter, unique within one effect.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn dimensionality(&self) -> usize {
        self.kind.dimensionality()
    }

    /// Declared bounds, one per dimension for numeric kinds, empty otherwise.
    pub fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    /// Declared defaults as given. The parameter repairs missing or
    /// mistyped entries when instantiated.
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    pub fn entries(&self) -> &[ChoiceEntry] {
        &self.entries
    }

    /// String mode, for string kinds.
    pub fn string_mode(&self) -> Option<StringMode> {
        match self.kind {
            ParameterKind::String(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn is_tab(&self) -> bool {
        self.is_tab
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// True if values of this parameter may carry keyframes.
    pub fn animates(&self) -> bool {
        self.kind.is_animatable() && self.animates
    }

    pub fn interpolator(&self) -> Option<&Arc<dyn Interpolator<String>>> {
        self.interpolator.as_ref()
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("bounds", &self.bounds)
            .field("defaults", &self.defaults)
            .field("entries", &self.entries)
            .field("is_tab", &self.is_tab)
            .field("parent", &self.parent)
            .field("animates", &self.animates())
            .field("custom_interpolator", &self.interpolator.is_some())
            .finish()
    }
}
