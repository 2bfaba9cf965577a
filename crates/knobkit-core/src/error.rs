//! Error types for the parameter store.

use std::fmt;

use crate::descriptor::ParameterKind;
use crate::types::ParameterId;

/// Errors returned by parameter and store operations.
///
/// Every error is local and recoverable. A write that fails leaves the
/// previous value in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// No parameter with this name exists in the store.
    NotFound(String),

    /// A choice index or dimension index outside `0..len`.
    IndexOutOfRange { index: usize, len: usize },

    /// Per-time access on a kind or mode that forbids it.
    NotAnimatable(ParameterKind),

    /// Bounds were internally inconsistent and have been clamped.
    ///
    /// Only recorded and logged during construction; instantiation never
    /// fails because of it.
    MalformedBounds(String),

    /// The value variant does not fit the parameter kind.
    TypeMismatch {
        kind: ParameterKind,
        expected: &'static str,
    },

    /// Value access on a kind that holds no value (push buttons, groups).
    NoValue(ParameterKind),

    /// NaN or infinite numeric value or keyframe time.
    NonFinite,

    /// A descriptor has an empty name.
    EmptyName,

    /// Two descriptors of one effect share a name.
    DuplicateName(String),

    /// Two distinct names hash to the same parameter id.
    IdCollision {
        first: String,
        second: String,
        id: ParameterId,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Parameter not found: {}", name),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range (len {})", index, len)
            }
            Self::NotAnimatable(kind) => write!(f, "{:?} parameter cannot be animated", kind),
            Self::MalformedBounds(msg) => write!(f, "Malformed bounds: {}", msg),
            Self::TypeMismatch { kind, expected } => {
                write!(f, "{:?} parameter expects a {} value", kind, expected)
            }
            Self::NoValue(kind) => write!(f, "{:?} parameter holds no value", kind),
            Self::NonFinite => write!(f, "Value is not finite"),
            Self::EmptyName => write!(f, "Parameter name is empty"),
            Self::DuplicateName(name) => write!(f, "Duplicate parameter name: {}", name),
            Self::IdCollision { first, second, id } => write!(
                f,
                "Parameter names '{}' and '{}' share id {:#010x}",
                first, second, id
            ),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Result type for parameter operations.
pub type ParameterResult<T> = Result<T, ParameterError>;
