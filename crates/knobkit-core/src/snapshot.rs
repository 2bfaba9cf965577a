//! Plain-data copies of parameter state for project persistence.
//!
//! The store defines no file format. Hosts take a
//! [`ParameterStore::snapshot`](crate::ParameterStore::snapshot), write it
//! out however their project format wants (with the `serde` feature the
//! types below derive `Serialize`/`Deserialize`), and later hand it back to
//! [`ParameterStore::restore`](crate::ParameterStore::restore).

use crate::value::{Keyframe, Value};

/// State of one value cell: its static value and every keyframe in time order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSnapshot {
    pub static_value: Value,
    #[cfg_attr(feature = "serde", serde(default))]
    pub keyframes: Vec<Keyframe<Value>>,
}

impl CellSnapshot {
    /// Snapshot of an unkeyed cell.
    pub fn constant(value: Value) -> Self {
        Self {
            static_value: value,
            keyframes: Vec::new(),
        }
    }
}

/// State of one parameter, addressed by name.
///
/// Value-less kinds (push buttons, groups) have no cells.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSnapshot {
    pub name: String,
    pub cells: Vec<CellSnapshot>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let snapshot = ParameterSnapshot {
            name: "opacity".to_string(),
            cells: vec![CellSnapshot {
                static_value: Value::Double(1.0),
                keyframes: vec![Keyframe::new(0.0, Value::Double(0.0))],
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ParameterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        // Keyframes may be omitted.
        let json = r#"{"name":"mix","cells":[{"static_value":{"Double":0.5}}]}"#;
        let parsed: ParameterSnapshot = serde_json::from_str(json).unwrap();
        assert!(parsed.cells[0].keyframes.is_empty());
    }
}
