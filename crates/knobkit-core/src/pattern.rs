//! Frame-number substitution in file path patterns.
//!
//! File path strings may name an image sequence with `#` placeholders. Each
//! maximal run of N `#` characters is replaced by the frame number,
//! zero-padded to at least N digits:
//!
//! | pattern | frame | result |
//! |---|---|---|
//! | `render_#.png` | 12 | `render_12.png` |
//! | `render_###.png` | 12 | `render_012.png` |
//! | `plate.exr` | 12 | `plate.exr` |
//!
//! A run is one placeholder, not one per character: `###` at frame 12 gives
//! `012`, never `121212` as a per-`#` replacement would.
//!
//! Resolution is a pure string computation; nothing touches the disk.

use crate::types::Frame;

/// Placeholder character for the frame number.
pub const FRAME_PLACEHOLDER: char = '#';

/// True if `pattern` contains at least one frame placeholder.
pub fn is_sequence(pattern: &str) -> bool {
    pattern.contains(FRAME_PLACEHOLDER)
}

/// Substitute `frame` into every placeholder run of `pattern`.
pub fn resolve(pattern: &str, frame: Frame) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut run = 0usize;

    for c in pattern.chars() {
        if c == FRAME_PLACEHOLDER {
            run += 1;
            continue;
        }
        if run > 0 {
            push_frame(&mut out, frame, run);
            run = 0;
        }
        out.push(c);
    }
    if run > 0 {
        push_frame(&mut out, frame, run);
    }
    out
}

fn push_frame(out: &mut String, frame: Frame, width: usize) {
    if frame < 0 {
        out.push('-');
        out.push_str(&format!("{:0width$}", frame.unsigned_abs(), width = width));
    } else {
        out.push_str(&format!("{:0width$}", frame, width = width));
    }
}
