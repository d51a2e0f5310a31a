//! Caret and editor geometry reported to the input method.

use tcproxy_foundation::{IntRect, TextInputState, TextRange};

/// Where the caret is drawn, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertionMarker {
    pub horizontal: f32,
    pub top: f32,
    pub baseline: f32,
    pub bottom: f32,
    pub visible: bool,
}

impl InsertionMarker {
    /// Marker for a caret rectangle. The baseline sits on the bottom edge.
    pub fn from_caret(rect: IntRect) -> Self {
        Self {
            horizontal: rect.left as f32,
            top: rect.top as f32,
            baseline: rect.bottom as f32,
            bottom: rect.bottom as f32,
            visible: true,
        }
    }
}

/// Snapshot of the selection, composition and on-screen geometry.
///
/// Parts that are unknown are `None` and left out of what the platform sees.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorAnchorInfo {
    pub selection: TextRange,
    /// Composition start and its text.
    pub composing: Option<(usize, String)>,
    pub insertion_marker: Option<InsertionMarker>,
    pub editor_bounds: Option<IntRect>,
}

impl CursorAnchorInfo {
    pub fn new(state: &TextInputState, caret: Option<IntRect>, area: Option<IntRect>) -> Self {
        let composing = state.composition.zip(state.composition_text()).map(
            |(range, text)| (range.start, text.to_owned()),
        );
        Self {
            selection: state.selection,
            composing,
            insertion_marker: caret.map(InsertionMarker::from_caret),
            editor_bounds: area,
        }
    }
}
