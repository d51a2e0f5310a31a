//! Snapshot of an editable text field as exchanged with the remote proxy.

use super::range::TextRange;
use super::utf16;

/// Text, selection and in-progress composition of one text field.
///
/// # Invariants
///
/// - `selection` and `composition` lie within `[0, len()]` (UTF-16 units)
/// - `composition` is never an empty range; "no composition" is `None`
/// - `selection_left` only matters for a non-empty selection
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash)]
pub struct TextInputState {
    pub text: String,
    pub selection: TextRange,
    /// Caret sits on the left edge of the selection.
    pub selection_left: bool,
    pub composition: Option<TextRange>,
}

impl TextInputState {
    /// Builds a state, clamping both ranges into the text.
    pub fn new(
        text: impl Into<String>,
        selection: TextRange,
        composition: Option<TextRange>,
    ) -> Self {
        let text = text.into();
        let len = utf16::len(&text);
        Self {
            selection: selection.coerce_in(len),
            selection_left: false,
            composition: normalize_composition(composition, len),
            text,
        }
    }

    /// Text with the caret at its end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = utf16::len(&text);
        Self::new(text, TextRange::cursor(len), None)
    }

    /// Re-establishes the invariants on a state whose fields were filled in
    /// directly, such as one received from the remote. Ranges are clamped
    /// into the text and an empty composition becomes `None`.
    pub fn normalized(self) -> Self {
        let len = utf16::len(&self.text);
        let selection = self.selection.coerce_in(len);
        Self {
            selection_left: self.selection_left && !selection.is_empty(),
            composition: normalize_composition(self.composition, len),
            selection,
            text: self.text,
        }
    }

    pub fn with_selection_left(mut self, selection_left: bool) -> Self {
        self.selection_left = selection_left;
        self
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        utf16::len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn selection_text(&self) -> &str {
        utf16::slice(&self.text, self.selection.start, self.selection.end())
    }

    /// Same as [`Self::selection_text`] but `None` for a bare caret.
    pub fn selected_text(&self) -> Option<&str> {
        if self.selection.is_empty() {
            None
        } else {
            Some(self.selection_text())
        }
    }

    pub fn composition_text(&self) -> Option<&str> {
        self.composition
            .map(|range| utf16::slice(&self.text, range.start, range.end()))
    }

    /// Up to `n` code units preceding the selection.
    pub fn text_before_cursor(&self, n: usize) -> &str {
        let end = self.selection.start;
        utf16::slice(&self.text, end.saturating_sub(n), end)
    }

    /// Up to `n` code units following the selection.
    pub fn text_after_cursor(&self, n: usize) -> &str {
        let start = self.selection.end();
        let end = start.saturating_add(n).min(self.len());
        utf16::slice(&self.text, start, end)
    }

    /// Offset used for capitalization queries: the edge the caret sits on.
    pub fn caps_offset(&self) -> usize {
        if self.selection_left {
            self.selection.start
        } else {
            self.selection.end()
        }
    }
}

pub(crate) fn normalize_composition(
    composition: Option<TextRange>,
    len: usize,
) -> Option<TextRange> {
    composition
        .map(|range| range.coerce_in(len))
        .filter(|range| !range.is_empty())
}
