//! Pure edit operations on [`TextInputState`].
//!
//! Every operation takes the current state by reference and returns the next
//! one. Nothing here fails: out-of-range offsets are clamped into the text.

use super::range::TextRange;
use super::state::{normalize_composition, TextInputState};
use super::utf16;

/// Replaces the UTF-16 `range` of `text` with `insert`.
fn splice(text: &str, range: TextRange, insert: &str) -> String {
    let start = utf16::byte_offset(text, range.start);
    let end = utf16::byte_offset(text, range.end()).max(start);
    let mut out = String::with_capacity(text.len() - (end - start) + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    out
}

/// Caret position after inserting `inserted` units at `region_start`.
///
/// A positive hint counts from the end of the insertion (1 = right after it);
/// zero or negative hints count from the start of the replaced region.
fn cursor_after_insert(region_start: usize, inserted: usize, hint: i32, len: usize) -> usize {
    let start = region_start as i64;
    let hint = i64::from(hint);
    let target = if hint > 0 {
        start + inserted as i64 + hint - 1
    } else {
        start - hint
    };
    target.clamp(0, len as i64) as usize
}

impl TextInputState {
    /// The range new text replaces: the composition if any, else the selection.
    fn replace_target(&self) -> TextRange {
        self.composition.unwrap_or(self.selection)
    }

    /// Removes `removed` and collapses the caret to its start.
    fn remove_range(&self, removed: TextRange) -> TextInputState {
        if removed.is_empty() {
            return self.clone();
        }
        let text = splice(&self.text, removed, "");
        let len = utf16::len(&text);
        TextInputState {
            selection: TextRange::cursor(removed.start).coerce_in(len),
            selection_left: false,
            composition: normalize_composition(self.composition.map(|c| c - removed), len),
            text,
        }
    }

    /// Replaces the composition (or the selection) with `text` and drops the
    /// composition.
    pub fn commit_text(&self, text: &str, cursor_hint: i32) -> TextInputState {
        let region = self.replace_target();
        let new_text = splice(&self.text, region, text);
        let len = utf16::len(&new_text);
        let cursor = cursor_after_insert(region.start, utf16::len(text), cursor_hint, len);
        TextInputState {
            text: new_text,
            selection: TextRange::cursor(cursor),
            selection_left: false,
            composition: None,
        }
    }

    /// Like [`Self::commit_text`] but the inserted text becomes the new
    /// composition.
    pub fn set_composing_text(&self, text: &str, cursor_hint: i32) -> TextInputState {
        let region = self.replace_target();
        let new_text = splice(&self.text, region, text);
        let len = utf16::len(&new_text);
        let inserted = utf16::len(text);
        let cursor = cursor_after_insert(region.start, inserted, cursor_hint, len);
        TextInputState {
            text: new_text,
            selection: TextRange::cursor(cursor),
            selection_left: false,
            composition: normalize_composition(Some(TextRange::new(region.start, inserted)), len),
        }
    }

    /// Marks `[start, end)` as the composition without touching the text.
    pub fn set_composing_region(&self, start: usize, end: usize) -> TextInputState {
        TextInputState {
            composition: normalize_composition(Some(TextRange::from_bounds(start, end)), self.len()),
            ..self.clone()
        }
    }

    pub fn finish_composing_text(&self) -> TextInputState {
        TextInputState {
            composition: None,
            ..self.clone()
        }
    }

    /// Selects between two offsets. `start > end` puts the caret on the left.
    pub fn set_selection(&self, start: usize, end: usize) -> TextInputState {
        let selection = TextRange::from_bounds(start, end).coerce_in(self.len());
        TextInputState {
            selection,
            selection_left: start > end && !selection.is_empty(),
            ..self.clone()
        }
    }

    pub fn select_all(&self) -> TextInputState {
        TextInputState {
            text: self.text.clone(),
            selection: TextRange::new(0, self.len()),
            selection_left: false,
            composition: None,
        }
    }

    /// Deletes up to `before` units preceding the selection and up to `after`
    /// units following it. The selected text itself survives.
    pub fn delete_surrounding_text(&self, before: usize, after: usize) -> TextInputState {
        let len = self.len();
        let selection = self.selection;
        let before = before.min(selection.start);
        let after = after.min(len.saturating_sub(selection.end()));
        let text = &self.text;
        // Edges round toward the selection: a pair straddling either one stays.
        let left_start =
            utf16::ceil_boundary(text, selection.start - before).min(selection.start);
        let right_end = utf16::floor_boundary(text, selection.end() + after);
        let removed_left = TextRange::new(left_start, selection.start - left_start);
        let removed_right = TextRange::new(
            selection.end(),
            right_end.saturating_sub(selection.end()),
        );

        let mut new_text = String::with_capacity(text.len());
        new_text.push_str(utf16::slice(text, 0, removed_left.start));
        new_text.push_str(utf16::slice(text, selection.start, selection.end()));
        new_text.push_str(utf16::slice(text, removed_right.end(), len));
        let new_len = utf16::len(&new_text);

        // Right first: its offsets are only valid before the left removal.
        let composition = self.composition.map(|c| c - removed_right - removed_left);
        TextInputState {
            selection: TextRange::new(removed_left.start, selection.length).coerce_in(new_len),
            selection_left: false,
            composition: normalize_composition(composition, new_len),
            text: new_text,
        }
    }

    /// [`Self::delete_surrounding_text`] with counts in code points. A
    /// surrogate pair counts once and is removed whole.
    pub fn delete_surrounding_text_in_code_points(
        &self,
        before: usize,
        after: usize,
    ) -> TextInputState {
        let before_units = utf16::units_before(&self.text, self.selection.start, before);
        let after_units = utf16::units_after(&self.text, self.selection.end(), after);
        self.delete_surrounding_text(before_units, after_units)
    }

    /// Removes the selection. Returns the next state and the removed text.
    pub fn cut_selection(&self) -> (TextInputState, String) {
        let cut = self.selection_text().to_owned();
        (self.remove_range(self.selection), cut)
    }

    pub fn arrow_left(&self) -> TextInputState {
        let selection = self.selection;
        let caret = if selection.is_empty() {
            selection.start - utf16::code_point_before(&self.text, selection.start)
        } else {
            selection.start
        };
        self.move_caret(caret)
    }

    pub fn arrow_right(&self) -> TextInputState {
        let selection = self.selection;
        let caret = if selection.is_empty() {
            selection.end() + utf16::code_point_after(&self.text, selection.end())
        } else {
            selection.end()
        };
        self.move_caret(caret)
    }

    /// Extends the left edge leftwards, or retracts the right edge when the
    /// caret sits on the right of a selection.
    pub fn shift_left(&self) -> TextInputState {
        let selection = self.selection;
        if selection.is_empty() || self.selection_left {
            let start = selection.start - utf16::code_point_before(&self.text, selection.start);
            self.with_edges(start, selection.end(), true)
        } else {
            let end = selection.end() - utf16::code_point_before(&self.text, selection.end());
            self.with_edges(selection.start, end, false)
        }
    }

    /// Mirror image of [`Self::shift_left`].
    pub fn shift_right(&self) -> TextInputState {
        let selection = self.selection;
        if selection.is_empty() || !self.selection_left {
            let end = selection.end() + utf16::code_point_after(&self.text, selection.end());
            self.with_edges(selection.start, end, false)
        } else {
            let start = selection.start + utf16::code_point_after(&self.text, selection.start);
            self.with_edges(start, selection.end(), true)
        }
    }

    pub fn backspace(&self) -> TextInputState {
        let selection = self.selection;
        let removed = if selection.is_empty() {
            let step = utf16::code_point_before(&self.text, selection.start);
            TextRange::new(selection.start - step, step)
        } else {
            selection
        };
        self.remove_range(removed)
    }

    pub fn forward_delete(&self) -> TextInputState {
        let selection = self.selection;
        let removed = if selection.is_empty() {
            TextRange::new(
                selection.end(),
                utf16::code_point_after(&self.text, selection.end()),
            )
        } else {
            selection
        };
        self.remove_range(removed)
    }

    fn move_caret(&self, caret: usize) -> TextInputState {
        TextInputState {
            selection: TextRange::cursor(caret),
            selection_left: false,
            ..self.clone()
        }
    }

    fn with_edges(&self, start: usize, end: usize, caret_left: bool) -> TextInputState {
        let selection = TextRange::from_bounds(start, end);
        TextInputState {
            selection,
            selection_left: caret_left && !selection.is_empty(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "tests/edit_tests.rs"]
mod tests;
