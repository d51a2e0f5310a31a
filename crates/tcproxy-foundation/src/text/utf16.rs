//! UTF-16 index helpers.
//!
//! The remote proxy and the platform input framework both count text in
//! UTF-16 code units. Text is kept as a Rust `String`, so every index crossing
//! that boundary goes through these helpers. An index that lands inside a
//! surrogate pair snaps down to the start of the pair unless a helper says
//! otherwise.

/// Length of `text` in UTF-16 code units.
pub fn len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte offset for a UTF-16 index, clamped to the end of `text`.
pub fn byte_offset(text: &str, index: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > index {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Largest code point boundary at or below `index`, clamped to the text.
pub fn floor_boundary(text: &str, index: usize) -> usize {
    len(&text[..byte_offset(text, index)])
}

/// Smallest code point boundary at or above `index`, clamped to the text.
pub fn ceil_boundary(text: &str, index: usize) -> usize {
    let floor = floor_boundary(text, index);
    if floor >= index {
        floor
    } else {
        floor + code_point_after(text, floor)
    }
}

/// Slice between two UTF-16 indices. Reversed bounds yield an empty slice.
pub fn slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end);
    if start <= end {
        &text[start..end]
    } else {
        ""
    }
}

/// Code units of the code point that ends at `index`, or 0 at the start.
pub fn code_point_before(text: &str, index: usize) -> usize {
    text[..byte_offset(text, index)]
        .chars()
        .next_back()
        .map_or(0, char::len_utf16)
}

/// Code units of the code point that starts at `index`, or 0 at the end.
pub fn code_point_after(text: &str, index: usize) -> usize {
    text[byte_offset(text, index)..]
        .chars()
        .next()
        .map_or(0, char::len_utf16)
}

/// Code units covered by up to `count` code points ending at `index`.
pub fn units_before(text: &str, index: usize, count: usize) -> usize {
    text[..byte_offset(text, index)]
        .chars()
        .rev()
        .take(count)
        .map(char::len_utf16)
        .sum()
}

/// Code units covered by up to `count` code points starting at `index`.
pub fn units_after(text: &str, index: usize, count: usize) -> usize {
    text[byte_offset(text, index)..]
        .chars()
        .take(count)
        .map(char::len_utf16)
        .sum()
}
