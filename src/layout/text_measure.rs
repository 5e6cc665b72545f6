//! Text Measurement
//!
//! Utilities for measuring and cutting rendered leaf text in terminal cells.
//!
//! Every code point counts as one column. Wide glyphs (CJK, most emoji) are
//! knowingly under-counted; see DESIGN.md for why this approximation stays.
//!
//! Newlines are ASCII, so line boundaries are located on bytes while widths
//! are counted on `char`s.

/// Count the line segments in `text`.
///
/// This is the number of newlines, plus one more if the text is non-empty
/// and does not end in a newline.
pub fn count_lines(text: &str) -> usize {
    let newlines = text.bytes().filter(|&b| b == b'\n').count();
    if !text.is_empty() && !text.ends_with('\n') {
        newlines + 1
    } else {
        newlines
    }
}

/// Width of the longest line segment in `text`, in code points.
///
/// An empty text measures 0; a text without newlines measures its full length.
pub fn longest_line(text: &str) -> usize {
    text.split('\n')
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

/// Truncate `text` to at most `height` line segments.
///
/// Text that already fits is returned unchanged, including any trailing
/// newline. Otherwise the cut is made just before the `height`-th newline.
/// A height of zero yields the empty string.
pub fn truncate_text_height(text: &str, height: usize) -> &str {
    if height == 0 {
        return "";
    }

    if count_lines(text) <= height {
        return text;
    }

    // More lines than `height` means at least `height` newlines exist.
    match text.match_indices('\n').nth(height - 1) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Clamp every line segment of `text` to at most `width` code points.
///
/// Line boundaries and a trailing newline are preserved. A width of zero
/// yields the empty string.
pub fn clamp_text_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let mut result = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
        }

        match line.char_indices().nth(width) {
            Some((cut, _)) => result.push_str(&line[..cut]),
            None => result.push_str(line),
        }
    }

    result
}
