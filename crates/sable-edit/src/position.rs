//! Position arithmetic over raw text.

use text_size::TextSize;

/// The smallest index at or after `pos` whose character is not whitespace,
/// clamped to the end of the text.
pub fn next_non_whitespace_pos(text: &str, pos: TextSize) -> TextSize {
    let bytes = text.as_bytes();
    let mut index = usize::from(pos);
    while index < bytes.len() && matches!(bytes[index], b' ' | b'\t' | b'\n' | b'\r') {
        index += 1;
    }
    TextSize::new(index as u32)
}

/// The largest index before `pos` whose character satisfies `predicate`, or
/// zero if there is none.
pub fn previous_matching_pos(
    text: &str,
    pos: TextSize,
    predicate: impl Fn(char) -> bool,
) -> TextSize {
    let bytes = text.as_bytes();
    let mut index = usize::from(pos).min(bytes.len());
    while index > 0 {
        index -= 1;
        if predicate(bytes[index] as char) {
            return TextSize::new(index as u32);
        }
    }
    TextSize::new(0)
}

/// True if the line containing `pos` holds only whitespace.
pub fn is_blank_line_at(text: &str, pos: TextSize) -> bool {
    let bytes = text.as_bytes();
    let pos = usize::from(pos).min(bytes.len());

    let mut start = pos;
    while start > 0 && bytes[start - 1] != b'\n' {
        start -= 1;
    }

    let mut index = start;
    while index < bytes.len() && bytes[index] != b'\n' {
        if !matches!(bytes[index], b' ' | b'\t' | b'\r') {
            return false;
        }
        index += 1;
    }
    true
}

/// The whitespace run that indents the line containing `pos`.
pub(crate) fn line_indentation(text: &str, pos: TextSize) -> &str {
    let bytes = text.as_bytes();
    let pos = usize::from(pos).min(bytes.len());

    let mut start = pos;
    while start > 0 && bytes[start - 1] != b'\n' {
        start -= 1;
    }

    let mut end = start;
    while end < pos && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    &text[start..end]
}

/// True if only indentation separates `pos` from the start of its line.
pub(crate) fn is_first_on_line(text: &str, pos: TextSize) -> bool {
    let bytes = text.as_bytes();
    let mut index = usize::from(pos).min(bytes.len());
    while index > 0 {
        index -= 1;
        match bytes[index] {
            b' ' | b'\t' => {}
            b'\n' => return true,
            _ => return false,
        }
    }
    true
}
