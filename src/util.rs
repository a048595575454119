use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

use crate::types::PendingAction;

/// Convert a text string to editor lines, preserving a trailing newline as an
/// empty final line so the cursor can be positioned after the last content line.
pub(crate) fn text_to_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines: Vec<String> = text.split('\n').map(ToString::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Byte index of the `idx`-th character, clamped to the end of `text`.
pub(crate) fn char_to_byte(text: &str, idx: usize) -> usize {
    text.char_indices()
        .nth(idx)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Character offset of an editor `(row, col)` position within `lines`
/// joined by `\n`.
pub(crate) fn cursor_to_offset(lines: &[String], cursor: (usize, usize)) -> usize {
    let (row, col) = cursor;
    let row = row.min(lines.len().saturating_sub(1));
    let before: usize = lines
        .iter()
        .take(row)
        .map(|line| line.chars().count() + 1)
        .sum();
    let line_len = lines.get(row).map_or(0, |l| l.chars().count());
    before + col.min(line_len)
}

pub(crate) fn offset_to_cursor(text: &str, offset: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

/// Terminal columns one character takes in the editor; tabs draw as four.
pub(crate) fn char_cols(ch: char) -> usize {
    if ch == '\t' { 4 } else { ch.width().unwrap_or(0) }
}

/// Character index in `line` under screen column `col`. Columns past the
/// end map to the line length.
pub(crate) fn char_at_display_col(line: &str, col: usize) -> usize {
    let mut used = 0;
    for (idx, ch) in line.chars().enumerate() {
        used += char_cols(ch);
        if used > col {
            return idx;
        }
    }
    line.chars().count()
}

pub(crate) fn pending_hint(pending: &PendingAction) -> String {
    match pending {
        PendingAction::None => String::new(),
        PendingAction::Delete(name) => {
            format!("Pending delete {name}: Y/Enter confirm, N/Esc cancel")
        }
    }
}

pub(crate) fn inside(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

pub(crate) fn to_u16_saturating(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}
