use super::App;
use std::io;

use ratatui::style::Style;
use ratatui_textarea::{CursorMove, TextArea};

use crate::types::Focus;
use crate::util::{
    char_at_display_col, cursor_to_offset, offset_to_cursor, text_to_lines, to_u16_saturating,
};

impl App {
    /// Rebuilds the editor widget from the session buffer. Called whenever
    /// the session rewrote the buffer rather than the widget itself.
    pub(crate) fn load_editor_from_session(&mut self) {
        let text = self.session.buffer();
        let (row, col) = offset_to_cursor(text, self.session.cursor());
        let mut ta = TextArea::from(text_to_lines(text));
        ta.set_cursor_line_style(Style::default().bg(self.active_theme().bg_alt));
        ta.set_selection_style(Style::default().bg(self.active_theme().selection));
        ta.move_cursor(CursorMove::Jump(to_u16_saturating(row), to_u16_saturating(col)));
        self.editor = ta;
        self.sync_editor_scroll();
    }

    pub(crate) fn editor_text(&self) -> String {
        self.editor.lines().join("\n")
    }

    pub(crate) fn editor_offset(&self) -> usize {
        cursor_to_offset(self.editor.lines(), self.editor.cursor())
    }

    pub(crate) fn on_editor_content_changed(&mut self) -> io::Result<()> {
        let text = self.editor_text();
        let offset = self.editor_offset();
        self.session.edit(text, offset)?;
        self.sync_editor_scroll();
        Ok(())
    }

    pub(crate) fn on_editor_cursor_moved(&mut self) {
        let offset = self.editor_offset();
        self.session.move_cursor(offset);
        self.session.suggestions.close();
        self.sync_editor_scroll();
    }

    pub(crate) fn insert_toolbar_char(&mut self, c: char) -> io::Result<()> {
        self.focus = Focus::Editor;
        let offset = self.editor_offset();
        self.session.move_cursor(offset);
        self.session.insert_char(c)?;
        self.session.suggestions.close();
        self.load_editor_from_session();
        self.set_status(format!("Inserted '{c}'"));
        Ok(())
    }

    pub(crate) fn accept_suggestion(&mut self) -> io::Result<()> {
        let idx = self.session.suggestions.index;
        let label = self
            .session
            .suggestions
            .current
            .as_ref()
            .and_then(|s| s.label(idx));
        if self.session.accept_suggestion(idx)? {
            self.focus = Focus::Editor;
            self.load_editor_from_session();
            if let Some(label) = label {
                self.set_status(format!("Inserted {label}"));
            }
        }
        Ok(())
    }

    fn editor_viewport_rows(&self) -> usize {
        self.rects.editor.height.saturating_sub(2).max(1) as usize
    }

    /// Keeps the cursor row inside the visible part of the editor.
    pub(crate) fn sync_editor_scroll(&mut self) {
        let (row, _) = self.editor.cursor();
        let viewport = self.editor_viewport_rows();
        if row < self.editor_scroll_row {
            self.editor_scroll_row = row;
        } else if row >= self.editor_scroll_row + viewport {
            self.editor_scroll_row = row + 1 - viewport;
        }
    }

    pub(crate) fn scroll_editor(&mut self, down: bool) {
        let max_scroll = self.editor.lines().len().saturating_sub(1);
        self.editor_scroll_row = if down {
            (self.editor_scroll_row + Self::SCROLL_LINES).min(max_scroll)
        } else {
            self.editor_scroll_row.saturating_sub(Self::SCROLL_LINES)
        };
    }

    pub(crate) fn editor_pos_from_mouse(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let inner_x = self.rects.editor.x.saturating_add(1);
        let inner_y = self.rects.editor.y.saturating_add(1);
        if y < inner_y || x < inner_x + Self::EDITOR_GUTTER_WIDTH {
            return None;
        }
        let lines = self.editor.lines();
        let row = (self.editor_scroll_row + (y - inner_y) as usize).min(lines.len().saturating_sub(1));
        let screen_col = (x - inner_x - Self::EDITOR_GUTTER_WIDTH) as usize;
        let col = lines
            .get(row)
            .map_or(0, |line| char_at_display_col(line, screen_col));
        Some((row, col))
    }

    pub(crate) fn move_editor_cursor_to(&mut self, row: usize, col: usize) {
        self.editor
            .move_cursor(CursorMove::Jump(to_u16_saturating(row), to_u16_saturating(col)));
        self.editor.cancel_selection();
        self.on_editor_cursor_moved();
    }
}
