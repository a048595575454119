use super::App;
use std::io;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::types::{Focus, PendingAction, SearchField};
use crate::util::inside;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if self.handle_pending_key(key)? {
            return Ok(());
        }
        if self.handle_global_key(key)? {
            return Ok(());
        }

        if self.focus == Focus::Search {
            return self.handle_search_key(key);
        }
        if self.focus == Focus::Editor
            && self.session.suggestions.is_open()
            && self.handle_suggestions_key(key)?
        {
            return Ok(());
        }

        match self.focus {
            Focus::Files => self.handle_files_key(key),
            Focus::Editor | Focus::Search => self.handle_editor_key(key),
        }
    }

    /// Shortcuts that work from every focus. Returns `true` when consumed.
    fn handle_global_key(&mut self, key: KeyEvent) -> io::Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::F(11) => self.toggle_preview_fullscreen(),
            KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
                'q' => self.quit = true,
                'n' => self.open_new_file_prompt(),
                'f' => self.toggle_search(),
                's' => self.download_project()?,
                'o' => self.open_preview_in_browser(),
                't' => self.cycle_theme(),
                'b' => {
                    self.focus_on(if self.focus == Focus::Files {
                        Focus::Editor
                    } else {
                        Focus::Files
                    });
                    self.set_status(match self.focus {
                        Focus::Files => "Focus: files",
                        _ => "Focus: editor",
                    });
                }
                'd' => {
                    let target = if self.focus == Focus::Files {
                        self.file_names().get(self.files_selected).cloned()
                    } else {
                        Some(self.session.active_file().to_string())
                    };
                    if let Some(name) = target {
                        self.request_delete(&name);
                    }
                }
                _ => return Ok(false),
            },
            KeyCode::Char(c)
                if key.modifiers.contains(KeyModifiers::ALT) && c.is_ascii_digit() =>
            {
                // Alt+1..Alt+9 then Alt+0 map onto the toolbar characters.
                let slot = c.to_digit(10).map_or(0, |d| (d as usize + 9) % 10);
                if let Some(ch) = Self::TOOLBAR_CHARS.get(slot).copied() {
                    self.insert_toolbar_char(ch)?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let (x, y) = (mouse.column, mouse.row);
        let left_down = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));

        // Modal states: clicks inside the prompt move its cursor, anything
        // else dismisses.
        if self.prompt.is_some() || matches!(self.pending, PendingAction::Delete(_)) {
            if !left_down {
                return Ok(());
            }
            if inside(x, y, self.rects.prompt)
                && let Some(prompt) = self.prompt.as_mut()
            {
                let inner_x = x.saturating_sub(self.rects.prompt.x + 1) as usize;
                prompt.cursor = inner_x.min(prompt.value.chars().count());
                return Ok(());
            }
            if self.prompt.take().is_some() {
                self.set_status("Canceled");
            } else if let PendingAction::Delete(name) =
                std::mem::replace(&mut self.pending, PendingAction::None)
            {
                self.answer_delete(&name, false)?;
            }
            return Ok(());
        }

        let toolbar_hit = self
            .rects
            .toolbar
            .iter()
            .find(|(rect, _)| inside(x, y, *rect))
            .map(|(_, action)| *action);
        if left_down && let Some(action) = toolbar_hit {
            return self.run_toolbar_action(action);
        }

        if self.session.suggestions.is_open() && inside(x, y, self.rects.suggestions) {
            return self.handle_suggestions_mouse(mouse);
        }
        // Clicking elsewhere dismisses the popup.
        if left_down {
            self.session.suggestions.close();
        }

        if inside(x, y, self.rects.files) {
            return self.handle_files_mouse(mouse);
        }

        if self.session.search.open && inside(x, y, self.rects.search) {
            if left_down {
                self.focus_on(Focus::Search);
                let half = self.rects.search.x + self.rects.search.width / 2;
                self.session.search.field = if x < half {
                    SearchField::Find
                } else {
                    SearchField::Replace
                };
            }
            return Ok(());
        }

        if inside(x, y, self.rects.preview) {
            match mouse.kind {
                MouseEventKind::ScrollDown => {
                    self.preview_scroll = self
                        .preview_scroll
                        .saturating_add(Self::SCROLL_LINES as u16);
                }
                MouseEventKind::ScrollUp => {
                    self.preview_scroll = self
                        .preview_scroll
                        .saturating_sub(Self::SCROLL_LINES as u16);
                }
                _ => {}
            }
            return Ok(());
        }

        if inside(x, y, self.rects.editor) {
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.focus = Focus::Editor;
                    if let Some((row, col)) = self.editor_pos_from_mouse(x, y) {
                        self.move_editor_cursor_to(row, col);
                    }
                }
                MouseEventKind::ScrollDown => self.scroll_editor(true),
                MouseEventKind::ScrollUp => self.scroll_editor(false),
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_files_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let names = self.file_names();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(idx) = self.files_index_from_mouse(mouse.row) else {
                    return Ok(());
                };
                let Some(name) = names.get(idx).cloned() else {
                    return Ok(());
                };
                self.files_selected = idx;
                let delete_col = self.rects.files.right().saturating_sub(3);
                let deletable = self.session.deletable_files().any(|d| d == name);
                if mouse.column >= delete_col && deletable {
                    self.focus_on(Focus::Files);
                    self.request_delete(&name);
                } else {
                    self.switch_file(&name);
                    self.focus = Focus::Editor;
                }
            }
            MouseEventKind::ScrollDown => {
                self.files_selected =
                    (self.files_selected + Self::SCROLL_LINES).min(names.len().saturating_sub(1));
            }
            MouseEventKind::ScrollUp => {
                self.files_selected = self.files_selected.saturating_sub(Self::SCROLL_LINES);
            }
            _ => {}
        }
        Ok(())
    }

    fn files_index_from_mouse(&self, row: u16) -> Option<usize> {
        let inner_y = self.rects.files.y.saturating_add(1);
        if row < inner_y || row + 1 >= self.rects.files.bottom() {
            return None;
        }
        Some((row - inner_y) as usize)
    }

    fn handle_suggestions_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let inner_y = self.rects.suggestions.y.saturating_add(1);
                if mouse.row < inner_y {
                    return Ok(());
                }
                let idx = self.suggestions_offset() + (mouse.row - inner_y) as usize;
                if idx < self.session.suggestions.len() {
                    self.session.suggestions.index = idx;
                    self.accept_suggestion()?;
                }
            }
            MouseEventKind::ScrollDown => self.move_suggestion(true),
            MouseEventKind::ScrollUp => self.move_suggestion(false),
            _ => {}
        }
        Ok(())
    }
}
