use super::App;
use std::io;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_textarea::Input;

use crate::types::{Focus, PendingAction, SearchField};
use crate::util::{char_to_byte, pending_hint};

impl App {
    pub(crate) fn handle_prompt_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.prompt = None;
                self.set_status("Canceled");
            }
            (_, KeyCode::Enter) => {
                let value = prompt.value.trim().to_string();
                if value.is_empty() {
                    self.prompt = None;
                    self.set_status("Canceled");
                    return Ok(());
                }
                let mode = prompt.mode.clone();
                self.prompt = None;
                self.apply_prompt(mode, value)?;
            }
            (_, KeyCode::Backspace) => {
                if prompt.cursor > 0 {
                    let at = char_to_byte(&prompt.value, prompt.cursor - 1);
                    prompt.value.remove(at);
                    prompt.cursor -= 1;
                }
            }
            (_, KeyCode::Delete) => {
                if prompt.cursor < prompt.value.chars().count() {
                    let at = char_to_byte(&prompt.value, prompt.cursor);
                    prompt.value.remove(at);
                }
            }
            (_, KeyCode::Left) => {
                prompt.cursor = prompt.cursor.saturating_sub(1);
            }
            (_, KeyCode::Right) => {
                if prompt.cursor < prompt.value.chars().count() {
                    prompt.cursor += 1;
                }
            }
            (_, KeyCode::Home) => {
                prompt.cursor = 0;
            }
            (_, KeyCode::End) => {
                prompt.cursor = prompt.value.chars().count();
            }
            (_, KeyCode::Char(c)) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    let at = char_to_byte(&prompt.value, prompt.cursor);
                    prompt.value.insert(at, c);
                    prompt.cursor += 1;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Answers the delete dialog. Returns `true` when the key was consumed.
    pub(crate) fn handle_pending_key(&mut self, key: KeyEvent) -> io::Result<bool> {
        let PendingAction::Delete(name) = &self.pending else {
            return Ok(false);
        };
        let name = name.clone();
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('q' | 'Q')) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.pending = PendingAction::None;
                self.quit = true;
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y'))
            | (KeyModifiers::NONE, KeyCode::Enter) => {
                self.pending = PendingAction::None;
                self.answer_delete(&name, true)?;
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('n' | 'N'))
            | (_, KeyCode::Esc) => {
                self.pending = PendingAction::None;
                self.answer_delete(&name, false)?;
            }
            _ => {
                self.set_status(pending_hint(&self.pending));
            }
        }
        Ok(true)
    }

    pub(crate) fn handle_search_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let search = &mut self.session.search;
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.toggle_search();
                self.set_status("Find/replace closed");
            }
            (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => {
                search.field = match search.field {
                    SearchField::Find => SearchField::Replace,
                    SearchField::Replace => SearchField::Find,
                };
            }
            (_, KeyCode::Enter) => {
                self.run_replace()?;
            }
            (_, KeyCode::Backspace) => {
                search.active_value_mut().pop();
            }
            (_, KeyCode::Char(c)) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    search.active_value_mut().push(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Navigation inside the open suggestion list. Keys it does not use fall
    /// through to the editor so typing keeps refining the list.
    pub(crate) fn handle_suggestions_key(&mut self, key: KeyEvent) -> io::Result<bool> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.session.suggestions.close();
                self.set_status("Suggestions closed");
            }
            (_, KeyCode::Down) => self.move_suggestion(true),
            (_, KeyCode::Up) => self.move_suggestion(false),
            (KeyModifiers::NONE, KeyCode::Enter | KeyCode::Tab) => {
                self.accept_suggestion()?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn move_suggestion(&mut self, down: bool) {
        let state = &mut self.session.suggestions;
        if down {
            if state.index + 1 < state.len() {
                state.index += 1;
            }
        } else {
            state.index = state.index.saturating_sub(1);
        }
    }

    /// First visible row of the suggestion popup, keeping the highlighted
    /// candidate on screen.
    pub(crate) fn suggestions_offset(&self) -> usize {
        self.session
            .suggestions
            .index
            .saturating_sub(Self::MAX_SUGGESTIONS_SHOWN - 1)
    }

    pub(crate) fn handle_files_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let names = self.file_names();
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                if self.files_selected + 1 < names.len() {
                    self.files_selected += 1;
                }
            }
            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                self.files_selected = self.files_selected.saturating_sub(1);
            }
            (KeyModifiers::NONE, KeyCode::Enter)
            | (KeyModifiers::NONE, KeyCode::Right)
            | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                if let Some(name) = names.get(self.files_selected) {
                    self.switch_file(name);
                    self.focus = Focus::Editor;
                }
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                if let Some(name) = names.get(self.files_selected) {
                    self.request_delete(name);
                }
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.focus = Focus::Editor;
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn handle_editor_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let before = self.editor.cursor();
        let modified = self.editor.input(Input::from(key));
        if modified {
            self.on_editor_content_changed()?;
        } else if self.editor.cursor() != before {
            self.on_editor_cursor_moved();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptMode;
    use tempfile::{TempDir, tempdir};

    fn new_app() -> (TempDir, App) {
        let tmp = tempdir().expect("tempdir");
        let app = App::new(tmp.path().join("state"), tmp.path().join("out"))
            .expect("app should initialize");
        (tmp, app)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn prompt_edits_respect_cursor() {
        let (_tmp, mut app) = new_app();
        app.open_new_file_prompt();
        for c in "ab.css".chars() {
            app.handle_prompt_key(key(KeyCode::Char(c))).expect("key");
        }
        app.handle_prompt_key(key(KeyCode::Home)).expect("key");
        app.handle_prompt_key(key(KeyCode::Delete)).expect("key");
        app.handle_prompt_key(key(KeyCode::Char('x'))).expect("key");
        let prompt = app.prompt.as_ref().expect("prompt open");
        assert_eq!(prompt.value, "xb.css");
        assert_eq!(prompt.cursor, 1);
        assert!(matches!(prompt.mode, PromptMode::NewFile));
    }

    #[test]
    fn blank_prompt_cancels_without_adding() {
        let (_tmp, mut app) = new_app();
        app.open_new_file_prompt();
        app.handle_prompt_key(key(KeyCode::Char(' '))).expect("key");
        app.handle_prompt_key(key(KeyCode::Enter)).expect("key");
        assert!(app.prompt.is_none());
        assert_eq!(app.session.project().len(), 3);
    }

    #[test]
    fn duplicate_name_reports_and_keeps_project() {
        let (_tmp, mut app) = new_app();
        app.open_new_file_prompt();
        for c in "style.css".chars() {
            app.handle_prompt_key(key(KeyCode::Char(c))).expect("key");
        }
        app.handle_prompt_key(key(KeyCode::Enter)).expect("key");
        assert_eq!(app.status, "style.css already exists");
        assert_eq!(app.session.project().len(), 3);
        assert_eq!(app.session.active_file(), "index.html");
    }

    #[test]
    fn unrelated_key_keeps_delete_pending() {
        let (_tmp, mut app) = new_app();
        app.request_delete("script.js");
        assert!(app.handle_pending_key(key(KeyCode::Char('x'))).expect("key"));
        assert!(matches!(app.pending, PendingAction::Delete(_)));
        assert!(app.status.contains("script.js"));
    }

    #[test]
    fn suggestion_navigation_is_clamped() {
        let (_tmp, mut app) = new_app();
        app.session.edit("<s".to_string(), 2).expect("edit");
        let total = app.session.suggestions.len();
        assert!(total >= 2);
        for _ in 0..total + 3 {
            app.move_suggestion(true);
        }
        assert_eq!(app.session.suggestions.index, total - 1);
        for _ in 0..total + 3 {
            app.move_suggestion(false);
        }
        assert_eq!(app.session.suggestions.index, 0);
    }

    #[test]
    fn files_focus_enter_opens_selected() {
        let (_tmp, mut app) = new_app();
        app.focus = Focus::Files;
        app.handle_files_key(key(KeyCode::Down)).expect("key");
        app.handle_files_key(key(KeyCode::Down)).expect("key");
        app.handle_files_key(key(KeyCode::Enter)).expect("key");
        assert_eq!(app.session.active_file(), "script.js");
        assert_eq!(app.focus, Focus::Editor);
    }

    #[test]
    fn cursor_move_closes_suggestions() {
        let (_tmp, mut app) = new_app();
        app.session.edit(String::new(), 0).expect("clear");
        app.load_editor_from_session();
        app.handle_editor_key(key(KeyCode::Char('<'))).expect("key");
        app.handle_editor_key(key(KeyCode::Char('h'))).expect("key");
        assert!(app.session.suggestions.is_open());
        app.handle_editor_key(key(KeyCode::Left)).expect("key");
        assert!(!app.session.suggestions.is_open());
        assert_eq!(app.session.cursor(), 1);
    }
}
