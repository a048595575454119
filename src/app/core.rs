use super::{App, LayoutRects};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use ratatui_textarea::TextArea;
use tracing::{info, warn};

use crate::persistence::{PersistedState, load_persisted_state, save_persisted_state};
use crate::preview::FileSandbox;
use crate::project::INDEX_HTML;
use crate::session::{AddOutcome, DeleteOutcome, Session};
use crate::store::{FileStorage, FileStore};
use crate::theme::{Theme, load_themes};
use crate::types::{Focus, PendingAction, PromptMode, PromptState, ToolbarAction};

impl App {
    pub(crate) const EDITOR_GUTTER_WIDTH: u16 = 6;
    pub(crate) const FILES_PANE_WIDTH: u16 = 24;
    pub(crate) const MAX_SUGGESTIONS_SHOWN: usize = 8;
    pub(crate) const SCROLL_LINES: usize = 3;
    pub(crate) const TOOLBAR_CHARS: [char; 10] =
        ['<', '>', '/', '{', '}', '(', ')', ';', ':', '"'];

    pub(crate) fn new(state_dir: PathBuf, export_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&state_dir)?;
        let store = FileStore::new(Box::new(FileStorage::in_dir(&state_dir)));
        let sandbox = Box::new(FileSandbox::in_dir(&state_dir));
        let session = Session::open(store, sandbox);
        let mut app = Self {
            session,
            editor: TextArea::default(),
            state_dir,
            export_dir,
            focus: Focus::Editor,
            files_selected: 0,
            status: String::new(),
            pending: PendingAction::None,
            prompt: None,
            quit: false,
            preview_fullscreen: false,
            preview_scroll: 0,
            editor_scroll_row: 0,
            themes: load_themes(),
            active_theme_index: 0,
            rects: LayoutRects::default(),
        };
        app.restore_persisted_state();
        app.load_editor_from_session();
        app.status = match app.session.preview_location() {
            Some(url) => format!("Preview: {url}"),
            None => format!("State: {}", app.state_dir.display()),
        };
        Ok(app)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Moves focus; the suggestion popup only lives while the editor has it.
    pub(crate) fn focus_on(&mut self, focus: Focus) {
        if focus != Focus::Editor {
            self.session.suggestions.close();
        }
        self.focus = focus;
    }

    pub(crate) fn active_theme(&self) -> &Theme {
        &self.themes[self.active_theme_index]
    }

    pub(crate) fn file_names(&self) -> Vec<String> {
        self.session
            .project()
            .names()
            .map(ToString::to_string)
            .collect()
    }

    pub(crate) fn restore_persisted_state(&mut self) {
        let Some(saved) = load_persisted_state(&self.state_dir) else {
            return;
        };
        if let Some(fullscreen) = saved.preview_fullscreen {
            self.preview_fullscreen = fullscreen;
        }
        if let Some(idx) = self
            .themes
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(&saved.theme_name))
        {
            self.active_theme_index = idx;
        }
    }

    pub(crate) fn persist_state(&mut self) {
        let state = PersistedState {
            theme_name: self.active_theme().name.clone(),
            preview_fullscreen: Some(self.preview_fullscreen),
        };
        if let Err(err) = save_persisted_state(&self.state_dir, &state) {
            warn!("failed to persist ui state: {err}");
            self.set_status("Failed to persist app state");
        }
    }

    pub(crate) fn cycle_theme(&mut self) {
        self.active_theme_index = (self.active_theme_index + 1) % self.themes.len();
        self.load_editor_from_session();
        self.persist_state();
        self.set_status(format!("Theme: {}", self.active_theme().name));
    }

    pub(crate) fn toggle_preview_fullscreen(&mut self) {
        self.preview_fullscreen = !self.preview_fullscreen;
        self.persist_state();
        if self.preview_fullscreen {
            self.set_status("Preview fullscreen (F11 to restore)");
        } else {
            self.set_status("Preview restored");
        }
    }

    pub(crate) fn open_preview_in_browser(&mut self) {
        let Some(url) = self.session.preview_location() else {
            self.set_status("Preview has no location to open");
            return;
        };
        let (cmd, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
            ("open", vec![url.as_str()])
        } else if cfg!(target_os = "windows") {
            ("cmd", vec!["/C", "start", "", url.as_str()])
        } else {
            ("xdg-open", vec![url.as_str()])
        };
        let mut command = Command::new(cmd);
        command.args(&args);
        match spawn_reaped(command) {
            Ok(_) => self.set_status(format!("Opened {url}")),
            Err(err) => {
                warn!("failed to launch {cmd}: {err}");
                self.set_status(format!("Could not launch {cmd}: {err}"));
            }
        }
    }

    pub(crate) fn open_new_file_prompt(&mut self) {
        self.prompt = Some(PromptState {
            title: "File name (e.g., about.html)".to_string(),
            value: String::new(),
            cursor: 0,
            mode: PromptMode::NewFile,
        });
    }

    pub(crate) fn apply_prompt(&mut self, mode: PromptMode, value: String) -> io::Result<()> {
        match mode {
            PromptMode::NewFile => match self.session.add_file(&value)? {
                AddOutcome::Ignored => {}
                AddOutcome::Duplicate => {
                    self.set_status(format!("{} already exists", value.trim()));
                }
                AddOutcome::Created => {
                    self.after_file_switch();
                    self.set_status(format!("Created {}", self.session.active_file()));
                }
            },
        }
        Ok(())
    }

    pub(crate) fn toggle_search(&mut self) {
        if self.session.toggle_search() {
            self.focus_on(Focus::Search);
            self.set_status("Find/replace: Tab switch field, Enter replace all, Esc close");
        } else {
            self.focus_on(Focus::Editor);
        }
    }

    pub(crate) fn run_replace(&mut self) -> io::Result<()> {
        let find = self.session.search.find.clone();
        let replace = self.session.search.replace.clone();
        if find.is_empty() {
            return Ok(());
        }
        let count = self.session.replace_all(&find, &replace)?;
        self.load_editor_from_session();
        self.set_status(format!("Replaced {count} occurrence(s)"));
        Ok(())
    }

    pub(crate) fn download_project(&mut self) -> io::Result<()> {
        let path = self.session.download(&self.export_dir)?;
        self.set_status(format!("Downloaded {}", path.display()));
        Ok(())
    }

    pub(crate) fn switch_file(&mut self, name: &str) {
        if self.session.switch_file(name) {
            self.after_file_switch();
            self.set_status(format!("Editing {name}"));
        } else {
            self.set_status(format!("No such file: {name}"));
        }
    }

    pub(crate) fn after_file_switch(&mut self) {
        let active = self.session.active_file().to_string();
        self.files_selected = self
            .file_names()
            .iter()
            .position(|n| *n == active)
            .unwrap_or(0);
        self.editor_scroll_row = 0;
        self.load_editor_from_session();
    }

    /// Marks `name` for deletion; the y/n dialog answers the confirmation.
    pub(crate) fn request_delete(&mut self, name: &str) {
        if name == INDEX_HTML {
            self.set_status("index.html cannot be deleted");
            return;
        }
        self.pending = PendingAction::Delete(name.to_string());
        self.set_status(format!("Delete {name}? Y/Enter confirm, N/Esc cancel"));
    }

    pub(crate) fn answer_delete(&mut self, name: &str, answer: bool) -> io::Result<()> {
        let was_active = self.session.active_file() == name;
        let outcome = self.session.delete_file(name, &mut |_: &str| answer)?;
        match outcome {
            DeleteOutcome::Deleted => {
                if was_active {
                    self.after_file_switch();
                } else {
                    let active = self.session.active_file().to_string();
                    self.files_selected = self
                        .file_names()
                        .iter()
                        .position(|n| *n == active)
                        .unwrap_or(0);
                }
                info!(file = name, "deleted from ui");
                self.set_status(format!("Deleted {name}"));
            }
            DeleteOutcome::Declined => self.set_status("Delete canceled"),
            DeleteOutcome::Refused => self.set_status(format!("{name} cannot be deleted")),
        }
        Ok(())
    }

    pub(crate) fn run_toolbar_action(&mut self, action: ToolbarAction) -> io::Result<()> {
        match action {
            ToolbarAction::Insert(c) => self.insert_toolbar_char(c)?,
            ToolbarAction::NewFile => self.open_new_file_prompt(),
            ToolbarAction::Search => self.toggle_search(),
            ToolbarAction::Download => self.download_project()?,
            ToolbarAction::Fullscreen => self.toggle_preview_fullscreen(),
            ToolbarAction::OpenPreview => self.open_preview_in_browser(),
        }
        Ok(())
    }

    pub(crate) fn toolbar_actions() -> Vec<(String, ToolbarAction)> {
        let mut actions: Vec<(String, ToolbarAction)> = Self::TOOLBAR_CHARS
            .iter()
            .map(|c| (c.to_string(), ToolbarAction::Insert(*c)))
            .collect();
        actions.push(("+File".to_string(), ToolbarAction::NewFile));
        actions.push(("Find".to_string(), ToolbarAction::Search));
        actions.push(("Download".to_string(), ToolbarAction::Download));
        actions.push(("Full".to_string(), ToolbarAction::Fullscreen));
        actions.push(("Open".to_string(), ToolbarAction::OpenPreview));
        actions
    }
}

/// Starts `command` with null stdio and waits for it on a background thread
/// so the exited child never lingers as a zombie.
pub(crate) fn spawn_reaped(
    mut command: Command,
) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || child.wait()))
}
