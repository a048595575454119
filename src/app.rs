use std::path::PathBuf;

use ratatui::layout::Rect;
use ratatui_textarea::TextArea;

use crate::session::Session;
use crate::theme::Theme;
use crate::types::{Focus, PendingAction, PromptState, ToolbarAction};

mod core;
mod editor;
mod input;
mod input_handlers;

#[derive(Default)]
pub(crate) struct LayoutRects {
    pub(crate) files: Rect,
    pub(crate) editor: Rect,
    pub(crate) preview: Rect,
    pub(crate) search: Rect,
    pub(crate) suggestions: Rect,
    pub(crate) prompt: Rect,
    pub(crate) toolbar: Vec<(Rect, ToolbarAction)>,
}

pub(crate) struct App {
    pub(crate) session: Session,
    pub(crate) editor: TextArea<'static>,
    pub(crate) state_dir: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) focus: Focus,
    pub(crate) files_selected: usize,
    pub(crate) status: String,
    pub(crate) pending: PendingAction,
    pub(crate) prompt: Option<PromptState>,
    pub(crate) quit: bool,
    pub(crate) preview_fullscreen: bool,
    pub(crate) preview_scroll: u16,
    pub(crate) editor_scroll_row: usize,
    pub(crate) themes: Vec<Theme>,
    pub(crate) active_theme_index: usize,
    pub(crate) rects: LayoutRects,
}
