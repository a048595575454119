#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Files,
    Editor,
    Search,
}

#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    None,
    Delete(String),
}

#[derive(Debug, Clone)]
pub(crate) enum PromptMode {
    NewFile,
}

#[derive(Debug, Clone)]
pub(crate) struct PromptState {
    pub(crate) title: String,
    pub(crate) value: String,
    pub(crate) cursor: usize,
    pub(crate) mode: PromptMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToolbarAction {
    Insert(char),
    NewFile,
    Search,
    Download,
    Fullscreen,
    OpenPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchField {
    Find,
    Replace,
}

/// What a file is, decided once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    Markup,
    Style,
    Script,
    Unknown,
}

impl FileKind {
    pub(crate) fn from_name(name: &str) -> Self {
        if name.ends_with(".html") {
            Self::Markup
        } else if name.ends_with(".css") {
            Self::Style
        } else if name.ends_with(".js") {
            Self::Script
        } else {
            Self::Unknown
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Style => "CSS",
            Self::Script => "JS",
            Self::Unknown => "Text",
        }
    }
}
