use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use url::Url;

use crate::project::{INDEX_HTML, Project, SCRIPT_JS, STYLE_CSS};
use crate::store::write_replacing;

pub(crate) const PREVIEW_FILE: &str = "preview.html";

/// An isolated surface that shows the composed document.
pub(crate) trait PreviewSandbox {
    /// Replaces the whole document; nothing of the previous one survives.
    fn replace_document(&mut self, html: &str) -> io::Result<()>;

    fn location(&self) -> Option<Url> {
        None
    }
}

/// Keeps the preview as a standalone HTML file that any browser can open.
pub(crate) struct FileSandbox {
    path: PathBuf,
}

impl FileSandbox {
    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(PREVIEW_FILE),
        }
    }
}

impl PreviewSandbox for FileSandbox {
    fn replace_document(&mut self, html: &str) -> io::Result<()> {
        write_replacing(&self.path, html.as_bytes())
    }

    fn location(&self) -> Option<Url> {
        Url::from_file_path(&self.path).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PreviewStatus {
    Ready,
    Error(String),
}

impl PreviewStatus {
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Ready => "Ready.".to_string(),
            Self::Error(msg) => format!("Error: {msg}"),
        }
    }

    pub(crate) fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Markup first, then styles, then the script, so both can rely on the
/// elements already existing.
pub(crate) fn compose_document(project: &Project) -> String {
    let html = project.get(INDEX_HTML).unwrap_or_default();
    let css = project.get(STYLE_CSS).unwrap_or_default();
    let js = project.get(SCRIPT_JS).unwrap_or_default();
    format!("{html}<style>{css}</style><script>{js}</script>")
}

pub(crate) fn render_preview(project: &Project, sandbox: &mut dyn PreviewSandbox) -> PreviewStatus {
    let document = compose_document(project);
    match sandbox.replace_document(&document) {
        Ok(()) => PreviewStatus::Ready,
        Err(err) => {
            warn!("preview update failed: {err}");
            PreviewStatus::Error(err.to_string())
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemorySandbox {
    pub(crate) documents: Vec<String>,
    pub(crate) fail_with: Option<String>,
}

#[cfg(test)]
impl PreviewSandbox for MemorySandbox {
    fn replace_document(&mut self, html: &str) -> io::Result<()> {
        if let Some(msg) = &self.fail_with {
            return Err(io::Error::other(msg.clone()));
        }
        self.documents.push(html.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_project() -> Project {
        let mut project = Project::default();
        project.insert(INDEX_HTML, "<h1>x</h1>");
        project.insert(STYLE_CSS, "h1{color:red}");
        project.insert(SCRIPT_JS, "1+1");
        project
    }

    #[test]
    fn composes_html_then_style_then_script() {
        assert_eq!(
            compose_document(&sample_project()),
            "<h1>x</h1><style>h1{color:red}</style><script>1+1</script>"
        );
    }

    #[test]
    fn missing_files_compose_as_empty() {
        let mut project = Project::default();
        project.insert(INDEX_HTML, "<p>only</p>");
        assert_eq!(
            compose_document(&project),
            "<p>only</p><style></style><script></script>"
        );
    }

    #[test]
    fn extra_files_are_not_part_of_the_document() {
        let mut project = sample_project();
        project.insert("about.html", "<p>about</p>");
        assert!(!compose_document(&project).contains("about"));
    }

    #[test]
    fn rendering_twice_yields_identical_documents() {
        let project = sample_project();
        let mut sandbox = MemorySandbox::default();
        assert_eq!(render_preview(&project, &mut sandbox), PreviewStatus::Ready);
        assert_eq!(render_preview(&project, &mut sandbox), PreviewStatus::Ready);
        assert_eq!(sandbox.documents.len(), 2);
        assert_eq!(sandbox.documents[0], sandbox.documents[1]);
    }

    #[test]
    fn sandbox_failure_becomes_error_status() {
        let mut sandbox = MemorySandbox {
            fail_with: Some("surface gone".to_string()),
            ..Default::default()
        };
        let status = render_preview(&sample_project(), &mut sandbox);
        assert_eq!(status, PreviewStatus::Error("surface gone".to_string()));
        assert_eq!(status.message(), "Error: surface gone");
        assert!(status.is_error());
        assert_eq!(PreviewStatus::Ready.message(), "Ready.");
    }

    #[test]
    fn file_sandbox_replaces_whole_document() {
        let tmp = tempdir().expect("tempdir");
        let mut sandbox = FileSandbox::in_dir(tmp.path());
        sandbox
            .replace_document("<p>first, longer document</p>")
            .expect("first write");
        sandbox.replace_document("<p>2</p>").expect("second write");
        let on_disk = fs::read_to_string(tmp.path().join(PREVIEW_FILE)).expect("read");
        assert_eq!(on_disk, "<p>2</p>");
        let url = sandbox.location().expect("absolute temp path has a url");
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with(PREVIEW_FILE));
    }
}
