use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::error::StoreError;
use crate::preview::{PreviewSandbox, PreviewStatus, render_preview};
use crate::project::{INDEX_HTML, Project};
use crate::store::{EXPORT_FILE, FileStore, export_snapshot, write_replacing};
use crate::suggest::{Suggestions, suggest};
use crate::types::{FileKind, SearchField};

/// Yes/no confirmation for destructive actions.
pub(crate) trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

pub(crate) struct SearchState {
    pub(crate) open: bool,
    pub(crate) find: String,
    pub(crate) replace: String,
    pub(crate) field: SearchField,
}

impl SearchState {
    pub(crate) fn active_value_mut(&mut self) -> &mut String {
        match self.field {
            SearchField::Find => &mut self.find,
            SearchField::Replace => &mut self.replace,
        }
    }
}

#[derive(Default)]
pub(crate) struct SuggestionState {
    pub(crate) current: Option<Suggestions>,
    pub(crate) index: usize,
}

impl SuggestionState {
    pub(crate) fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.current.as_ref().map_or(0, |s| s.candidates.len())
    }

    pub(crate) fn close(&mut self) {
        self.current = None;
        self.index = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddOutcome {
    Ignored,
    Duplicate,
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteOutcome {
    Refused,
    Declined,
    Deleted,
}

/// One editing session: the project, which file is bound to the editor, the
/// editor buffer and the transient search/suggestion state.
///
/// Every operation that changes file contents writes the project through to
/// the store and recomposes the preview before returning.
pub(crate) struct Session {
    project: Project,
    active: String,
    buffer: String,
    cursor: usize,
    store: FileStore,
    sandbox: Box<dyn PreviewSandbox>,
    preview_status: PreviewStatus,
    pub(crate) suggestions: SuggestionState,
    pub(crate) search: SearchState,
}

impl Session {
    pub(crate) fn open(store: FileStore, sandbox: Box<dyn PreviewSandbox>) -> Self {
        let project = store.load();
        let buffer = project.get(INDEX_HTML).unwrap_or_default().to_string();
        info!(files = project.len(), "session opened");
        let mut session = Self {
            project,
            active: INDEX_HTML.to_string(),
            buffer,
            cursor: 0,
            store,
            sandbox,
            preview_status: PreviewStatus::Ready,
            suggestions: SuggestionState::default(),
            search: SearchState {
                open: false,
                find: String::new(),
                replace: String::new(),
                field: SearchField::Find,
            },
        };
        session.refresh_preview();
        session
    }

    pub(crate) fn project(&self) -> &Project {
        &self.project
    }

    pub(crate) fn active_file(&self) -> &str {
        &self.active
    }

    pub(crate) fn active_kind(&self) -> FileKind {
        FileKind::from_name(&self.active)
    }

    pub(crate) fn buffer(&self) -> &str {
        &self.buffer
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn preview_status(&self) -> &PreviewStatus {
        &self.preview_status
    }

    pub(crate) fn preview_location(&self) -> Option<Url> {
        self.sandbox.location()
    }

    /// Files that may be offered for deletion.
    pub(crate) fn deletable_files(&self) -> impl Iterator<Item = &str> {
        self.project.names().filter(|name| *name != INDEX_HTML)
    }

    pub(crate) fn refresh_preview(&mut self) -> &PreviewStatus {
        self.preview_status = render_preview(&self.project, self.sandbox.as_mut());
        &self.preview_status
    }

    fn commit_buffer(&mut self) {
        self.project.insert(self.active.clone(), self.buffer.clone());
    }

    fn load_buffer(&mut self) {
        self.buffer = self
            .project
            .get(&self.active)
            .unwrap_or_default()
            .to_string();
        self.cursor = 0;
    }

    fn persist_and_render(&mut self) -> Result<(), StoreError> {
        self.store.save(&self.project)?;
        self.refresh_preview();
        Ok(())
    }

    /// Returns `false` and changes nothing when `name` is not in the project.
    pub(crate) fn switch_file(&mut self, name: &str) -> bool {
        if !self.project.contains(name) {
            return false;
        }
        self.commit_buffer();
        self.active = name.to_string();
        self.load_buffer();
        self.suggestions.close();
        self.refresh_preview();
        true
    }

    /// A keystroke in the editor: `text` is the whole buffer after the edit.
    pub(crate) fn edit(&mut self, text: String, cursor: usize) -> Result<(), StoreError> {
        self.cursor = cursor.min(text.chars().count());
        self.buffer = text;
        self.commit_buffer();
        self.persist_and_render()?;
        self.refresh_suggestions();
        Ok(())
    }

    /// Cursor moved without changing text.
    pub(crate) fn move_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.buffer.chars().count());
    }

    pub(crate) fn refresh_suggestions(&mut self) {
        self.suggestions.current = suggest(&self.buffer, self.cursor, self.active_kind());
        self.suggestions.index = 0;
    }

    pub(crate) fn accept_suggestion(&mut self, idx: usize) -> Result<bool, StoreError> {
        let Some(completion) = self
            .suggestions
            .current
            .as_ref()
            .and_then(|s| s.completion(idx))
        else {
            return Ok(false);
        };
        let (text, cursor) = completion.apply(&self.buffer);
        self.buffer = text;
        self.cursor = cursor;
        self.suggestions.close();
        self.commit_buffer();
        self.persist_and_render()?;
        Ok(true)
    }

    pub(crate) fn add_file(&mut self, name: &str) -> Result<AddOutcome, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(AddOutcome::Ignored);
        }
        if self.project.contains(name) {
            return Ok(AddOutcome::Duplicate);
        }
        self.commit_buffer();
        self.project.insert(name, "");
        self.store.save(&self.project)?;
        self.switch_file(name);
        info!(file = name, "file added");
        Ok(AddOutcome::Created)
    }

    pub(crate) fn delete_file(
        &mut self,
        name: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, StoreError> {
        if name == INDEX_HTML || !self.project.contains(name) {
            return Ok(DeleteOutcome::Refused);
        }
        if !confirm.confirm(&format!("Delete {name}?")) {
            return Ok(DeleteOutcome::Declined);
        }
        self.commit_buffer();
        self.project.remove(name);
        if self.active == name {
            self.active = INDEX_HTML.to_string();
            self.load_buffer();
            self.suggestions.close();
        }
        self.persist_and_render()?;
        info!(file = name, "file deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Literal find/replace over the active buffer. Returns how many
    /// occurrences were replaced; an empty `find` does nothing.
    pub(crate) fn replace_all(&mut self, find: &str, replace: &str) -> Result<usize, StoreError> {
        if find.is_empty() {
            return Ok(0);
        }
        let count = self.buffer.matches(find).count();
        self.buffer = self.buffer.replace(find, replace);
        self.cursor = self.cursor.min(self.buffer.chars().count());
        self.commit_buffer();
        self.persist_and_render()?;
        Ok(count)
    }

    pub(crate) fn insert_char(&mut self, c: char) -> Result<(), StoreError> {
        let at = crate::util::char_to_byte(&self.buffer, self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        self.commit_buffer();
        self.persist_and_render()
    }

    pub(crate) fn toggle_search(&mut self) -> bool {
        self.search.open = !self.search.open;
        self.search.field = SearchField::Find;
        self.search.open
    }

    pub(crate) fn export_snapshot(&self) -> Result<Vec<u8>, StoreError> {
        export_snapshot(&self.project)
    }

    /// Writes the exported snapshot into `dir` and returns its path.
    pub(crate) fn download(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let bytes = self.export_snapshot()?;
        let path = dir.join(EXPORT_FILE);
        write_replacing(&path, &bytes)?;
        info!(path = %path.display(), "project exported");
        Ok(path)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &FileStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{MemorySandbox, compose_document};
    use crate::project::{SCRIPT_JS, STYLE_CSS};
    use crate::store::{MemoryStorage, Storage, decode_snapshot};
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::open(
            FileStore::new(Box::new(MemoryStorage::default())),
            Box::new(MemorySandbox::default()),
        )
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    /// Reads as empty, refuses every write.
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read(&self) -> io::Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _raw: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn failing_session() -> Session {
        Session::open(
            FileStore::new(Box::new(FailingStorage)),
            Box::new(MemorySandbox::default()),
        )
    }

    fn assert_write_fault<T: std::fmt::Debug>(result: Result<T, StoreError>) {
        match result {
            Err(StoreError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("expected a write fault, got {other:?}"),
        }
    }

    fn assert_persisted(s: &Session) {
        assert_eq!(&s.store().load(), s.project());
    }

    #[test]
    fn opens_on_index_with_starter_files() {
        let s = session();
        assert_eq!(s.active_file(), INDEX_HTML);
        assert_eq!(s.buffer(), "<h1>E-Smart IDE</h1>\n<p>Start coding!</p>");
        assert_eq!(s.preview_status(), &PreviewStatus::Ready);
    }

    #[test]
    fn switching_loads_exact_file_content() {
        let mut s = session();
        s.add_file("notes.txt").expect("add");
        s.edit("a\nb".to_string(), 3).expect("edit");
        for name in [STYLE_CSS, SCRIPT_JS, "notes.txt", INDEX_HTML] {
            assert!(s.switch_file(name));
            assert_eq!(s.buffer(), s.project().get(name).expect("exists"));
            assert_eq!(s.cursor(), 0);
        }
        assert!(s.switch_file("notes.txt"));
        assert_eq!(s.buffer(), "a\nb");
    }

    #[test]
    fn switching_to_unknown_file_is_rejected() {
        let mut s = session();
        assert!(!s.switch_file("missing.html"));
        assert_eq!(s.active_file(), INDEX_HTML);
    }

    #[test]
    fn switching_closes_suggestions() {
        let mut s = session();
        s.edit("<d".to_string(), 2).expect("edit");
        assert!(s.suggestions.is_open());
        s.switch_file(STYLE_CSS);
        assert!(!s.suggestions.is_open());
    }

    #[test]
    fn edit_persists_and_recomposes_preview() {
        let mut s = session();
        s.edit("<h2>hey</h2>".to_string(), 0).expect("edit");
        assert_eq!(s.project().get(INDEX_HTML), Some("<h2>hey</h2>"));
        assert!(compose_document(s.project()).starts_with("<h2>hey</h2><style>"));
        assert_persisted(&s);
    }

    #[test]
    fn edit_recomputes_suggestions_for_active_kind() {
        let mut s = session();
        s.edit("<d".to_string(), 2).expect("edit");
        let current = s.suggestions.current.as_ref().expect("open");
        assert!(current.candidates.contains(&"div"));
        assert!(!current.candidates.contains(&"ul"));

        s.switch_file(SCRIPT_JS);
        s.edit("di".to_string(), 2).expect("edit");
        assert!(!s.suggestions.is_open());
    }

    #[test]
    fn accepting_style_suggestion_rewrites_buffer_tail() {
        let mut s = session();
        s.switch_file(STYLE_CSS);
        s.edit("col".to_string(), 3).expect("edit");
        assert!(s.accept_suggestion(0).expect("accept"));
        assert_eq!(s.buffer(), "color: ;");
        assert_eq!(s.cursor(), 7);
        assert!(!s.suggestions.is_open());
        assert_eq!(s.project().get(STYLE_CSS), Some("color: ;"));
        assert_persisted(&s);
    }

    #[test]
    fn accepting_without_suggestions_does_nothing() {
        let mut s = session();
        assert!(!s.accept_suggestion(0).expect("accept"));
        assert_eq!(s.buffer(), Project::starter().get(INDEX_HTML).expect("index"));
    }

    #[test]
    fn add_file_creates_empty_file_and_switches() {
        let mut s = session();
        assert_eq!(s.add_file("about.html").expect("add"), AddOutcome::Created);
        assert_eq!(s.active_file(), "about.html");
        assert_eq!(s.buffer(), "");
        assert_persisted(&s);
    }

    #[test]
    fn add_file_ignores_blank_names() {
        let mut s = session();
        assert_eq!(s.add_file("   ").expect("add"), AddOutcome::Ignored);
        assert_eq!(s.project().len(), 3);
    }

    #[test]
    fn add_file_rejects_duplicates_without_clobbering() {
        let mut s = session();
        assert_eq!(s.add_file(STYLE_CSS).expect("add"), AddOutcome::Duplicate);
        assert_eq!(s.project().get(STYLE_CSS), Some("h1 { color: #007bff; }"));
        assert_eq!(s.active_file(), INDEX_HTML);
    }

    #[test]
    fn index_is_never_deletable() {
        let mut s = session();
        s.add_file("about.html").expect("add");
        assert!(s.deletable_files().all(|name| name != INDEX_HTML));
        let mut asked = false;
        let outcome = s
            .delete_file(INDEX_HTML, &mut |_: &str| {
                asked = true;
                true
            })
            .expect("delete");
        assert_eq!(outcome, DeleteOutcome::Refused);
        assert!(!asked);
        assert!(s.project().contains(INDEX_HTML));
    }

    #[test]
    fn deleting_inactive_file_keeps_active() {
        let mut s = session();
        s.switch_file(STYLE_CSS);
        let outcome = s.delete_file(SCRIPT_JS, &mut yes).expect("delete");
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!s.project().contains(SCRIPT_JS));
        assert_eq!(s.active_file(), STYLE_CSS);
        assert!(compose_document(s.project()).ends_with("<script></script>"));
        assert_persisted(&s);
    }

    #[test]
    fn deleting_active_file_falls_back_to_index() {
        let mut s = session();
        s.switch_file(STYLE_CSS);
        s.delete_file(STYLE_CSS, &mut yes).expect("delete");
        assert_eq!(s.active_file(), INDEX_HTML);
        assert_eq!(s.buffer(), s.project().get(INDEX_HTML).expect("index"));
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut s = session();
        let before = s.project().clone();
        let outcome = s.delete_file(STYLE_CSS, &mut no).expect("delete");
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(s.project(), &before);
    }

    #[test]
    fn delete_asks_with_file_name() {
        let mut s = session();
        let mut question = String::new();
        s.delete_file(SCRIPT_JS, &mut |q: &str| {
            question = q.to_string();
            false
        })
        .expect("delete");
        assert_eq!(question, "Delete script.js?");
    }

    #[test]
    fn replace_all_is_literal_and_global() {
        let mut s = session();
        s.edit("foo bar foo".to_string(), 0).expect("edit");
        assert_eq!(s.replace_all("foo", "baz").expect("replace"), 2);
        assert_eq!(s.buffer(), "baz bar baz");
        assert_persisted(&s);

        s.edit("a.b a.b".to_string(), 0).expect("edit");
        assert_eq!(s.replace_all(".", "*").expect("replace"), 2);
        assert_eq!(s.buffer(), "a*b a*b");
    }

    #[test]
    fn replace_with_empty_find_is_a_no_op() {
        let mut s = session();
        let before = s.buffer().to_string();
        assert_eq!(s.replace_all("", "x").expect("replace"), 0);
        assert_eq!(s.buffer(), before);
    }

    #[test]
    fn replace_clamps_cursor_to_shorter_buffer() {
        let mut s = session();
        s.edit("aaaa".to_string(), 4).expect("edit");
        s.replace_all("aa", "b").expect("replace");
        assert_eq!(s.buffer(), "bb");
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn insert_char_advances_cursor() {
        let mut s = session();
        s.edit("ab".to_string(), 1).expect("edit");
        s.insert_char('{').expect("insert");
        assert_eq!(s.buffer(), "a{b");
        assert_eq!(s.cursor(), 2);
        assert_persisted(&s);
    }

    #[test]
    fn write_faults_surface_from_every_mutation() {
        let mut s = failing_session();
        assert_eq!(s.preview_status(), &PreviewStatus::Ready);

        assert_write_fault(s.edit("<d".to_string(), 2));
        assert_write_fault(s.add_file("about.html"));
        assert_write_fault(s.delete_file(STYLE_CSS, &mut yes));
        assert_write_fault(s.replace_all("d", "x"));
        assert_write_fault(s.insert_char(';'));
        assert_eq!(s.preview_status(), &PreviewStatus::Ready);

        let mut s = failing_session();
        s.buffer = "<d".to_string();
        s.cursor = 2;
        s.refresh_suggestions();
        assert!(s.suggestions.is_open());
        assert_write_fault(s.accept_suggestion(0));

        assert_eq!(s.preview_status(), &PreviewStatus::Ready);
    }

    #[test]
    fn toggle_search_flips_open_flag() {
        let mut s = session();
        assert!(s.toggle_search());
        assert!(!s.toggle_search());
    }

    #[test]
    fn preview_errors_become_status_not_failures() {
        let mut s = Session::open(
            FileStore::new(Box::new(MemoryStorage::default())),
            Box::new(MemorySandbox {
                fail_with: Some("blocked".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(s.preview_status().message(), "Error: blocked");
        s.edit("x".to_string(), 1).expect("edit still succeeds");
        assert!(s.preview_status().is_error());
    }

    #[test]
    fn download_writes_pretty_snapshot_that_reimports() {
        let tmp = tempdir().expect("tempdir");
        let mut s = session();
        s.add_file("about.html").expect("add");
        s.edit("<p>about</p>".to_string(), 0).expect("edit");
        let path = s.download(tmp.path()).expect("download");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(EXPORT_FILE));
        let bytes = fs::read(&path).expect("read");
        assert!(String::from_utf8_lossy(&bytes).contains("\n  \"about.html\": "));
        assert_eq!(&decode_snapshot(&bytes).expect("decode"), s.project());
    }
}
