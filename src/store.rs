use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::project::Project;

pub(crate) const SNAPSHOT_FILE: &str = "esmart_files.json";
pub(crate) const EXPORT_FILE: &str = "esmart_project.json";

/// A single-key storage medium holding the serialized project.
pub(crate) trait Storage {
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&mut self, raw: &str) -> io::Result<()>;
}

pub(crate) struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SNAPSHOT_FILE))
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, raw: &str) -> io::Result<()> {
        write_replacing(&self.path, raw.as_bytes())
    }
}

/// Writes to a sibling temp file and renames it over `path`, so readers see
/// either the old or the new contents.
pub(crate) fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStorage {
    pub(crate) value: Option<String>,
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, raw: &str) -> io::Result<()> {
        self.value = Some(raw.to_string());
        Ok(())
    }
}

pub(crate) struct FileStore {
    storage: Box<dyn Storage>,
}

impl FileStore {
    pub(crate) fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Loads the saved project. Missing or unreadable snapshots fall back to
    /// the starter project; this never fails.
    pub(crate) fn load(&self) -> Project {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved project, using starter files");
                return Project::starter();
            }
            Err(err) => {
                warn!("failed to read saved project: {err}");
                return Project::starter();
            }
        };
        match decode_snapshot(raw.as_bytes()) {
            Ok(mut project) => {
                project.ensure_index();
                project
            }
            Err(err) => {
                warn!("ignoring saved project: {err}");
                Project::starter()
            }
        }
    }

    pub(crate) fn save(&mut self, project: &Project) -> Result<(), StoreError> {
        let raw = serde_json::to_string(project).map_err(StoreError::Encode)?;
        self.storage.write(&raw)?;
        debug!(files = project.len(), bytes = raw.len(), "project saved");
        Ok(())
    }
}

/// Pretty-printed (two-space) JSON of the whole project, for download.
pub(crate) fn export_snapshot(project: &Project) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(project).map_err(StoreError::Encode)
}

pub(crate) fn decode_snapshot(bytes: &[u8]) -> Result<Project, StoreError> {
    serde_json::from_slice(bytes).map_err(StoreError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{INDEX_HTML, STYLE_CSS};
    use tempfile::tempdir;

    fn memory_store(value: Option<&str>) -> FileStore {
        FileStore::new(Box::new(MemoryStorage {
            value: value.map(str::to_string),
        }))
    }

    #[test]
    fn load_without_snapshot_returns_starter() {
        assert_eq!(memory_store(None).load(), Project::starter());
    }

    #[test]
    fn load_malformed_snapshot_returns_starter() {
        assert_eq!(memory_store(Some("{not json")).load(), Project::starter());
        assert_eq!(
            memory_store(Some(r#"{"index.html": null}"#)).load(),
            Project::starter()
        );
    }

    #[test]
    fn load_restores_missing_index() {
        let project = memory_store(Some(r#"{"about.html":"hi"}"#)).load();
        assert_eq!(project.get(INDEX_HTML), Some(""));
        assert_eq!(project.get("about.html"), Some("hi"));
    }

    #[test]
    fn save_then_load_round_trips_through_files() {
        let tmp = tempdir().expect("tempdir");
        let mut store = FileStore::new(Box::new(FileStorage::in_dir(tmp.path())));
        let mut project = Project::starter();
        project.insert("about.html", "<p>about</p>");
        store.save(&project).expect("save");
        assert!(tmp.path().join(SNAPSHOT_FILE).exists());
        assert!(!tmp.path().join(format!("{SNAPSHOT_FILE}.tmp")).exists());

        let reopened = FileStore::new(Box::new(FileStorage::in_dir(tmp.path())));
        assert_eq!(reopened.load(), project);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let tmp = tempdir().expect("tempdir");
        let mut store = FileStore::new(Box::new(FileStorage::in_dir(tmp.path())));
        let mut project = Project::starter();
        store.save(&project).expect("save");
        project.remove(STYLE_CSS);
        store.save(&project).expect("save again");
        assert_eq!(store.load(), project);
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let tmp = tempdir().expect("tempdir");
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "file, not dir").expect("write");
        let mut store = FileStore::new(Box::new(FileStorage::new(blocker.join("x.json"))));
        assert!(store.save(&Project::starter()).is_err());
    }

    #[test]
    fn export_is_two_space_pretty_json() {
        let mut project = Project::default();
        project.insert(INDEX_HTML, "<h1>x</h1>");
        let bytes = export_snapshot(&project).expect("export");
        let text = String::from_utf8(bytes).expect("utf8");
        assert_eq!(text, "{\n  \"index.html\": \"<h1>x</h1>\"\n}");
    }

    #[test]
    fn export_then_decode_yields_equal_project() {
        let mut project = Project::starter();
        project.insert("notes.txt", "line 1\nline \"2\"\t✓");
        let bytes = export_snapshot(&project).expect("export");
        assert_eq!(decode_snapshot(&bytes).expect("decode"), project);
    }
}
