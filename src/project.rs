use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) const INDEX_HTML: &str = "index.html";
pub(crate) const STYLE_CSS: &str = "style.css";
pub(crate) const SCRIPT_JS: &str = "script.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProjectFile {
    pub(crate) name: String,
    pub(crate) content: String,
}

/// Files of one editing session, kept in insertion order.
///
/// Serializes as a plain JSON object (`name -> content`) so snapshots stay
/// readable and hand-editable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Project {
    files: Vec<ProjectFile>,
}

impl Project {
    pub(crate) fn starter() -> Self {
        let mut project = Self::default();
        project.insert(INDEX_HTML, "<h1>E-Smart IDE</h1>\n<p>Start coding!</p>");
        project.insert(STYLE_CSS, "h1 { color: #007bff; }");
        project.insert(SCRIPT_JS, "console.log('Hello World');");
        project
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.content.as_str())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    /// Sets `name` to `content`, appending the file when it is new.
    pub(crate) fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        if let Some(file) = self.files.iter_mut().find(|f| f.name == name) {
            file.content = content;
        } else {
            self.files.push(ProjectFile { name, content });
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.files.iter().position(|f| f.name == name)?;
        Some(self.files.remove(idx).content)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    /// Restores the `index.html` invariant for snapshots that lost it.
    pub(crate) fn ensure_index(&mut self) {
        if !self.contains(INDEX_HTML) {
            self.files.insert(
                0,
                ProjectFile {
                    name: INDEX_HTML.to_string(),
                    content: String::new(),
                },
            );
        }
    }
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.files.iter().map(|f| (&f.name, &f.content)))
    }
}

impl<'de> Deserialize<'de> for Project {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProjectVisitor;

        impl<'de> Visitor<'de> for ProjectVisitor {
            type Value = Project;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of file names to file contents")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Project, A::Error> {
                let mut project = Project::default();
                while let Some((name, content)) = map.next_entry::<String, String>()? {
                    project.insert(name, content);
                }
                Ok(project)
            }
        }

        deserializer.deserialize_map(ProjectVisitor)
    }
}
