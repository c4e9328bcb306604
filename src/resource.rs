use std::path::{Path, PathBuf};

/// Extensions the inline editor accepts. An empty tag (no extension) is
/// accepted too.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt",
    "md",
    "markdown",
    "go",
    "py",
    "js",
    "ts",
    "json",
    "yaml",
    "yml",
    "toml",
    "html",
    "css",
    "xml",
    "sh",
    "bash",
    "zsh",
    "c",
    "h",
    "cpp",
    "hpp",
    "rs",
    "rb",
    "java",
    "sql",
    "graphql",
    "conf",
    "cfg",
    "ini",
    "gitignore",
    "dockerignore",
    "",
];

/// A file the user selected: its path plus the lowercase extension used to
/// pick a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    path: PathBuf,
    tag: String,
}

impl ResourceRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tag = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, tag }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Capability tag: lowercase extension without the dot, empty if none.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    pub fn is_editable_text(&self) -> bool {
        TEXT_EXTENSIONS.contains(&self.tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_lowercase_extension() {
        assert_eq!(ResourceRef::new("/a/README.MD").tag(), "md");
        assert_eq!(ResourceRef::new("/a/data.Json").tag(), "json");
        assert_eq!(ResourceRef::new("/a/Makefile").tag(), "");
    }

    #[test]
    fn dotfile_has_empty_tag() {
        let r = ResourceRef::new("/repo/.gitignore");
        assert_eq!(r.tag(), "");
        assert!(r.is_editable_text());
    }

    #[test]
    fn editable_text_allow_list() {
        assert!(ResourceRef::new("main.rs").is_editable_text());
        assert!(ResourceRef::new("notes.txt").is_editable_text());
        assert!(ResourceRef::new("Makefile").is_editable_text());
        assert!(!ResourceRef::new("photo.png").is_editable_text());
        assert!(!ResourceRef::new("archive.tar.gz").is_editable_text());
    }

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(ResourceRef::new("/x/y/notes.txt").file_name(), "notes.txt");
    }
}
