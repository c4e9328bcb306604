use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ContentError;
use crate::tree::{ChildLoader, Tree, TreeNode};

/// Hidden entries that are listed even when hidden entries are off.
pub const HIDDEN_ALLOW_LIST: &[&str] = &[".git"];

/// Type of filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
    Symlink,
}

/// Per-entry payload stored in the directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub node_type: NodeType,
    pub is_hidden: bool,
}

pub type DirNode = TreeNode<PathBuf, EntryMeta>;
pub type DirTree = Tree<PathBuf, EntryMeta>;

/// Whether an entry name passes the hidden-entry filter.
pub fn is_listed(name: &str, show_hidden: bool) -> bool {
    show_hidden || !name.starts_with('.') || HIDDEN_ALLOW_LIST.contains(&name)
}

/// Enumerates directories for the navigator tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirLister {
    pub show_hidden: bool,
}

impl DirLister {
    pub fn new(show_hidden: bool) -> Self {
        Self { show_hidden }
    }

    /// Build a node for a single path without reading its children.
    pub fn node_for(path: &Path) -> std::io::Result<DirNode> {
        let metadata = fs::symlink_metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let node_type = if metadata.is_symlink() {
            NodeType::Symlink
        } else if metadata.is_dir() {
            NodeType::Directory
        } else {
            NodeType::File
        };
        let meta = EntryMeta {
            node_type,
            is_hidden: name.starts_with('.'),
        };

        Ok(match node_type {
            NodeType::Directory => TreeNode::container(path.to_path_buf(), name, meta),
            _ => TreeNode::leaf(path.to_path_buf(), name, meta),
        })
    }

    /// List a directory: hidden entries filtered, directories first, then
    /// case-insensitive by name. Entries that vanish or cannot be stat'ed
    /// while listing are skipped.
    pub fn list(&self, dir: &Path) -> Result<Vec<DirNode>, ContentError> {
        let entries = fs::read_dir(dir).map_err(|e| ContentError::enumeration(dir, e))?;

        let mut children: Vec<DirNode> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_listed(&entry.file_name().to_string_lossy(), self.show_hidden))
            .filter_map(|entry| Self::node_for(&entry.path()).ok())
            .collect();

        children.sort_by(|a, b| {
            let a_dir = a.data.node_type == NodeType::Directory;
            let b_dir = b.data.node_type == NodeType::Directory;
            b_dir
                .cmp(&a_dir)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
        });
        Ok(children)
    }

    /// Build a tree rooted at `root` with the root's children enumerated.
    /// The root itself is not displayed.
    pub fn build(&self, root: &Path) -> DirTree {
        let mut node = match Self::node_for(root) {
            Ok(node) => node,
            Err(e) => {
                warn!(path = %root.display(), error = %e, "cannot stat tree root");
                let name = root.to_string_lossy().to_string();
                TreeNode::container(
                    root.to_path_buf(),
                    name,
                    EntryMeta {
                        node_type: NodeType::Directory,
                        is_hidden: false,
                    },
                )
            }
        };
        if node.has_children {
            let children = self.load_children(&node);
            node = node.with_children(children);
        }
        Tree::new(node, false)
    }
}

impl ChildLoader<PathBuf, EntryMeta> for DirLister {
    fn load_children(&self, parent: &DirNode) -> Vec<DirNode> {
        match self.list(&parent.id) {
            Ok(children) => {
                debug!(path = %parent.id.display(), count = children.len(), "listed directory");
                children
            }
            Err(e) => {
                warn!(error = %e, "directory listing failed, showing it as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn labels(tree: &DirTree) -> Vec<String> {
        tree.visible().map(|e| e.node.label.clone()).collect()
    }

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        File::create(dir.path().join("A.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        dir
    }

    #[test]
    fn containers_first_then_case_insensitive() {
        let dir = setup_test_dir();
        let tree = DirLister::default().build(dir.path());
        assert_eq!(labels(&tree), ["sub", "A.txt", "b.txt"]);
        assert!(tree.visible().all(|e| e.depth == 0));
        assert!(tree.visible().all(|e| !e.node.expanded));
    }

    #[test]
    fn hidden_entries_filtered_except_allow_list() {
        let dir = setup_test_dir();
        File::create(dir.path().join(".env")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let tree = DirLister::default().build(dir.path());
        assert_eq!(labels(&tree), [".git", "sub", "A.txt", "b.txt"]);

        let all = DirLister::new(true).build(dir.path());
        assert!(labels(&all).contains(&".env".to_string()));
    }

    #[test]
    fn directories_expand_lazily() {
        let dir = setup_test_dir();
        File::create(dir.path().join("sub").join("inner.rs")).unwrap();
        let lister = DirLister::default();
        let mut tree = lister.build(dir.path());
        let sub = dir.path().join("sub");

        let node = tree.get(&sub).unwrap();
        assert!(node.has_children);
        assert!(!node.loaded);

        assert!(tree.toggle_expand_with(&sub, &lister));
        assert_eq!(labels(&tree), ["sub", "inner.rs", "A.txt", "b.txt"]);
        let inner = tree.get(&sub.join("inner.rs")).unwrap();
        assert_eq!(inner.depth, 2);
    }

    #[test]
    fn files_are_leaves() {
        let dir = setup_test_dir();
        let lister = DirLister::default();
        let mut tree = lister.build(dir.path());
        let file = dir.path().join("A.txt");
        assert!(!tree.toggle_expand_with(&file, &lister));
        assert!(!tree.get(&file).unwrap().has_children);
    }

    #[test]
    fn unreadable_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            DirLister::default().list(&missing),
            Err(ContentError::Enumeration { .. })
        ));
        let node = TreeNode::container(
            missing.clone(),
            "gone",
            EntryMeta {
                node_type: NodeType::Directory,
                is_hidden: false,
            },
        );
        assert!(DirLister::default().load_children(&node).is_empty());
    }

    #[test]
    fn empty_directory_has_no_rows() {
        let dir = TempDir::new().unwrap();
        let tree = DirLister::default().build(dir.path());
        assert_eq!(tree.visible().count(), 0);
    }

    #[test]
    fn reload_picks_up_new_entries() {
        let dir = setup_test_dir();
        let lister = DirLister::default();
        let mut tree = lister.build(dir.path());
        File::create(dir.path().join("c.txt")).unwrap();
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        tree.reload(&lister);
        assert_eq!(labels(&tree), ["sub", "A.txt", "c.txt"]);
    }
}
