use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::fs::tree::{DirLister, EntryMeta, NodeType};
use crate::resource::ResourceRef;
use crate::tree::TreeView;

/// Directory navigator pane: a lazily expanded tree rooted at `root`, whose
/// root row is hidden.
#[derive(Debug)]
pub struct NavPane {
    view: TreeView<PathBuf, EntryMeta>,
    lister: DirLister,
    root: PathBuf,
    focused: bool,
}

impl NavPane {
    pub fn new(root: PathBuf, show_hidden: bool) -> Self {
        let lister = DirLister::new(show_hidden);
        let view = TreeView::new(lister.build(&root), 1);
        info!(root = %root.display(), "navigator rooted");
        Self {
            view,
            lister,
            root,
            focused: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn view(&self) -> &TreeView<PathBuf, EntryMeta> {
        &self.view
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn show_hidden(&self) -> bool {
        self.lister.show_hidden
    }

    pub fn set_extent(&mut self, _width: u16, height: u16) {
        self.view.resize(height as usize);
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.view.selected_id().map(PathBuf::as_path)
    }

    /// Handle a key while focused. Returns the file the user opened, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ResourceRef> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.move_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.view.move_by(-1),
            KeyCode::Char('d') if ctrl => self.view.half_page_down(),
            KeyCode::Char('u') if ctrl => self.view.half_page_up(),
            KeyCode::PageDown => self.view.half_page_down(),
            KeyCode::PageUp => self.view.half_page_up(),
            KeyCode::Char('g') | KeyCode::Home => self.view.jump_to_start(),
            KeyCode::Char('G') | KeyCode::End => self.view.jump_to_end(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => return self.toggle_or_open(),
            KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => {
                self.go_to_parent();
            }
            KeyCode::Char('.') => self.toggle_hidden(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        None
    }

    /// Toggle the selected directory, or return the selected file.
    pub fn toggle_or_open(&mut self) -> Option<ResourceRef> {
        let node = self.view.selected()?;
        match node.data.node_type {
            NodeType::Directory => {
                let lister = self.lister;
                self.view.toggle_selected_with(&lister);
                None
            }
            NodeType::File | NodeType::Symlink => Some(ResourceRef::new(node.id.clone())),
        }
    }

    /// Re-root one level up, keeping expanded directories expanded and
    /// putting the cursor on the directory we came from. No-op at `/`.
    ///
    /// Listing runs inline on the event loop, like expand and reload; only
    /// file contents go through background commands.
    pub fn go_to_parent(&mut self) -> bool {
        let Some(parent) = self.root.parent().map(Path::to_path_buf) else {
            return false;
        };
        let expanded = self.view.tree().expanded_ids();
        let mut tree = self.lister.build(&parent);
        tree.restore_expanded(&expanded, &self.lister);

        let old_root = std::mem::replace(&mut self.root, parent);
        self.view.replace_tree(tree, Some(&old_root));
        debug!(root = %self.root.display(), "moved to parent");
        true
    }

    /// Flip hidden-entry filtering and re-list everything that is loaded.
    pub fn toggle_hidden(&mut self) {
        self.lister.show_hidden = !self.lister.show_hidden;
        self.reload();
    }

    /// Re-list loaded directories, keeping expansion and the cursor.
    pub fn reload(&mut self) {
        let lister = self.lister;
        self.view.update(|tree| tree.reload(&lister));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("proj")).unwrap();
        fs::create_dir(dir.path().join("proj").join("src")).unwrap();
        File::create(dir.path().join("proj").join("src").join("main.rs")).unwrap();
        File::create(dir.path().join("proj").join("README.md")).unwrap();
        File::create(dir.path().join("proj").join(".env")).unwrap();
        File::create(dir.path().join("top.txt")).unwrap();
        dir
    }

    fn labels(pane: &NavPane) -> Vec<String> {
        pane.view()
            .tree()
            .visible()
            .map(|e| e.node.label.clone())
            .collect()
    }

    fn pane_at(dir: &Path) -> NavPane {
        let mut pane = NavPane::new(dir.to_path_buf(), false);
        pane.set_extent(30, 10);
        pane
    }

    #[test]
    fn opening_a_file_returns_resource() {
        let dir = setup();
        let mut pane = pane_at(&dir.path().join("proj"));
        assert_eq!(labels(&pane), ["src", "README.md"]);
        pane.handle_key(key(KeyCode::Char('j')));
        let opened = pane.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(opened.path(), dir.path().join("proj").join("README.md"));
        assert_eq!(opened.tag(), "md");
    }

    #[test]
    fn enter_toggles_directories() {
        let dir = setup();
        let mut pane = pane_at(&dir.path().join("proj"));
        assert!(pane.handle_key(key(KeyCode::Char('l'))).is_none());
        assert_eq!(labels(&pane), ["src", "main.rs", "README.md"]);
        pane.handle_key(key(KeyCode::Right));
        assert_eq!(labels(&pane), ["src", "README.md"]);
        assert_eq!(pane.selected_path(), Some(dir.path().join("proj").join("src").as_path()));
    }

    #[test]
    fn go_to_parent_selects_previous_root() {
        let dir = setup();
        let proj = dir.path().join("proj");
        let mut pane = pane_at(&proj);
        pane.handle_key(key(KeyCode::Enter));
        pane.handle_key(key(KeyCode::Char('h')));
        assert_eq!(pane.root(), dir.path());
        assert_eq!(pane.selected_path(), Some(proj.as_path()));
        // The old root and its expanded child stay open.
        assert_eq!(labels(&pane), ["proj", "src", "main.rs", "README.md", "top.txt"]);
    }

    #[test]
    fn go_to_parent_at_filesystem_root_is_noop() {
        let mut pane = NavPane::new(PathBuf::from("/"), false);
        assert!(!pane.go_to_parent());
        assert_eq!(pane.root(), Path::new("/"));
    }

    #[test]
    fn toggle_hidden_keeps_cursor() {
        let dir = setup();
        let mut pane = pane_at(&dir.path().join("proj"));
        pane.handle_key(key(KeyCode::Char('G')));
        assert_eq!(labels(&pane), ["src", "README.md"]);
        pane.handle_key(key(KeyCode::Char('.')));
        assert!(pane.show_hidden());
        assert_eq!(labels(&pane), ["src", ".env", "README.md"]);
        assert_eq!(
            pane.selected_path(),
            Some(dir.path().join("proj").join("README.md").as_path())
        );
    }

    #[test]
    fn reload_drops_deleted_selection_and_clamps() {
        let dir = setup();
        let proj = dir.path().join("proj");
        let mut pane = pane_at(&proj);
        pane.handle_key(key(KeyCode::Char('G')));
        fs::remove_file(proj.join("README.md")).unwrap();
        pane.handle_key(key(KeyCode::Char('r')));
        assert_eq!(labels(&pane), ["src"]);
        assert_eq!(pane.selected_path(), Some(proj.join("src").as_path()));
    }

    #[test]
    fn empty_directory_has_no_selection() {
        let dir = TempDir::new().unwrap();
        let mut pane = pane_at(dir.path());
        assert!(pane.selected_path().is_none());
        assert!(pane.handle_key(key(KeyCode::Enter)).is_none());
        pane.handle_key(key(KeyCode::Char('j')));
        assert_eq!(pane.view().viewport().cursor(), 0);
    }
}
