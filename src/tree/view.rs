use std::hash::Hash;

use super::{ChildLoader, FlatEntry, Tree, TreeNode};
use crate::viewport::Viewport;

/// A tree as owned by a pane: the model, the viewport over its visible
/// sequence, and the identities of that sequence in display order.
///
/// `rows` is rebuilt after every change to the visible sequence. When a
/// rebuild happens, the previously selected identity is looked up in the
/// new sequence; if it is gone the cursor is clamped instead.
#[derive(Debug, Clone)]
pub struct TreeView<K, V> {
    tree: Tree<K, V>,
    rows: Vec<K>,
    viewport: Viewport,
}

impl<K, V> TreeView<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(tree: Tree<K, V>, height: usize) -> Self {
        let mut view = Self {
            tree,
            rows: Vec::new(),
            viewport: Viewport::new(height),
        };
        view.refresh(None);
        view
    }

    pub fn tree(&self) -> &Tree<K, V> {
        &self.tree
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected_id(&self) -> Option<&K> {
        self.rows.get(self.viewport.cursor())
    }

    pub fn selected(&self) -> Option<&TreeNode<K, V>> {
        self.tree.get(self.selected_id()?)
    }

    /// Position of `id` in the visible sequence.
    pub fn position(&self, id: &K) -> Option<usize> {
        self.rows.iter().position(|row| row == id)
    }

    /// Rows inside the viewport, with their absolute indices.
    pub fn window(&self) -> impl Iterator<Item = (usize, FlatEntry<'_, K, V>)> {
        let range = self.viewport.visible_range(self.rows.len());
        self.tree
            .visible()
            .enumerate()
            .skip(range.start)
            .take(range.len())
    }

    pub fn move_by(&mut self, delta: isize) {
        self.viewport.move_by(delta, self.rows.len());
    }

    pub fn jump_to_start(&mut self) {
        self.viewport.jump_to_start(self.rows.len());
    }

    pub fn jump_to_end(&mut self) {
        self.viewport.jump_to_end(self.rows.len());
    }

    pub fn half_page_down(&mut self) {
        self.viewport.half_page_down(self.rows.len());
    }

    pub fn half_page_up(&mut self) {
        self.viewport.half_page_up(self.rows.len());
    }

    pub fn resize(&mut self, height: usize) {
        self.viewport.resize(height, self.rows.len());
    }

    /// Move the cursor onto `id` if it is visible.
    pub fn select_id(&mut self, id: &K) -> bool {
        match self.position(id) {
            Some(index) => {
                self.viewport.select(index, self.rows.len());
                true
            }
            None => false,
        }
    }

    /// Rebuild `rows` from the tree, then put the cursor back on `prefer`
    /// when it is still visible.
    pub fn refresh(&mut self, prefer: Option<&K>) {
        self.rows = self.tree.visible().map(|e| e.node.id.clone()).collect();
        let found = prefer.and_then(|id| self.position(id));
        match found {
            Some(index) => self.viewport.select(index, self.rows.len()),
            None => self.viewport.clamp(self.rows.len()),
        }
    }

    /// Swap in a rebuilt tree, keeping the cursor on `prefer` (or on the
    /// current selection when `prefer` is `None`).
    pub fn replace_tree(&mut self, tree: Tree<K, V>, prefer: Option<&K>) {
        let anchor = prefer.or(self.selected_id()).cloned();
        self.tree = tree;
        self.refresh(anchor.as_ref());
    }

    /// Apply a structural change to the tree, keeping the selected identity.
    pub fn update<F>(&mut self, change: F)
    where
        F: FnOnce(&mut Tree<K, V>),
    {
        let anchor = self.selected_id().cloned();
        change(&mut self.tree);
        self.refresh(anchor.as_ref());
    }

    /// Toggle the selected container whose children are already built.
    pub fn toggle_selected(&mut self) -> bool {
        let Some(id) = self.selected_id().cloned() else {
            return false;
        };
        let changed = self.tree.toggle_expand(&id);
        if changed {
            self.refresh(Some(&id));
        }
        changed
    }

    /// Toggle the selected container, enumerating it through `loader` on
    /// first expand.
    pub fn toggle_selected_with<L>(&mut self, loader: &L) -> bool
    where
        L: ChildLoader<K, V>,
    {
        let Some(id) = self.selected_id().cloned() else {
            return false;
        };
        let changed = self.tree.toggle_expand_with(&id, loader);
        if changed {
            self.refresh(Some(&id));
        }
        changed
    }

    /// Collapse the selected node if it is expanded, otherwise move the
    /// cursor to its parent.
    pub fn collapse_or_parent(&mut self) {
        let Some(id) = self.selected_id().cloned() else {
            return;
        };
        if self.tree.collapse(&id) {
            self.refresh(Some(&id));
        } else if let Some(parent) = self.tree.parent_id(&id).cloned() {
            self.select_id(&parent);
        }
    }
}
