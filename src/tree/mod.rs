//! Hierarchical node set with expand/collapse state.
//!
//! The same `Tree` backs the directory navigator (identity = path, children
//! enumerated lazily on first expand) and the JSON viewer (identity =
//! key-path, children built up front by the parser). Nodes are located
//! through an identity-indexed table of child-index paths that is rebuilt
//! after every structural change, so no references into the tree are ever
//! retained across a rebuild.

pub mod view;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub use view::TreeView;

/// One entry in a hierarchical structure.
///
/// A node with `has_children == false` always has `expanded == false` and no
/// children. `loaded` records whether a container's children have been
/// enumerated yet.
#[derive(Debug, Clone)]
pub struct TreeNode<K, V> {
    pub id: K,
    pub label: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub loaded: bool,
    pub children: Vec<TreeNode<K, V>>,
    pub data: V,
}

impl<K, V> TreeNode<K, V> {
    pub fn leaf(id: K, label: impl Into<String>, data: V) -> Self {
        Self {
            id,
            label: label.into(),
            depth: 0,
            has_children: false,
            expanded: false,
            loaded: true,
            children: Vec::new(),
            data,
        }
    }

    /// A container whose children are not enumerated yet.
    pub fn container(id: K, label: impl Into<String>, data: V) -> Self {
        Self {
            has_children: true,
            loaded: false,
            ..Self::leaf(id, label, data)
        }
    }

    /// Attach an already-built child sequence; the node becomes a loaded
    /// container.
    pub fn with_children(mut self, children: Vec<TreeNode<K, V>>) -> Self {
        self.has_children = true;
        self.loaded = true;
        self.children = children;
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded && self.has_children;
        self
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }
}

/// Source of children for lazily populated containers.
pub trait ChildLoader<K, V> {
    /// Enumerate the children of `parent`, already ordered. A container that
    /// cannot be enumerated yields an empty sequence.
    fn load_children(&self, parent: &TreeNode<K, V>) -> Vec<TreeNode<K, V>>;
}

/// A visible node paired with the depth it is displayed at.
#[derive(Debug)]
pub struct FlatEntry<'a, K, V> {
    pub node: &'a TreeNode<K, V>,
    pub depth: usize,
}

/// Depth-first pre-order walk over the visible nodes.
///
/// Cheap to create and restartable: each call to [`Tree::visible`] starts a
/// fresh walk over the current `expanded` flags.
pub struct Visible<'a, K, V> {
    stack: Vec<&'a TreeNode<K, V>>,
    depth_shift: usize,
}

impl<'a, K, V> Iterator for Visible<'a, K, V> {
    type Item = FlatEntry<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if node.expanded {
            self.stack.extend(node.children.iter().rev());
        }
        Some(FlatEntry {
            node,
            depth: node.depth.saturating_sub(self.depth_shift),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Tree<K, V> {
    root: TreeNode<K, V>,
    show_root: bool,
    index: HashMap<K, Vec<usize>>,
}

impl<K, V> Tree<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Build a tree. When `show_root` is false the root is not part of the
    /// visible sequence, it is kept expanded, and its children are shown at
    /// display depth 0.
    pub fn new(mut root: TreeNode<K, V>, show_root: bool) -> Self {
        root.set_depth(0);
        if !show_root {
            root.expanded = root.has_children;
        }
        let mut tree = Self {
            root,
            show_root,
            index: HashMap::new(),
        };
        tree.reindex();
        tree
    }

    pub fn root(&self) -> &TreeNode<K, V> {
        &self.root
    }

    pub fn get(&self, id: &K) -> Option<&TreeNode<K, V>> {
        let path = self.index.get(id)?;
        let mut node = &self.root;
        for &i in path {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    fn get_mut(&mut self, id: &K) -> Option<&mut TreeNode<K, V>> {
        let path = self.index.get(id)?;
        let mut node = &mut self.root;
        for &i in path {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    /// Identity of the parent of `id`, if `id` is not the root.
    pub fn parent_id(&self, id: &K) -> Option<&K> {
        let path = self.index.get(id)?;
        let (_, parent_path) = path.split_last()?;
        let mut node = &self.root;
        for &i in parent_path {
            node = node.children.get(i)?;
        }
        Some(&node.id)
    }

    /// The current visible sequence.
    pub fn visible(&self) -> Visible<'_, K, V> {
        if self.show_root {
            Visible {
                stack: vec![&self.root],
                depth_shift: 0,
            }
        } else {
            let stack = if self.root.expanded {
                self.root.children.iter().rev().collect()
            } else {
                Vec::new()
            };
            Visible {
                stack,
                depth_shift: 1,
            }
        }
    }

    fn reindex(&mut self) {
        fn walk<K: Clone + Eq + Hash, V>(
            node: &TreeNode<K, V>,
            path: &mut Vec<usize>,
            index: &mut HashMap<K, Vec<usize>>,
        ) {
            index.insert(node.id.clone(), path.clone());
            for (i, child) in node.children.iter().enumerate() {
                path.push(i);
                walk(child, path, index);
                path.pop();
            }
        }

        self.index.clear();
        walk(&self.root, &mut Vec::new(), &mut self.index);
    }

    /// Flip `expanded` on a container whose children are already present.
    /// Returns false for unknown ids, childless nodes, and unloaded
    /// containers that would need a loader to expand.
    pub fn toggle_expand(&mut self, id: &K) -> bool {
        match self.get_mut(id) {
            Some(node) if node.has_children && (node.loaded || node.expanded) => {
                node.expanded = !node.expanded;
                true
            }
            _ => false,
        }
    }

    /// Like [`Tree::toggle_expand`], but enumerates an unloaded container
    /// through `loader` before expanding it.
    pub fn toggle_expand_with<L>(&mut self, id: &K, loader: &L) -> bool
    where
        L: ChildLoader<K, V>,
    {
        let expanding = match self.get(id) {
            Some(node) => node.has_children && !node.expanded,
            None => return false,
        };
        if expanding {
            self.expand_with(id, loader)
        } else {
            self.toggle_expand(id)
        }
    }

    /// Expand `id`, enumerating its children first if needed.
    pub fn expand_with<L>(&mut self, id: &K, loader: &L) -> bool
    where
        L: ChildLoader<K, V>,
    {
        let needs_load = match self.get(id) {
            Some(node) if node.has_children => !node.loaded,
            _ => return false,
        };
        if needs_load {
            let children = match self.get(id) {
                Some(node) => loader.load_children(node),
                None => return false,
            };
            if let Some(node) = self.get_mut(id) {
                let depth = node.depth;
                node.children = children;
                node.loaded = true;
                node.set_depth(depth);
            }
            self.reindex();
        }
        match self.get_mut(id) {
            Some(node) => {
                node.expanded = true;
                true
            }
            None => false,
        }
    }

    pub fn collapse(&mut self, id: &K) -> bool {
        match self.get_mut(id) {
            Some(node) if node.expanded => {
                node.expanded = false;
                true
            }
            _ => false,
        }
    }

    /// Identities of every expanded node, the root included.
    pub fn expanded_ids(&self) -> HashSet<K> {
        fn walk<K: Clone + Eq + Hash, V>(node: &TreeNode<K, V>, out: &mut HashSet<K>) {
            if node.expanded {
                out.insert(node.id.clone());
            }
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut out = HashSet::new();
        walk(&self.root, &mut out);
        out
    }

    /// Re-expand every node in `expanded` that exists in this tree.
    ///
    /// Parents are expanded before their children so nested containers are
    /// found once their parent has been enumerated.
    pub fn restore_expanded<L>(&mut self, expanded: &HashSet<K>, loader: &L)
    where
        L: ChildLoader<K, V>,
    {
        let mut pending: Vec<&K> = expanded.iter().collect();
        loop {
            let before = pending.len();
            pending.retain(|id| {
                if self.contains(id) {
                    self.expand_with(*id, loader);
                    false
                } else {
                    true
                }
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
    }

    /// Re-enumerate every loaded container, keeping the expanded state and
    /// loaded subtrees of entries that still exist. Entries that vanished are
    /// dropped with their subtrees.
    pub fn reload<L>(&mut self, loader: &L)
    where
        L: ChildLoader<K, V>,
    {
        fn refresh<K: Clone + Eq + Hash, V, L: ChildLoader<K, V>>(
            node: &mut TreeNode<K, V>,
            loader: &L,
        ) {
            if !node.has_children || !node.loaded {
                return;
            }
            let mut previous: HashMap<K, TreeNode<K, V>> = node
                .children
                .drain(..)
                .map(|child| (child.id.clone(), child))
                .collect();
            let mut fresh = loader.load_children(node);
            for child in &mut fresh {
                if let Some(old) = previous.remove(&child.id) {
                    if old.has_children && child.has_children && old.loaded {
                        child.expanded = old.expanded;
                        child.children = old.children;
                        child.loaded = true;
                        refresh(child, loader);
                    }
                }
            }
            node.children = fresh;
        }

        refresh(&mut self.root, loader);
        self.root.set_depth(0);
        self.reindex();
    }
}
