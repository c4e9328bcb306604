//! JSON documents as a collapsible tree.
//!
//! Node identities are JSON Pointers (RFC 6901): the root is `""`, object
//! members append `/<escaped key>`, array elements append `/<index>`. Object
//! members keep document order.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use crate::error::ContentError;
use crate::fs::operations;
use crate::resource::ResourceRef;
use crate::tree::{Tree, TreeNode, TreeView};

/// How a node is addressed by its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonKey {
    Root,
    Name(String),
    Index(usize),
}

/// Payload of a JSON node. Containers keep only their size; their members
/// are the node's children.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Object(usize),
    Array(usize),
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonEntry {
    pub key: JsonKey,
    pub value: JsonValue,
}

pub type JsonNode = TreeNode<String, JsonEntry>;
pub type JsonTree = Tree<String, JsonEntry>;

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn build_node(pointer: String, key: JsonKey, value: &Value) -> JsonNode {
    let label = match &key {
        JsonKey::Root => String::new(),
        JsonKey::Name(name) => name.clone(),
        JsonKey::Index(i) => format!("[{i}]"),
    };
    let entry = |value| JsonEntry {
        key: key.clone(),
        value,
    };

    match value {
        Value::Object(map) if !map.is_empty() => {
            let children = map
                .iter()
                .map(|(k, v)| {
                    let child = format!("{pointer}/{}", escape_token(k));
                    build_node(child, JsonKey::Name(k.clone()), v)
                })
                .collect();
            TreeNode::container(pointer, label, entry(JsonValue::Object(map.len())))
                .with_children(children)
        }
        Value::Array(items) if !items.is_empty() => {
            let children = items
                .iter()
                .enumerate()
                .map(|(i, v)| build_node(format!("{pointer}/{i}"), JsonKey::Index(i), v))
                .collect();
            TreeNode::container(pointer, label, entry(JsonValue::Array(items.len())))
                .with_children(children)
        }
        // Empty containers have nothing to expand.
        Value::Object(_) => TreeNode::leaf(pointer, label, entry(JsonValue::Object(0))),
        Value::Array(_) => TreeNode::leaf(pointer, label, entry(JsonValue::Array(0))),
        Value::String(s) => TreeNode::leaf(pointer, label, entry(JsonValue::String(s.clone()))),
        Value::Number(n) => TreeNode::leaf(pointer, label, entry(JsonValue::Number(n.clone()))),
        Value::Bool(b) => TreeNode::leaf(pointer, label, entry(JsonValue::Bool(*b))),
        Value::Null => TreeNode::leaf(pointer, label, entry(JsonValue::Null)),
    }
}

/// Build the displayed tree: root shown and expanded, every other
/// container collapsed.
pub fn build_tree(value: &Value) -> JsonTree {
    let root = build_node(String::new(), JsonKey::Root, value).with_expanded(true);
    Tree::new(root, true)
}

pub fn parse(path: &Path, bytes: &[u8]) -> Result<JsonTree, ContentError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| ContentError::parse(path, e))?;
    Ok(build_tree(&value))
}

pub fn load(path: &Path) -> Result<JsonTree, ContentError> {
    let bytes = operations::read_content(path)?;
    parse(path, &bytes)
}

/// Short single-line form of a node's value.
pub fn summary(node: &JsonNode) -> String {
    match &node.data.value {
        JsonValue::Object(0) => "{}".to_string(),
        JsonValue::Array(0) => "[]".to_string(),
        JsonValue::Object(n) if node.expanded => format!("{{{n} keys}}"),
        JsonValue::Object(n) => format!("{{{n} keys...}}"),
        JsonValue::Array(n) if node.expanded => format!("[{n} items]"),
        JsonValue::Array(n) => format!("[{n} items...]"),
        JsonValue::String(s) => {
            let quoted = Value::String(s.clone()).to_string();
            if quoted.chars().count() > 50 {
                let head: String = quoted.chars().take(47).collect();
                format!("{head}...\"")
            } else {
                quoted
            }
        }
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
    }
}

#[derive(Debug, Default)]
pub enum JsonState {
    #[default]
    Empty,
    Loading,
    Ready(TreeView<String, JsonEntry>),
    Failed(ContentError),
}

/// Renderer for `.json` resources.
#[derive(Debug, Default)]
pub struct JsonViewer {
    pub resource: Option<ResourceRef>,
    pub state: JsonState,
    pub width: u16,
    pub height: u16,
    pub focused: bool,
}

impl JsonViewer {
    pub fn can_handle(&self, resource: &ResourceRef) -> bool {
        resource.tag() == "json"
    }

    pub fn begin(&mut self, resource: ResourceRef) {
        self.resource = Some(resource);
        self.state = JsonState::Loading;
    }

    pub fn finish(&mut self, result: Result<JsonTree, ContentError>) {
        self.state = match result {
            Ok(tree) => JsonState::Ready(TreeView::new(tree, self.height as usize)),
            Err(e) => JsonState::Failed(e),
        };
    }

    pub fn reset(&mut self) {
        self.resource = None;
        self.state = JsonState::Empty;
    }

    pub fn set_extent(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let JsonState::Ready(view) = &mut self.state {
            view.resize(height as usize);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.focused {
            return;
        }
        let JsonState::Ready(view) = &mut self.state else {
            return;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => view.move_by(1),
            KeyCode::Char('k') | KeyCode::Up => view.move_by(-1),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                view.toggle_selected();
            }
            KeyCode::Char('h') | KeyCode::Left => view.collapse_or_parent(),
            KeyCode::Char('d') if ctrl => view.half_page_down(),
            KeyCode::Char('u') if ctrl => view.half_page_up(),
            KeyCode::Char('d') | KeyCode::PageDown => view.half_page_down(),
            KeyCode::Char('u') | KeyCode::PageUp => view.half_page_up(),
            KeyCode::Char('g') | KeyCode::Home => view.jump_to_start(),
            KeyCode::Char('G') | KeyCode::End => view.jump_to_end(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"name":"demo","tags":["a","b"],"nested":{"x/y":1,"z":null},"empty":{}}"#;

    fn tree() -> JsonTree {
        parse(Path::new("doc.json"), DOC.as_bytes()).unwrap()
    }

    fn ids(tree: &JsonTree) -> Vec<String> {
        tree.visible().map(|e| e.node.id.clone()).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn root_expanded_children_collapsed_in_document_order() {
        let tree = tree();
        assert_eq!(ids(&tree), ["", "/name", "/tags", "/nested", "/empty"]);
        let depths: Vec<usize> = tree.visible().map(|e| e.depth).collect();
        assert_eq!(depths, [0, 1, 1, 1, 1]);
        assert!(!tree.get(&"/tags".to_string()).unwrap().expanded);
    }

    #[test]
    fn pointers_resolve_against_the_document() {
        let mut tree = tree();
        tree.toggle_expand(&"/nested".to_string());
        let doc: Value = serde_json::from_str(DOC).unwrap();
        let id = "/nested/x~1y".to_string();
        let node = tree.get(&id).unwrap();
        assert_eq!(node.label, "x/y");
        assert_eq!(doc.pointer(&id), Some(&Value::from(1)));
    }

    #[test]
    fn empty_containers_are_leaves() {
        let tree = tree();
        let empty = tree.get(&"/empty".to_string()).unwrap();
        assert!(!empty.has_children);
        assert_eq!(summary(empty), "{}");
    }

    #[test]
    fn summaries() {
        let mut tree = tree();
        let tags = "/tags".to_string();
        assert_eq!(summary(tree.get(&tags).unwrap()), "[2 items...]");
        tree.toggle_expand(&tags);
        assert_eq!(summary(tree.get(&tags).unwrap()), "[2 items]");
        assert_eq!(summary(tree.get(&"/name".to_string()).unwrap()), "\"demo\"");
        assert_eq!(summary(tree.get(&"/tags/0".to_string()).unwrap()), "\"a\"");
        assert_eq!(tree.get(&"/tags/1".to_string()).unwrap().label, "[1]");
    }

    #[test]
    fn long_strings_are_truncated() {
        let long = format!("[\"{}\"]", "x".repeat(80));
        let tree = parse(Path::new("a.json"), long.as_bytes()).unwrap();
        let s = summary(tree.get(&"/0".to_string()).unwrap());
        assert_eq!(s.chars().count(), 51);
        assert!(s.ends_with("...\""));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = parse(Path::new("bad.json"), b"{not json").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
        assert!(matches!(
            load(Path::new("/nonexistent.json")),
            Err(ContentError::Load { .. })
        ));
    }

    #[test]
    fn scalar_document_is_single_row() {
        let tree = parse(Path::new("n.json"), b"42").unwrap();
        assert_eq!(ids(&tree), [""]);
    }

    #[test]
    fn keys_toggle_and_step_out() {
        let mut viewer = JsonViewer {
            focused: true,
            ..JsonViewer::default()
        };
        viewer.set_extent(40, 10);
        viewer.begin(ResourceRef::new("doc.json"));
        viewer.finish(Ok(tree()));

        viewer.handle_key(key(KeyCode::Char('j')));
        viewer.handle_key(key(KeyCode::Char('j')));
        viewer.handle_key(key(KeyCode::Enter));
        viewer.handle_key(key(KeyCode::Char('j')));
        let JsonState::Ready(view) = &viewer.state else {
            panic!("not ready");
        };
        assert_eq!(view.selected_id().map(String::as_str), Some("/tags/0"));
        assert_eq!(view.len(), 7);

        viewer.handle_key(key(KeyCode::Char('h')));
        viewer.handle_key(key(KeyCode::Left));
        let JsonState::Ready(view) = &viewer.state else {
            panic!("not ready");
        };
        assert_eq!(view.selected_id().map(String::as_str), Some("/tags"));
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn claims_json_only() {
        let viewer = JsonViewer::default();
        assert!(viewer.can_handle(&ResourceRef::new("a.JSON")));
        assert!(!viewer.can_handle(&ResourceRef::new("a.md")));
    }
}
