//! Markdown syntax tree and the structural vocabulary used by the board
//!
//! The tree is an arena: every node lives in [`Ast`] and is addressed by a
//! [`NodeId`]. Detaching a node from its parent never invalidates its id, so
//! the same node can be moved around the document and lookup tables keyed on
//! node ids stay valid.
//!
//! Node kinds form a closed set. Anything the board does not understand is
//! kept as [`NodeKind::Other`] with its original content so it survives a
//! parse/serialize round trip untouched.

use serde_json::Value;
use thiserror::Error;

/// Heading depth that marks a lane
pub const LANE_HEADING_DEPTH: u8 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum AstError {
    #[error("Malformed node: expected {expected}, found {found}")]
    MalformedNode { expected: &'static str, found: String },
}

impl AstError {
    fn malformed(expected: &'static str, found: &NodeKind) -> Self {
        AstError::MalformedNode {
            expected,
            found: found.type_name().to_string(),
        }
    }
}

/// Identity of a node within an [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Content the board does not model, preserved verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    /// mdast type tag (e.g. `code`, `blockquote`, `emphasis`)
    pub tag: String,
    /// Exact markdown source, when the node came from markdown text
    pub source: Option<String>,
    /// Original mdast object, when the node came from JSON
    pub json: Option<Value>,
}

impl Opaque {
    /// Opaque node captured from markdown source
    pub fn markdown(tag: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            source: Some(source.into()),
            json: None,
        }
    }

    /// Opaque node captured from an mdast JSON object
    pub fn json(tag: impl Into<String>, json: Value) -> Self {
        Self {
            tag: tag.into(),
            source: None,
            json: Some(json),
        }
    }
}

/// Kind of a node, with its kind-specific attributes
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Heading { depth: u8 },
    List { ordered: bool, start: Option<u64>, spread: bool },
    ListItem,
    Paragraph,
    Text { value: String },
    Other(Opaque),
}

impl NodeKind {
    /// Returns the mdast type tag of this kind
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Heading { .. } => "heading",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem => "listItem",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text { .. } => "text",
            NodeKind::Other(opaque) => &opaque.tag,
        }
    }

    /// Bullet list kind as created by the board
    pub fn bullet_list() -> Self {
        NodeKind::List {
            ordered: false,
            start: None,
            spread: false,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// A markdown document tree.
///
/// Nodes are never reclaimed. Removing or replacing a subtree only unlinks
/// it, so the arena grows with every edit over the life of a tree. A
/// long-lived host should re-parse from the serialized document now and then
/// to start from a compact arena.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    /// Creates a document holding only an empty root
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Returns the root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Returns the ordered children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the child at `index`, if any
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Number of nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a detached node to the arena
    pub fn alloc(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData { kind, children });
        id
    }

    /// Appends `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` at `index`, clamped to the current child count
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Removes and returns the child at `index`
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let children = &mut self.nodes[parent.0].children;
        (index < children.len()).then(|| children.remove(index))
    }

    /// Returns the index of `child` within `parent`, searching by identity
    pub fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Detaches `child` from `parent`, returning the index it occupied
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let index = self.position_of(parent, child)?;
        self.nodes[parent.0].children.remove(index);
        Some(index)
    }

    /// Mutable access to the literal value of a text node
    pub fn text_mut(&mut self, id: NodeId) -> Result<&mut String, AstError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text { value } => Ok(value),
            other => Err(AstError::malformed("text", other)),
        }
    }

    // ------------------------------------------------------------------
    // Structural vocabulary
    // ------------------------------------------------------------------

    /// True if the node is a heading at exactly the lane depth
    pub fn is_lane_heading(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Heading { depth } if *depth == LANE_HEADING_DEPTH)
    }

    /// True if the node is a list
    pub fn is_task_list(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::List { .. })
    }

    /// Follows the first-child chain down to the leading text node.
    ///
    /// Only headings, list items and paragraphs are descended; anything else
    /// on the way (or a missing child) is a malformed shape.
    pub fn first_text_node(&self, id: NodeId) -> Result<NodeId, AstError> {
        let mut current = id;
        loop {
            match self.kind(current) {
                NodeKind::Text { .. } => return Ok(current),
                NodeKind::Heading { .. } | NodeKind::ListItem | NodeKind::Paragraph => {
                    current = self
                        .child(current, 0)
                        .ok_or_else(|| AstError::malformed("text", self.kind(current)))?;
                }
                other => return Err(AstError::malformed("text", other)),
            }
        }
    }

    /// Returns the literal value of the leading text node
    pub fn first_text_value(&self, id: NodeId) -> Result<&str, AstError> {
        let text = self.first_text_node(id)?;
        match self.kind(text) {
            NodeKind::Text { value } => Ok(value),
            other => Err(AstError::malformed("text", other)),
        }
    }

    /// Returns the text node of a card title (item → paragraph → text)
    pub fn item_title_node(&self, item: NodeId) -> Option<NodeId> {
        let paragraph = self.child(item, 0)?;
        if !matches!(self.kind(paragraph), NodeKind::Paragraph) {
            return None;
        }
        let text = self.child(paragraph, 0)?;
        matches!(self.kind(text), NodeKind::Text { .. }).then_some(text)
    }

    /// Returns the text node of a card description.
    ///
    /// The description is the second child of the item when that child is a
    /// single-item list whose item starts with a paragraph of text.
    pub fn item_description_node(&self, item: NodeId) -> Option<NodeId> {
        let sub_list = self.child(item, 1)?;
        if !self.is_task_list(sub_list) || self.children(sub_list).len() != 1 {
            return None;
        }
        self.item_title_node(self.children(sub_list)[0])
    }

    /// Returns the literal value of a text node, if `id` is one
    pub fn text_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// Creates a detached text node
    pub fn new_text(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(
            NodeKind::Text {
                value: value.into(),
            },
            Vec::new(),
        )
    }

    /// Creates a detached lane heading carrying `title`
    pub fn new_lane_heading(&mut self, title: &str) -> NodeId {
        let text = self.new_text(title);
        self.alloc(
            NodeKind::Heading {
                depth: LANE_HEADING_DEPTH,
            },
            vec![text],
        )
    }

    /// Creates a detached, empty bullet list
    pub fn new_task_list(&mut self) -> NodeId {
        self.alloc(NodeKind::bullet_list(), Vec::new())
    }

    /// Creates a detached list item wrapping a paragraph of `title`
    pub fn new_task_item(&mut self, title: &str) -> NodeId {
        let text = self.new_text(title);
        let paragraph = self.alloc(NodeKind::Paragraph, vec![text]);
        self.alloc(NodeKind::ListItem, vec![paragraph])
    }

    /// Extends a list item with a single-item sub-list holding `description`.
    ///
    /// The item must consist of exactly its title paragraph; returns the new
    /// description text node.
    pub fn attach_description(
        &mut self,
        item: NodeId,
        description: &str,
    ) -> Result<NodeId, AstError> {
        if !matches!(self.kind(item), NodeKind::ListItem) {
            return Err(AstError::malformed("listItem", self.kind(item)));
        }
        if let Some(second) = self.child(item, 1) {
            return Err(AstError::malformed("item without sub-content", self.kind(second)));
        }

        let sub_item = self.new_task_item(description);
        let sub_list = self.new_task_list();
        self.append_child(sub_list, sub_item);
        self.append_child(item, sub_list);

        self.item_title_node(sub_item)
            .ok_or_else(|| AstError::malformed("text", &NodeKind::ListItem))
    }

    /// Structural equality of the subtrees rooted at `a` and `other`'s `b`
    pub fn subtree_eq(&self, a: NodeId, other: &Ast, b: NodeId) -> bool {
        if self.kind(a) != other.kind(b) {
            return false;
        }
        let left = self.children(a);
        let right = other.children(b);
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(&l, &r)| self.subtree_eq(l, other, r))
    }
}

impl PartialEq for Ast {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}
