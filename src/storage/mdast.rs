//! mdast JSON conversion
//!
//! Reads and writes the JSON form of a markdown tree as produced by
//! remark-style tooling: objects with a `type` tag, kind-specific fields
//! (`depth`, `ordered`, `start`, `spread`, `value`) and `children`.
//!
//! Node types outside the board's vocabulary are kept verbatim as opaque
//! nodes and written back as they were read. `position` is dropped from
//! recognized nodes since it goes stale as soon as the tree is edited.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::{Ast, NodeId, NodeKind, Opaque};

#[derive(Debug, Error)]
pub enum MdastError {
    #[error("Expected a JSON object for an mdast node, found {0}")]
    NotAnObject(String),

    #[error("mdast node is missing a string `type` field")]
    MissingType,

    #[error("Expected the top-level node to be `root`, found `{0}`")]
    NotRoot(String),

    #[error("`{node}` node has a missing or invalid `{field}` field")]
    InvalidField { node: &'static str, field: &'static str },

    #[error("Invalid mdast JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses mdast JSON text into a document tree
pub fn parse_mdast(text: &str) -> Result<Ast, MdastError> {
    let value: Value = serde_json::from_str(text)?;
    from_json(&value)
}

/// Builds a document tree from an mdast root object
pub fn from_json(value: &Value) -> Result<Ast, MdastError> {
    let node_type = type_of(value)?;
    if node_type != "root" {
        return Err(MdastError::NotRoot(node_type.to_string()));
    }

    let mut ast = Ast::new();
    let root = ast.root();
    for child in children_of(value) {
        let node = read_node(&mut ast, child)?;
        ast.append_child(root, node);
    }
    Ok(ast)
}

fn type_of(value: &Value) -> Result<&str, MdastError> {
    let object = value
        .as_object()
        .ok_or_else(|| MdastError::NotAnObject(value_kind(value).to_string()))?;
    object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(MdastError::MissingType)
}

fn children_of(value: &Value) -> &[Value] {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn read_node(ast: &mut Ast, value: &Value) -> Result<NodeId, MdastError> {
    let kind = match type_of(value)? {
        "heading" => {
            let depth = value
                .get("depth")
                .and_then(Value::as_u64)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(MdastError::InvalidField {
                    node: "heading",
                    field: "depth",
                })?;
            NodeKind::Heading { depth }
        }
        "list" => NodeKind::List {
            ordered: value
                .get("ordered")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            start: value.get("start").and_then(Value::as_u64),
            spread: value.get("spread").and_then(Value::as_bool).unwrap_or(false),
        },
        "listItem" => NodeKind::ListItem,
        "paragraph" => NodeKind::Paragraph,
        "text" => {
            let text = value
                .get("value")
                .and_then(Value::as_str)
                .ok_or(MdastError::InvalidField {
                    node: "text",
                    field: "value",
                })?;
            return Ok(ast.new_text(text));
        }
        other => {
            let opaque = Opaque::json(other, value.clone());
            return Ok(ast.alloc(NodeKind::Other(opaque), Vec::new()));
        }
    };

    let children = children_of(value)
        .iter()
        .map(|child| read_node(ast, child))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ast.alloc(kind, children))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Converts a document tree to an mdast root object
pub fn to_json(ast: &Ast) -> Value {
    write_node(ast, ast.root())
}

fn write_node(ast: &Ast, id: NodeId) -> Value {
    let kind = ast.kind(id);
    let mut object = Map::new();

    match kind {
        NodeKind::Text { value } => {
            object.insert("type".into(), json!("text"));
            object.insert("value".into(), json!(value));
            return Value::Object(object);
        }
        NodeKind::Other(opaque) => return opaque_json(opaque),
        NodeKind::Heading { depth } => {
            object.insert("type".into(), json!("heading"));
            object.insert("depth".into(), json!(depth));
        }
        NodeKind::List {
            ordered,
            start,
            spread,
        } => {
            object.insert("type".into(), json!("list"));
            object.insert("ordered".into(), json!(ordered));
            object.insert("start".into(), json!(start));
            object.insert("spread".into(), json!(spread));
        }
        NodeKind::Root | NodeKind::ListItem | NodeKind::Paragraph => {
            object.insert("type".into(), json!(kind.type_name()));
        }
    }

    let children = ast
        .children(id)
        .iter()
        .map(|&child| write_node(ast, child))
        .collect();
    object.insert("children".into(), Value::Array(children));
    Value::Object(object)
}

/// Opaque nodes read from markdown have no mdast object; they are written as
/// `html` literal nodes carrying their source
fn opaque_json(opaque: &Opaque) -> Value {
    if let Some(json) = &opaque.json {
        return json.clone();
    }
    json!({
        "type": "html",
        "value": opaque.source.clone().unwrap_or_default(),
    })
}
