//! Boundary normalization from decoded JSON into the tree model.

use serde_json::{Map, Value};

use crate::error::{MalformedReason, MalformedTreeError};
use crate::node::{Node, Scalar, Tree};
use crate::path::TreePath;

/// Default nesting limit, matching `serde_json`'s parser recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Converts decoded JSON snapshots into [`Tree`]s.
///
/// Construct one per process and share it by reference; it holds no state
/// beyond its limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Normalizer {
    max_depth: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Normalizer {
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Normalize a snapshot root. `null` is accepted as the empty tree;
    /// any other non-object root is malformed.
    pub fn tree(&self, value: &Value) -> Result<Tree, MalformedTreeError> {
        match value {
            Value::Null => Ok(Tree::new()),
            Value::Object(map) => self.walk_object(map, &mut Vec::new(), 0),
            other => Err(MalformedTreeError::new(
                TreePath::root(),
                MalformedReason::RootNotObject {
                    found: json_kind(other),
                },
            )),
        }
    }

    /// Normalize an arbitrary value (any shape is accepted at the root).
    pub fn node(&self, value: &Value) -> Result<Node, MalformedTreeError> {
        let mut segments = Vec::new();
        self.walk(value, &mut segments, 0)
    }

    fn walk(
        &self,
        value: &Value,
        segments: &mut Vec<String>,
        depth: usize,
    ) -> Result<Node, MalformedTreeError> {
        if depth > self.max_depth {
            return Err(MalformedTreeError::new(
                TreePath::from_segments(segments.iter().cloned()),
                MalformedReason::DepthExceeded {
                    limit: self.max_depth,
                },
            ));
        }

        let node = match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Node::Scalar(Scalar::String(s.clone())),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    segments.push(i.to_string());
                    out.push(self.walk(item, segments, depth + 1)?);
                    segments.pop();
                }
                Node::List(out)
            }
            Value::Object(map) => Node::Tree(self.walk_object(map, segments, depth)?),
        };
        Ok(node)
    }

    fn walk_object(
        &self,
        map: &Map<String, Value>,
        segments: &mut Vec<String>,
        depth: usize,
    ) -> Result<Tree, MalformedTreeError> {
        let mut tree = Tree::with_capacity(map.len());
        for (key, child) in map {
            segments.push(key.clone());
            let node = self.walk(child, segments, depth + 1)?;
            segments.pop();
            tree.insert(key.clone(), node);
        }
        Ok(tree)
    }
}

impl Tree {
    /// Normalize a JSON snapshot with the default [`Normalizer`].
    pub fn from_json(value: &Value) -> Result<Self, MalformedTreeError> {
        Normalizer::default().tree(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
