//! Vertices, edges and view snapshots handed to the rendering layer.

use serde::{Deserialize, Serialize};

use crate::model::{DdgModel, PathElem};

/// Operation label of a vertex: the focal vertex may stand for several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexOperation {
    Single(String),
    Multiple(Vec<String>),
}

impl VertexOperation {
    /// `Single` for one name, `Multiple` otherwise.
    pub fn from_names(mut names: Vec<String>) -> Option<Self> {
        match names.len() {
            0 => None,
            1 => names.pop().map(Self::Single),
            _ => Some(Self::Multiple(names)),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdgVertex {
    pub key: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<VertexOperation>,
    pub is_focal_node: bool,
}

impl DdgVertex {
    /// Vertex labelled after `elem`.
    pub fn for_elem(key: String, elem: &PathElem, model: &DdgModel, show_operations: bool) -> Self {
        Self {
            key,
            service: elem.service_name(model).to_string(),
            operation: show_operations
                .then(|| VertexOperation::Single(elem.operation_name(model).to_string())),
            is_focal_node: elem.is_focal(),
        }
    }
}

/// Directed edge, always from the upstream vertex to the downstream one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DdgEdge {
    pub from: String,
    pub to: String,
}

impl DdgEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The visible part of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibleGraph {
    pub vertices: Vec<DdgVertex>,
    pub edges: Vec<DdgEdge>,
}

impl VisibleGraph {
    pub fn vertex(&self, key: &str) -> Option<&DdgVertex> {
        self.vertices.iter().find(|vertex| vertex.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }
}

/// How much of a vertex's next generation is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckedStatus {
    Empty,
    Partial,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    /// Member offset that steps one hop in this direction.
    pub fn offset(self) -> isize {
        match self {
            Self::Upstream => -1,
            Self::Downstream => 1,
        }
    }
}

/// Result of toggling a generation: the new key and the status it now has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUpdate {
    pub visibility_key: String,
    pub update: CheckedStatus,
}
