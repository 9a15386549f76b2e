//! Incremental vertex/edge manager for one query.
//!
//! Holds the currently shown vertices and edges and moves them from one
//! visibility key to the next: removed indices are hidden from the outside
//! in, then added indices are shown from the inside out, so every element
//! being shown can rely on its focal-side neighbor already having a vertex.
//!
//! Each edge records the far-side elements that justify it. An edge lives
//! exactly as long as that set is non-empty, which lets several elements
//! share one edge without it disappearing while still needed.
//!
//! Any error means the supplied key sequence broke the manager's contract.
//! The manager state is not rolled back; discard the manager afterwards.

use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::Direction as PetDirection;

use ddg_core::errors::{DdgErrorCode, GraphError};
use ddg_core::types::collections::{FxHashMap, FxHashSet};

use super::density::VertexKeyStrategy;
use super::types::{DdgEdge, DdgVertex, VisibleGraph};
use crate::model::{DdgModel, EdgeSide};
use crate::visibility::{self, VisibilityDiff};

/// A shown vertex and the elements currently drawn as it.
#[derive(Debug, Clone)]
pub struct EvVertex {
    pub vertex: DdgVertex,
    pub path_elems: FxHashSet<usize>,
}

pub struct DdgEvManager {
    model: Arc<DdgModel>,
    strategy: Arc<dyn VertexKeyStrategy>,
    graph: StableGraph<EvVertex, DdgEdge>,
    vertices: FxHashMap<String, NodeIndex>,
    path_elem_to_vertex: FxHashMap<usize, NodeIndex>,
    path_elem_to_edge: FxHashMap<usize, EdgeIndex>,
    edge_to_far_side_path_elems: FxHashMap<EdgeIndex, FxHashSet<usize>>,
    last_visibility_key: String,
}

impl DdgEvManager {
    pub fn new(model: Arc<DdgModel>, strategy: Arc<dyn VertexKeyStrategy>) -> Self {
        Self {
            model,
            strategy,
            graph: StableGraph::new(),
            vertices: FxHashMap::default(),
            path_elem_to_vertex: FxHashMap::default(),
            path_elem_to_edge: FxHashMap::default(),
            edge_to_far_side_path_elems: FxHashMap::default(),
            last_visibility_key: String::new(),
        }
    }

    pub fn model(&self) -> &Arc<DdgModel> {
        &self.model
    }

    pub fn last_visibility_key(&self) -> &str {
        &self.last_visibility_key
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The vertex `visibility_idx` is currently drawn as.
    pub fn vertex_for_path_elem(&self, visibility_idx: usize) -> Option<&EvVertex> {
        self.path_elem_to_vertex
            .get(&visibility_idx)
            .and_then(|&node| self.graph.node_weight(node))
    }

    pub fn vertex(&self, key: &str) -> Option<&EvVertex> {
        self.vertices
            .get(key)
            .and_then(|&node| self.graph.node_weight(node))
    }

    /// Keys of the vertices with an edge into vertex `key`.
    pub fn ingress_neighbors(&self, key: &str) -> Vec<&str> {
        self.neighbors(key, PetDirection::Incoming)
    }

    /// Keys of the vertices vertex `key` has an edge to.
    pub fn egress_neighbors(&self, key: &str) -> Vec<&str> {
        self.neighbors(key, PetDirection::Outgoing)
    }

    fn neighbors(&self, key: &str, direction: PetDirection) -> Vec<&str> {
        let Some(&node) = self.vertices.get(key) else {
            return Vec::new();
        };
        let mut keys: Vec<&str> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|neighbor| self.graph[neighbor].vertex.key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Move the view to `visibility_key` and return it.
    pub fn get_edges_and_vertices(&mut self, visibility_key: &str) -> Result<VisibleGraph, GraphError> {
        let diff = visibility::compare_visibility_keys(&self.last_visibility_key, visibility_key)?;
        self.last_visibility_key = visibility_key.to_string();

        tracing::debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "applying visibility change"
        );

        if let Err(err) = self.apply(&diff) {
            tracing::error!(code = err.error_code(), error = %err, "visibility change rejected");
            return Err(err);
        }

        Ok(self.snapshot())
    }

    fn apply(&mut self, diff: &VisibilityDiff) -> Result<(), GraphError> {
        for &idx in diff.removed.iter().rev() {
            self.hide_elem(idx)?;
        }
        for &idx in &diff.added {
            self.show_elem(idx)?;
        }
        Ok(())
    }

    /// Current vertices and edges, in graph index order.
    pub fn snapshot(&self) -> VisibleGraph {
        VisibleGraph {
            vertices: self
                .graph
                .node_indices()
                .map(|node| self.graph[node].vertex.clone())
                .collect(),
            edges: self
                .graph
                .edge_indices()
                .map(|edge| self.graph[edge].clone())
                .collect(),
        }
    }

    fn show_elem(&mut self, idx: usize) -> Result<(), GraphError> {
        let model = Arc::clone(&self.model);
        let elem = model
            .path_elem(idx)
            .ok_or(GraphError::UnknownVisibilityIdx { idx })?;
        if self.path_elem_to_vertex.contains_key(&idx) {
            return Err(GraphError::AlreadyVisible { idx });
        }

        // Resolve the connection before touching any state.
        let connected = match elem.focal_side_neighbor(&model) {
            None => None,
            Some(neighbor) => Some(
                self.path_elem_to_vertex
                    .get(&neighbor.visibility_idx())
                    .copied()
                    .ok_or_else(|| GraphError::DisconnectedPathElem {
                        idx,
                        elem: elem.describe(&model),
                    })?,
            ),
        };

        let key = self.strategy.vertex_key(elem, &model);
        let node = match self.vertices.get(&key) {
            Some(&node) => node,
            None => {
                let vertex = DdgVertex::for_elem(
                    key.clone(),
                    elem,
                    &model,
                    self.strategy.show_operations(),
                );
                let node = self.graph.add_node(EvVertex {
                    vertex,
                    path_elems: FxHashSet::default(),
                });
                self.vertices.insert(key, node);
                node
            }
        };

        let Some(connected) = connected else {
            self.attach(idx, node);
            return Ok(());
        };

        let (from, to) = match elem.focal_side_edges() {
            EdgeSide::Ingress => (connected, node),
            EdgeSide::Egress => (node, connected),
        };
        let edge = match self.graph.find_edge(from, to) {
            Some(edge) => {
                let far_side = self
                    .edge_to_far_side_path_elems
                    .get_mut(&edge)
                    .ok_or_else(|| GraphError::EdgeWithoutPathElems {
                        from: self.graph[from].vertex.key.clone(),
                        to: self.graph[to].vertex.key.clone(),
                    })?;
                if far_side.is_empty() {
                    return Err(GraphError::EdgeNotReleased {
                        from: self.graph[from].vertex.key.clone(),
                        to: self.graph[to].vertex.key.clone(),
                    });
                }
                far_side.insert(idx);
                edge
            }
            None => {
                let weight = DdgEdge::new(
                    self.graph[from].vertex.key.clone(),
                    self.graph[to].vertex.key.clone(),
                );
                let edge = self.graph.add_edge(from, to, weight);
                let mut far_side = FxHashSet::default();
                far_side.insert(idx);
                self.edge_to_far_side_path_elems.insert(edge, far_side);
                edge
            }
        };

        self.attach(idx, node);
        self.path_elem_to_edge.insert(idx, edge);
        Ok(())
    }

    fn attach(&mut self, idx: usize, node: NodeIndex) {
        self.graph[node].path_elems.insert(idx);
        self.path_elem_to_vertex.insert(idx, node);
    }

    fn hide_elem(&mut self, idx: usize) -> Result<(), GraphError> {
        let model = Arc::clone(&self.model);
        let elem = model
            .path_elem(idx)
            .ok_or(GraphError::UnknownVisibilityIdx { idx })?;
        let node = self
            .path_elem_to_vertex
            .get(&idx)
            .copied()
            .ok_or(GraphError::HideNotVisible { idx })?;

        match self.path_elem_to_edge.get(&idx).copied() {
            Some(edge) => {
                if elem.is_focal() {
                    return Err(GraphError::FocalElemHasEdge { idx });
                }
                let (from, to) = self.edge_keys(edge);
                let far_side = self
                    .edge_to_far_side_path_elems
                    .get_mut(&edge)
                    .ok_or(GraphError::EdgeWithoutPathElems { from, to })?;
                far_side.remove(&idx);
                if far_side.is_empty() {
                    self.edge_to_far_side_path_elems.remove(&edge);
                    self.graph.remove_edge(edge);
                }
                self.path_elem_to_edge.remove(&idx);
            }
            None if !elem.is_focal() => {
                return Err(GraphError::DisconnectedPathElem {
                    idx,
                    elem: elem.describe(&model),
                });
            }
            None => {}
        }

        self.path_elem_to_vertex.remove(&idx);
        let vertex = &mut self.graph[node];
        vertex.path_elems.remove(&idx);
        if vertex.path_elems.is_empty() {
            let key = vertex.vertex.key.clone();
            if self.graph.edges_directed(node, PetDirection::Incoming).next().is_some()
                || self.graph.edges_directed(node, PetDirection::Outgoing).next().is_some()
            {
                return Err(GraphError::VertexStillReferenced { key });
            }
            self.graph.remove_node(node);
            self.vertices.remove(&key);
        }
        Ok(())
    }

    fn edge_keys(&self, edge: EdgeIndex) -> (String, String) {
        self.graph
            .edge_endpoints(edge)
            .map(|(from, to)| {
                (
                    self.graph[from].vertex.key.clone(),
                    self.graph[to].vertex.key.clone(),
                )
            })
            .unwrap_or_default()
    }

    /// Every edge with the far-side elements keeping it alive.
    pub fn edge_path_elems(&self) -> impl Iterator<Item = (&DdgEdge, &FxHashSet<usize>)> {
        self.edge_to_far_side_path_elems
            .iter()
            .filter_map(|(&edge, elems)| self.graph.edge_weight(edge).map(|weight| (weight, elems)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DensityStrategy;
    use crate::model::{DdgPayload, FocalSelector, PayloadEntry};
    use crate::transform::transform_ddg_data;
    use ddg_core::Density;

    fn simple_manager() -> DdgEvManager {
        let hop = |label: &str| PayloadEntry::new(format!("{label}Service"), format!("{label}Operation"));
        let payload = DdgPayload::from_paths(vec![vec![
            hop("first"),
            hop("before"),
            hop("focal"),
            hop("after"),
            hop("last"),
        ]]);
        let focal = FocalSelector::service("focalService").with_operation("focalOperation");
        let model = Arc::new(transform_ddg_data(&payload, &focal).unwrap());
        DdgEvManager::new(model, Density::PreventPathEntanglement.strategy(true))
    }

    #[test]
    fn showing_twice_is_rejected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        assert!(matches!(
            manager.show_elem(0),
            Err(GraphError::AlreadyVisible { idx: 0 })
        ));
    }

    #[test]
    fn hiding_hidden_elem_is_rejected() {
        let mut manager = simple_manager();
        assert!(matches!(
            manager.hide_elem(1),
            Err(GraphError::HideNotVisible { idx: 1 })
        ));
    }

    #[test]
    fn missing_edge_bookkeeping_is_detected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        manager.show_elem(1).unwrap();
        let edge = manager.path_elem_to_edge[&1];
        manager.edge_to_far_side_path_elems.remove(&edge);
        assert!(matches!(
            manager.hide_elem(1),
            Err(GraphError::EdgeWithoutPathElems { .. })
        ));
    }

    #[test]
    fn unreleased_edge_is_detected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        manager.show_elem(1).unwrap();
        let edge = manager.path_elem_to_edge[&1];
        manager.edge_to_far_side_path_elems.get_mut(&edge).unwrap().clear();
        manager.path_elem_to_vertex.remove(&1);
        assert!(matches!(
            manager.show_elem(1),
            Err(GraphError::EdgeNotReleased { .. })
        ));
    }

    #[test]
    fn focal_elem_with_edge_is_detected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        manager.show_elem(1).unwrap();
        let edge = manager.path_elem_to_edge[&1];
        manager.path_elem_to_edge.insert(0, edge);
        assert!(matches!(
            manager.hide_elem(0),
            Err(GraphError::FocalElemHasEdge { idx: 0 })
        ));
    }

    #[test]
    fn non_focal_elem_without_edge_is_detected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        manager.show_elem(1).unwrap();
        manager.path_elem_to_edge.remove(&1);
        assert!(matches!(
            manager.hide_elem(1),
            Err(GraphError::DisconnectedPathElem { idx: 1, .. })
        ));
    }

    #[test]
    fn emptied_vertex_with_edges_is_detected() {
        let mut manager = simple_manager();
        manager.show_elem(0).unwrap();
        manager.show_elem(1).unwrap();
        // Hiding the focal element while "after" still hangs off it.
        assert!(matches!(
            manager.hide_elem(0),
            Err(GraphError::VertexStillReferenced { .. })
        ));
    }
}
