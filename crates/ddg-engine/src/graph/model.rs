//! The frozen, fully built graph for one model.
//!
//! Every element gets its vertex and edge at construction, in visibility
//! order. Queries then project a visibility key onto that graph, so any key
//! can be answered without mutating anything.

use std::sync::Arc;

use moka::sync::Cache;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use ddg_core::errors::GraphError;
use ddg_core::types::collections::{FxHashMap, FxHashSet};
use ddg_core::constants::MAX_VISIBLE_HOPS;
use ddg_core::DdgConfig;

use super::density::{DensityStrategy, VertexKeyStrategy, FOCAL_KEY};
use super::types::{
    CheckedStatus, DdgEdge, DdgVertex, Direction, GenerationUpdate, VertexOperation, VisibleGraph,
};
use crate::model::DdgModel;
use crate::visibility;

type FindKey = (Option<String>, Option<String>);

pub struct GraphModel {
    model: Arc<DdgModel>,
    strategy: Arc<dyn VertexKeyStrategy>,
    default_visible_hops: i32,
    graph: DiGraph<DdgVertex, DdgEdge>,
    vertices: FxHashMap<String, NodeIndex>,
    /// Indexed by `NodeIndex::index()`.
    vertex_to_path_elems: Vec<Vec<usize>>,
    /// Indexed by visibility index.
    path_elem_to_vertex: Vec<NodeIndex>,
    /// Indexed by visibility index. `None` for focal elements.
    path_elem_to_edge: Vec<Option<EdgeIndex>>,
    visible_memo: Cache<Option<String>, Arc<VisibleGraph>>,
    visible_find_memo: Cache<FindKey, Arc<FxHashSet<String>>>,
    hidden_find_memo: Cache<FindKey, Arc<FxHashSet<String>>>,
}

impl GraphModel {
    /// Build with the strategy selected by `config.graph`.
    pub fn from_config(model: Arc<DdgModel>, config: &DdgConfig) -> Result<Self, GraphError> {
        let strategy = config
            .graph
            .effective_density()
            .strategy(config.graph.effective_show_operations());
        Self::new(model, strategy, config)
    }

    pub fn new(
        model: Arc<DdgModel>,
        strategy: Arc<dyn VertexKeyStrategy>,
        config: &DdgConfig,
    ) -> Result<Self, GraphError> {
        let show_operations = strategy.show_operations();
        let mut graph: DiGraph<DdgVertex, DdgEdge> = DiGraph::new();
        let mut vertices: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut vertex_to_path_elems: Vec<Vec<usize>> = Vec::new();
        let mut path_elem_to_vertex: Vec<NodeIndex> = Vec::with_capacity(model.len());
        let mut path_elem_to_edge: Vec<Option<EdgeIndex>> = Vec::with_capacity(model.len());

        for elem in model.path_elems() {
            let idx = elem.visibility_idx();
            let joins_focal = elem.is_focal() || strategy.joins_focal_vertex(elem, &model);
            let key = if joins_focal {
                FOCAL_KEY.to_string()
            } else {
                strategy.vertex_key(elem, &model)
            };

            let node = match vertices.get(&key) {
                Some(&node) => node,
                None => {
                    let vertex = if joins_focal {
                        DdgVertex {
                            key: key.clone(),
                            service: model.focal().service.clone(),
                            operation: None,
                            is_focal_node: true,
                        }
                    } else {
                        DdgVertex::for_elem(key.clone(), elem, &model, show_operations)
                    };
                    let node = graph.add_node(vertex);
                    vertices.insert(key, node);
                    vertex_to_path_elems.push(Vec::new());
                    node
                }
            };
            vertex_to_path_elems[node.index()].push(idx);
            path_elem_to_vertex.push(node);

            let edge = match elem.focal_side_neighbor(&model) {
                None => None,
                Some(neighbor) => {
                    let connected = path_elem_to_vertex
                        .get(neighbor.visibility_idx())
                        .copied()
                        .ok_or_else(|| GraphError::DisconnectedPathElem {
                            idx,
                            elem: elem.describe(&model),
                        })?;
                    let (from, to) = if elem.distance() > 0 {
                        (connected, node)
                    } else {
                        (node, connected)
                    };
                    let edge = match graph.find_edge(from, to) {
                        Some(edge) => edge,
                        None => {
                            let weight = DdgEdge::new(graph[from].key.clone(), graph[to].key.clone());
                            graph.add_edge(from, to, weight)
                        }
                    };
                    Some(edge)
                }
            };
            path_elem_to_edge.push(edge);
        }

        if show_operations {
            if let Some(&focal_node) = vertices.get(FOCAL_KEY) {
                let names = model.focal_operations().into_iter().map(str::to_string).collect();
                graph[focal_node].operation = VertexOperation::from_names(names);
            }
        }

        tracing::info!(
            density = %strategy.density(),
            show_operations,
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            "graph model built"
        );

        let capacity = config.cache.effective_memo_capacity();
        Ok(Self {
            model,
            strategy,
            default_visible_hops: default_visible_hops(config),
            graph,
            vertices,
            vertex_to_path_elems,
            path_elem_to_vertex,
            path_elem_to_edge,
            visible_memo: Cache::new(capacity),
            visible_find_memo: Cache::new(capacity),
            hidden_find_memo: Cache::new(capacity),
        })
    }

    pub fn model(&self) -> &Arc<DdgModel> {
        &self.model
    }

    pub fn strategy(&self) -> &Arc<dyn VertexKeyStrategy> {
        &self.strategy
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex(&self, key: &str) -> Option<&DdgVertex> {
        self.vertices.get(key).map(|&node| &self.graph[node])
    }

    pub fn vertices(&self) -> impl Iterator<Item = &DdgVertex> {
        self.graph.node_indices().map(|node| &self.graph[node])
    }

    pub fn edges(&self) -> impl Iterator<Item = &DdgEdge> {
        self.graph.edge_indices().map(|edge| &self.graph[edge])
    }

    /// Every element drawn as the vertex `key`, in visibility order.
    pub fn vertex_path_elems(&self, key: &str) -> Option<&[usize]> {
        self.vertices
            .get(key)
            .map(|node| self.vertex_to_path_elems[node.index()].as_slice())
    }

    pub fn vertex_for_path_elem(&self, visibility_idx: usize) -> Option<&DdgVertex> {
        self.path_elem_to_vertex
            .get(visibility_idx)
            .map(|&node| &self.graph[node])
    }

    pub fn edge_for_path_elem(&self, visibility_idx: usize) -> Option<&DdgEdge> {
        self.path_elem_to_edge
            .get(visibility_idx)
            .copied()
            .flatten()
            .map(|edge| &self.graph[edge])
    }

    /// Elements shown by `vis`. Without a key, every element within the
    /// default hop radius of the focal node. Indices the model does not
    /// have are skipped.
    fn visible_path_elems(&self, vis: Option<&str>) -> Result<Vec<usize>, GraphError> {
        match vis {
            None => Ok((-self.default_visible_hops..=self.default_visible_hops)
                .flat_map(|distance| self.model.path_elems_at(distance).iter().copied())
                .collect()),
            Some(key) => Ok(visibility::decode(key)?
                .into_iter()
                .filter(|&idx| idx < self.model.len())
                .collect()),
        }
    }

    pub fn visible_indices(&self, vis: Option<&str>) -> Result<FxHashSet<usize>, GraphError> {
        Ok(self.visible_path_elems(vis)?.into_iter().collect())
    }

    /// The visible elements of vertex `key`, or `None` if there is no such vertex.
    pub fn vertex_visible_path_elems(
        &self,
        key: &str,
        vis: Option<&str>,
    ) -> Result<Option<Vec<usize>>, GraphError> {
        let Some(elems) = self.vertex_path_elems(key) else {
            return Ok(None);
        };
        let visible = self.visible_indices(vis)?;
        Ok(Some(
            elems
                .iter()
                .copied()
                .filter(|idx| visible.contains(idx))
                .collect(),
        ))
    }

    /// Vertices and edges of the elements shown by `vis`, each listed once.
    ///
    /// The focal vertex comes last and, when operations are shown, only
    /// names the focal operations that are visible.
    pub fn get_visible(&self, vis: Option<&str>) -> Result<Arc<VisibleGraph>, GraphError> {
        let memo_key = vis.map(str::to_string);
        if let Some(cached) = self.visible_memo.get(&memo_key) {
            return Ok(cached);
        }

        let mut seen_edges: FxHashSet<EdgeIndex> = FxHashSet::default();
        let mut seen_vertices: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut visible = VisibleGraph::default();

        for idx in self.visible_path_elems(vis)? {
            if let Some(edge) = self.path_elem_to_edge[idx] {
                if seen_edges.insert(edge) {
                    visible.edges.push(self.graph[edge].clone());
                }
            }
            let node = self.path_elem_to_vertex[idx];
            if !self.graph[node].is_focal_node && seen_vertices.insert(node) {
                visible.vertices.push(self.graph[node].clone());
            }
        }

        let focal_elems = self
            .vertex_visible_path_elems(FOCAL_KEY, vis)?
            .unwrap_or_default();
        if let (false, Some(focal)) = (focal_elems.is_empty(), self.vertex(FOCAL_KEY)) {
            let mut focal = focal.clone();
            if self.strategy.show_operations() {
                focal.operation = VertexOperation::from_names(self.operation_names(&focal_elems));
            }
            visible.vertices.push(focal);
        }

        let visible = Arc::new(visible);
        self.visible_memo.insert(memo_key, Arc::clone(&visible));
        Ok(visible)
    }

    /// Distinct operation names of `elems`, in order.
    fn operation_names(&self, elems: &[usize]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for &idx in elems {
            if let Some(elem) = self.model.path_elem(idx) {
                let name = elem.operation_name(&self.model);
                if !names.iter().any(|existing| existing == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Keys of the visible vertices matching `ui_find`.
    pub fn get_visible_ui_find_matches(
        &self,
        ui_find: Option<&str>,
        vis: Option<&str>,
    ) -> Result<FxHashSet<String>, GraphError> {
        let memo_key = (ui_find.map(str::to_string), vis.map(str::to_string));
        if let Some(cached) = self.visible_find_memo.get(&memo_key) {
            return Ok((*cached).clone());
        }
        let matches = match find_tokens(ui_find) {
            None => FxHashSet::default(),
            Some(tokens) => ui_find_matches(&self.get_visible(vis)?.vertices, &tokens),
        };
        self.visible_find_memo
            .insert(memo_key, Arc::new(matches.clone()));
        Ok(matches)
    }

    /// Keys of the hidden vertices matching `ui_find`. The focal vertex
    /// matches only on its hidden operations.
    pub fn hidden_ui_find_matches(
        &self,
        ui_find: Option<&str>,
        vis: Option<&str>,
    ) -> Result<FxHashSet<String>, GraphError> {
        let memo_key = (ui_find.map(str::to_string), vis.map(str::to_string));
        if let Some(cached) = self.hidden_find_memo.get(&memo_key) {
            return Ok((*cached).clone());
        }
        let Some(tokens) = find_tokens(ui_find) else {
            return Ok(FxHashSet::default());
        };

        let visible = self.get_visible(vis)?;
        let visible_keys: FxHashSet<&str> =
            visible.vertices.iter().map(|v| v.key.as_str()).collect();
        let mut hidden: Vec<DdgVertex> = self
            .vertices()
            .filter(|v| !v.is_focal_node && !visible_keys.contains(v.key.as_str()))
            .cloned()
            .collect();

        if let (Some(focal), Some(all_focal)) =
            (self.vertex(FOCAL_KEY), self.vertex_path_elems(FOCAL_KEY))
        {
            let visible_focal: FxHashSet<usize> = self
                .vertex_visible_path_elems(FOCAL_KEY, vis)?
                .unwrap_or_default()
                .into_iter()
                .collect();
            let hidden_focal: Vec<usize> = all_focal
                .iter()
                .copied()
                .filter(|idx| !visible_focal.contains(idx))
                .collect();
            if !hidden_focal.is_empty() {
                let mut focal = focal.clone();
                focal.operation = VertexOperation::from_names(self.operation_names(&hidden_focal));
                hidden.push(focal);
            }
        }

        let matches = ui_find_matches(&hidden, &tokens);
        self.hidden_find_memo
            .insert(memo_key, Arc::new(matches.clone()));
        Ok(matches)
    }

    /// Members one hop further from the focal node, in `direction`, than
    /// each visible element of vertex `key`.
    pub fn generation(
        &self,
        key: &str,
        direction: Direction,
        vis: Option<&str>,
    ) -> Result<Vec<usize>, GraphError> {
        let Some(elems) = self.vertex_visible_path_elems(key, vis)? else {
            return Ok(Vec::new());
        };
        let mut generation = Vec::new();
        for idx in elems {
            let Some(elem) = self.model.path_elem(idx) else {
                continue;
            };
            let target = elem.member_idx() as isize + direction.offset();
            if target < 0 {
                continue;
            }
            let Some(&member) = elem.path(&self.model).members().get(target as usize) else {
                continue;
            };
            let focal_side = elem
                .focal_side_neighbor(&self.model)
                .map(|neighbor| neighbor.visibility_idx());
            if focal_side != Some(member) {
                generation.push(member);
            }
        }
        Ok(generation)
    }

    /// `None` when vertex `key` has no generation in `direction`.
    pub fn generation_visibility(
        &self,
        key: &str,
        direction: Direction,
        vis: Option<&str>,
    ) -> Result<Option<CheckedStatus>, GraphError> {
        let generation = self.generation(key, direction, vis)?;
        if generation.is_empty() {
            return Ok(None);
        }
        let visible = self.visible_indices(vis)?;
        let shown = generation.iter().filter(|idx| visible.contains(idx)).count();
        Ok(Some(if shown == generation.len() {
            CheckedStatus::Full
        } else if shown > 0 {
            CheckedStatus::Partial
        } else {
            CheckedStatus::Empty
        }))
    }

    /// Hide a fully visible generation, otherwise show all of it.
    pub fn vis_with_updated_generation(
        &self,
        key: &str,
        direction: Direction,
        vis: Option<&str>,
    ) -> Result<Option<GenerationUpdate>, GraphError> {
        let generation = self.generation(key, direction, vis)?;
        let Some(status) = self.generation_visibility(key, direction, vis)? else {
            return Ok(None);
        };
        Ok(Some(if status == CheckedStatus::Full {
            GenerationUpdate {
                visibility_key: self.vis_without_elems(&generation, vis)?,
                update: CheckedStatus::Empty,
            }
        } else {
            GenerationUpdate {
                visibility_key: self.vis_with_elems(&generation, vis)?,
                update: CheckedStatus::Full,
            }
        }))
    }

    /// Reveal every element of the given vertices along with its path back to
    /// the focal node. Unknown keys are skipped.
    pub fn vis_with_vertices(&self, keys: &[&str], vis: Option<&str>) -> Result<String, GraphError> {
        let mut elems: Vec<usize> = Vec::new();
        for key in keys {
            match self.vertex_path_elems(key) {
                Some(vertex_elems) => elems.extend_from_slice(vertex_elems),
                None => tracing::warn!(vertex = ?key, "vertex not in graph, skipped"),
            }
        }
        self.vis_with_elems(&elems, vis)
    }

    /// Hide the visible elements of vertex `key` and everything beyond them.
    /// `None` when none of its elements are visible.
    pub fn vis_without_vertex(&self, key: &str, vis: Option<&str>) -> Result<Option<String>, GraphError> {
        match self.vertex_visible_path_elems(key, vis)? {
            Some(elems) if !elems.is_empty() => Ok(Some(self.vis_without_elems(&elems, vis)?)),
            _ => Ok(None),
        }
    }

    fn vis_with_elems(&self, elems: &[usize], vis: Option<&str>) -> Result<String, GraphError> {
        let mut visible = self.visible_indices(vis)?;
        for elem in elems.iter().filter_map(|&idx| self.model.path_elem(idx)) {
            visible.extend(elem.focal_path(&self.model).iter().map(|e| e.visibility_idx()));
        }
        Ok(encode_set(visible))
    }

    fn vis_without_elems(&self, elems: &[usize], vis: Option<&str>) -> Result<String, GraphError> {
        let mut visible = self.visible_indices(vis)?;
        for elem in elems.iter().filter_map(|&idx| self.model.path_elem(idx)) {
            for hidden in elem.external_path(&self.model) {
                visible.remove(&hidden.visibility_idx());
            }
        }
        Ok(encode_set(visible))
    }
}

fn encode_set(indices: FxHashSet<usize>) -> String {
    let mut sorted: Vec<usize> = indices.into_iter().collect();
    sorted.sort_unstable();
    visibility::encode(&sorted)
}

/// The configured hop count, clamped to `MAX_VISIBLE_HOPS` for configs that
/// skipped validation.
fn default_visible_hops(config: &DdgConfig) -> i32 {
    let hops = config.graph.effective_default_visible_hops();
    if hops > MAX_VISIBLE_HOPS {
        tracing::warn!(hops, max = MAX_VISIBLE_HOPS, "default visible hops clamped");
    }
    hops.min(MAX_VISIBLE_HOPS) as i32
}

/// Lowercased whitespace-separated tokens, `None` for an empty query.
fn find_tokens(ui_find: Option<&str>) -> Option<Vec<String>> {
    let tokens: Vec<String> = ui_find?
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    (!tokens.is_empty()).then_some(tokens)
}

/// A vertex matches when any token is a substring of its service or of one
/// of its operations, ignoring case.
fn ui_find_matches(vertices: &[DdgVertex], tokens: &[String]) -> FxHashSet<String> {
    vertices
        .iter()
        .filter(|vertex| {
            let service = vertex.service.to_lowercase();
            let operations: Vec<String> = vertex
                .operation
                .as_ref()
                .map(|op| op.names().into_iter().map(str::to_lowercase).collect())
                .unwrap_or_default();
            tokens.iter().any(|token| {
                service.contains(token.as_str())
                    || operations.iter().any(|op| op.contains(token.as_str()))
            })
        })
        .map(|vertex| vertex.key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(key: &str, service: &str, operation: Option<&str>) -> DdgVertex {
        DdgVertex {
            key: key.to_string(),
            service: service.to_string(),
            operation: operation.map(|op| VertexOperation::Single(op.to_string())),
            is_focal_node: false,
        }
    }

    #[test]
    fn find_tokens_ignores_blank_queries() {
        assert_eq!(find_tokens(None), None);
        assert_eq!(find_tokens(Some("")), None);
        assert_eq!(find_tokens(Some(" \t ")), None);
        assert_eq!(
            find_tokens(Some("  Foo bAR ")),
            Some(vec!["foo".to_string(), "bar".to_string()])
        );
    }

    #[test]
    fn ui_find_matches_service_or_operation() {
        let vertices = vec![
            vertex("a", "CartService", Some("checkout")),
            vertex("b", "payments", Some("Charge")),
            vertex("c", "inventory", None),
        ];
        let matches = ui_find_matches(&vertices, &["cart".to_string(), "charge".to_string()]);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains("a"));
        assert!(matches.contains("b"));
    }
}
