//! DdgEvManager: incremental shows and hides driven by visibility keys.

mod common;

use std::sync::Arc;

use ddg_core::errors::GraphError;
use ddg_core::types::collections::FxHashSet;
use ddg_core::Density;
use ddg_engine::graph::{DdgEvManager, DensityStrategy};
use ddg_engine::model::DdgModel;
use ddg_engine::visibility::{change_visibility, create_visibility_key};

use common::*;

fn manager(model: Arc<DdgModel>) -> DdgEvManager {
    DdgEvManager::new(model, Density::PreventPathEntanglement.strategy(true))
}

fn key_of(manager: &DdgEvManager, idx: usize) -> String {
    manager.vertex_for_path_elem(idx).unwrap().vertex.key.clone()
}

/// Expected shape of one vertex: the elements drawn as it and one element of
/// each neighboring vertex.
struct Expected<'a> {
    vis: &'a [usize],
    ingress: &'a [usize],
    egress: &'a [usize],
}

fn validate(manager: &DdgEvManager, expected: &[Expected<'_>]) {
    let mut edge_count = 0;
    for vertex in expected {
        let key = key_of(manager, vertex.vis[0]);
        let ev = manager.vertex(&key).unwrap();
        let elems: FxHashSet<usize> = vertex.vis.iter().copied().collect();
        assert_eq!(ev.path_elems, elems, "elements of {key:?}");

        let mut ingress: Vec<String> = vertex.ingress.iter().map(|&i| key_of(manager, i)).collect();
        ingress.sort();
        assert_eq!(manager.ingress_neighbors(&key), ingress, "ingress of {key:?}");

        let mut egress: Vec<String> = vertex.egress.iter().map(|&i| key_of(manager, i)).collect();
        egress.sort();
        assert_eq!(manager.egress_neighbors(&key), egress, "egress of {key:?}");

        edge_count += vertex.egress.len();
    }
    assert_eq!(manager.vertex_count(), expected.len());
    assert_eq!(manager.edge_count(), edge_count);
}

fn vertex<'a>(vis: &'a [usize], ingress: &'a [usize], egress: &'a [usize]) -> Expected<'a> {
    Expected { vis, ingress, egress }
}

// ---- simple one-path one-hop ----

fn one_hop_manager() -> (DdgEvManager, String) {
    let mut m = manager(simple_model());
    let key = create_visibility_key(&[0, 1, 2]);
    m.get_edges_and_vertices(&key).unwrap();
    (m, key)
}

#[test]
fn test_one_hop_has_three_vertices_and_two_edges() {
    let (m, _) = one_hop_manager();
    validate(
        &m,
        &[vertex(&[0], &[2], &[1]), vertex(&[1], &[0], &[]), vertex(&[2], &[], &[0])],
    );
    assert_eq!(key_of(&m, 0), "focalService\tfocalOperation");
}

#[test]
fn test_hide_removes_vertex_and_edge() {
    let (mut m, key) = one_hop_manager();
    let hidden = change_visibility(&key, &[], &[1]).unwrap();
    let view = m.get_edges_and_vertices(&hidden).unwrap();
    validate(&m, &[vertex(&[0], &[2], &[]), vertex(&[2], &[], &[0])]);
    assert_eq!(view.vertices.len(), 2);
    assert_eq!(view.edges.len(), 1);
    assert_eq!(m.last_visibility_key(), hidden);
}

#[test]
fn test_empty_key_removes_everything() {
    let (mut m, _) = one_hop_manager();
    let view = m.get_edges_and_vertices("").unwrap();
    assert!(view.is_empty());
    validate(&m, &[]);
}

#[test]
fn test_same_key_twice_is_stable() {
    let (mut m, key) = one_hop_manager();
    let before = m.snapshot();
    let after = m.get_edges_and_vertices(&key).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_round_trip_restores_view() {
    let (mut m, key) = one_hop_manager();
    let before = m.snapshot();
    m.get_edges_and_vertices("").unwrap();
    let after = m.get_edges_and_vertices(&key).unwrap();

    let sorted = |mut keys: Vec<String>| {
        keys.sort();
        keys
    };
    assert_eq!(
        sorted(before.vertices.iter().map(|v| v.key.clone()).collect()),
        sorted(after.vertices.iter().map(|v| v.key.clone()).collect())
    );
    let mut before_edges = before.edges;
    let mut after_edges = after.edges;
    before_edges.sort();
    after_edges.sort();
    assert_eq!(before_edges, after_edges);
}

// ---- convergent paths ----

fn convergent_manager() -> (DdgEvManager, String, String) {
    let mut m = manager(convergent_model());
    let one_hop = create_visibility_key(&[0, 1, 2, 3, 4, 5]);
    let full = change_visibility(&one_hop, &[6, 7, 8, 9], &[]).unwrap();
    m.get_edges_and_vertices(&one_hop).unwrap();
    (m, one_hop, full)
}

#[test]
fn test_convergent_one_hop() {
    let (m, _, _) = convergent_manager();
    validate(
        &m,
        &[
            vertex(&[0, 1], &[4], &[2, 3]),
            vertex(&[4, 5], &[], &[0]),
            vertex(&[2], &[0], &[]),
            vertex(&[3], &[0], &[]),
        ],
    );
}

#[test]
fn test_equal_elems_with_different_focal_side_neighbors_stay_separate() {
    let (mut m, one_hop, _) = convergent_manager();
    m.get_edges_and_vertices(&change_visibility(&one_hop, &[6, 7], &[]).unwrap())
        .unwrap();
    validate(
        &m,
        &[
            vertex(&[0, 1], &[4], &[2, 3]),
            vertex(&[4, 5], &[], &[0]),
            vertex(&[2], &[0], &[6]),
            vertex(&[6], &[2], &[]),
            vertex(&[3], &[0], &[7]),
            vertex(&[7], &[3], &[]),
        ],
    );
}

#[test]
fn test_convergent_full_key() {
    let (mut m, _, full) = convergent_manager();
    m.get_edges_and_vertices(&full).unwrap();
    validate(
        &m,
        &[
            vertex(&[0, 1], &[4], &[2, 3]),
            vertex(&[4, 5], &[], &[0]),
            vertex(&[2], &[0], &[6]),
            vertex(&[6], &[2], &[8]),
            vertex(&[8], &[6], &[]),
            vertex(&[3], &[0], &[7]),
            vertex(&[7], &[3], &[9]),
            vertex(&[9], &[7], &[]),
        ],
    );
}

#[test]
fn test_hide_keeps_equal_elems_on_other_path() {
    let (mut m, _, full) = convergent_manager();
    m.get_edges_and_vertices(&full).unwrap();
    m.get_edges_and_vertices(&change_visibility(&full, &[], &[4, 6, 8]).unwrap())
        .unwrap();
    validate(
        &m,
        &[
            vertex(&[5], &[], &[0]),
            vertex(&[0, 1], &[5], &[2, 3]),
            vertex(&[2], &[0], &[]),
            vertex(&[3], &[0], &[7]),
            vertex(&[7], &[3], &[9]),
            vertex(&[9], &[7], &[]),
        ],
    );
}

#[test]
fn test_shared_edge_tracks_every_far_side_elem() {
    let (mut m, _, full) = convergent_manager();
    m.get_edges_and_vertices(&full).unwrap();
    let into_focal = |m: &DdgEvManager| -> FxHashSet<usize> {
        m.edge_path_elems()
            .find(|(edge, _)| edge.to == "focalService\tfocalOperation" && edge.from.starts_with("first"))
            .map(|(_, elems)| elems.clone())
            .unwrap()
    };
    assert_eq!(into_focal(&m), [4, 5].into_iter().collect::<FxHashSet<usize>>());

    m.get_edges_and_vertices(&change_visibility(&full, &[], &[4]).unwrap())
        .unwrap();
    assert_eq!(into_focal(&m), [5].into_iter().collect::<FxHashSet<usize>>());
}

#[test]
fn test_snapshot_lists_each_edge_once() {
    let (mut m, _, full) = convergent_manager();
    let view = m.get_edges_and_vertices(&full).unwrap();
    assert_eq!(view.vertices.len(), 8);
    assert_eq!(view.edges.len(), 7);
    let distinct: FxHashSet<_> = view.edges.iter().collect();
    assert_eq!(distinct.len(), view.edges.len());
}

// ---- contract violations ----

#[test]
fn test_show_out_of_bounds_index_errors() {
    let mut m = manager(simple_model());
    let full = create_visibility_key(&[0, 1, 2, 3, 4]);
    m.get_edges_and_vertices(&full).unwrap();
    let out_of_bounds = change_visibility(&full, &[5], &[]).unwrap();
    assert!(matches!(
        m.get_edges_and_vertices(&out_of_bounds),
        Err(GraphError::UnknownVisibilityIdx { idx: 5 })
    ));
}

#[test]
fn test_show_disconnected_elem_errors() {
    let mut m = manager(simple_model());
    assert!(matches!(
        m.get_edges_and_vertices(&create_visibility_key(&[0, 3])),
        Err(GraphError::DisconnectedPathElem { idx: 3, .. })
    ));
}

#[test]
fn test_show_elem_whose_neighbor_hides_in_same_change_errors() {
    let mut m = manager(simple_model());
    let all_but_one = create_visibility_key(&[0, 1, 2, 3]);
    m.get_edges_and_vertices(&all_but_one).unwrap();
    let problematic = change_visibility(&all_but_one, &[4], &[2]).unwrap();
    assert!(matches!(
        m.get_edges_and_vertices(&problematic),
        Err(GraphError::DisconnectedPathElem { idx: 4, .. })
    ));
}

#[test]
fn test_malformed_key_errors() {
    let mut m = manager(simple_model());
    assert!(matches!(
        m.get_edges_and_vertices("1,%"),
        Err(GraphError::Visibility(_))
    ));
}

// ---- strategies ----

#[test]
fn test_manager_uses_injected_strategy() {
    let model = convergent_model();
    let mut m = DdgEvManager::new(Arc::clone(&model), Density::MostConcise.strategy(false));
    let all: Vec<usize> = (0..model.len()).collect();
    m.get_edges_and_vertices(&create_visibility_key(&all)).unwrap();

    // Both "after" elements and both "last" elements collapse by service.
    assert_eq!(key_of(&m, 6), "afterService");
    assert_eq!(key_of(&m, 6), key_of(&m, 7));
    assert_eq!(key_of(&m, 8), key_of(&m, 9));
    assert_eq!(m.vertex_count(), 6);
    assert_eq!(m.edge_count(), 6);
}
