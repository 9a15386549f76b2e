//! Shared path fixtures.
#![allow(dead_code)]

use std::sync::Arc;

use ddg_engine::model::{DdgModel, DdgPayload, FocalSelector, PayloadEntry};
use ddg_engine::transform::transform_ddg_data;

pub fn elem(label: &str) -> PayloadEntry {
    PayloadEntry::new(format!("{label}Service"), format!("{label}Operation"))
}

pub fn focal_elem() -> PayloadEntry {
    elem("focal")
}

pub fn focal_selector() -> FocalSelector {
    FocalSelector::service("focalService").with_operation("focalOperation")
}

/// `first before focal after last`, focal at member 2.
pub fn simple_path() -> Vec<PayloadEntry> {
    vec![elem("first"), elem("before"), focal_elem(), elem("after"), elem("last")]
}

/// `simple_path` padded with prequel/sequel variants of every non-focal hop.
pub fn long_simple_path() -> Vec<PayloadEntry> {
    let path = simple_path();
    let mut prequels = Vec::new();
    let mut sequels = Vec::new();
    for entry in &path {
        if entry.service != "focalService" && entry.operation != "focalOperation" {
            prequels.push(PayloadEntry::new(
                entry.service.clone(),
                format!("prequel-{}", entry.operation),
            ));
            sequels.push(PayloadEntry::new(
                format!("sequel-{}", entry.service),
                entry.operation.clone(),
            ));
        }
    }
    prequels.into_iter().chain(path).chain(sequels).collect()
}

pub fn no_focal_path() -> Vec<PayloadEntry> {
    vec![elem("first"), elem("before"), elem("mid"), elem("after"), elem("last")]
}

pub fn double_focal_path() -> Vec<PayloadEntry> {
    vec![
        elem("first"),
        elem("before"),
        focal_elem(),
        elem("mid"),
        focal_elem(),
        elem("after"),
        elem("last"),
    ]
}

/// Like `double_focal_path`, but the first focal-service hop uses another operation.
pub fn almost_double_focal_path() -> Vec<PayloadEntry> {
    vec![
        elem("first"),
        elem("before"),
        PayloadEntry::new("focalService", "someOtherOperation"),
        elem("mid"),
        focal_elem(),
        elem("after"),
        elem("last"),
    ]
}

/// Two paths sharing `first`, the focal node and the `after last` tail, but
/// diverging right after the focal node.
pub fn convergent_paths() -> Vec<Vec<PayloadEntry>> {
    vec![
        vec![elem("first"), focal_elem(), elem("divergentPayloadElem"), elem("after"), elem("last")],
        vec![elem("first"), focal_elem(), elem("mid"), elem("after"), elem("last")],
    ]
}

/// Paths around a `target` service reached both upstream and downstream.
pub fn generation_paths() -> Vec<Vec<PayloadEntry>> {
    vec![
        vec![elem("beforeTarget0"), elem("target"), elem("beforeFocalMid"), focal_elem()],
        vec![elem("beforeTarget1"), elem("target"), elem("beforeFocalMid"), focal_elem()],
        vec![focal_elem(), elem("afterFocalMid"), elem("target")],
        vec![focal_elem(), elem("afterFocalMid"), elem("target"), elem("afterTarget0")],
        vec![focal_elem(), elem("afterFocalMid"), elem("target"), elem("afterTarget1")],
        vec![elem("target"), elem("beforeFocalMid"), focal_elem()],
    ]
}

/// `a b focal c d / a c focal d c / c:1 focal b d / c focal b / a c focal b`,
/// every operation `0` unless noted.
pub fn density_payload() -> DdgPayload {
    let parse = |line: &str| -> Vec<PayloadEntry> {
        line.split_whitespace()
            .map(|pair| {
                let (service, operation) = pair.split_once(':').unwrap_or((pair, ""));
                PayloadEntry::new(service, operation)
            })
            .collect()
    };
    DdgPayload::from_paths(
        [
            "a:0 b:0 focal:focal c:0 d:0",
            "a:0 c:0 focal:focal d:0 c:0",
            "c:1 focal:focal b:0 d:0",
            "c:0 focal:focal b:0",
            "a:0 c:0 focal:focal b:0",
        ]
        .iter()
        .map(|line| parse(line))
        .collect(),
    )
}

pub fn model_for(paths: Vec<Vec<PayloadEntry>>) -> Arc<DdgModel> {
    Arc::new(transform_ddg_data(&DdgPayload::from_paths(paths), &focal_selector()).unwrap())
}

pub fn simple_model() -> Arc<DdgModel> {
    model_for(vec![simple_path()])
}

pub fn convergent_model() -> Arc<DdgModel> {
    model_for(convergent_paths())
}

/// Visibility index of the element at `member_idx` of path `path_idx`.
pub fn vis_idx(model: &DdgModel, path_idx: usize, member_idx: usize) -> usize {
    model.paths()[path_idx].members()[member_idx]
}
