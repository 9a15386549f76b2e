//! Immutable dependency model built by the payload transform.
//!
//! Path elements live in one arena ordered by visibility index, so the
//! index doubles as the element handle. Paths refer to their members by
//! that handle and elements refer back to their path and operation by
//! position, which keeps the model free of reference cycles.

use std::fmt;

use serde::{Deserialize, Serialize};

use ddg_core::types::collections::{BTreeMap, SmallVec8};

use super::PayloadEntry;

/// The service (and optionally operation) a graph is centered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FocalSelector {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl FocalSelector {
    /// Selector matching any operation of `service`.
    pub fn service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: None,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn matches(&self, service: &str, operation: &str) -> bool {
        self.service == service
            && self
                .operation
                .as_deref()
                .map_or(true, |focal_op| focal_op == operation)
    }

    pub fn matches_entry(&self, entry: &PayloadEntry) -> bool {
        self.matches(&entry.service, &entry.operation)
    }
}

impl fmt::Display for FocalSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some(op) => write!(f, "{}::{}", self.service, op),
            None => write!(f, "{}::*", self.service),
        }
    }
}

/// Which side of a vertex a connection attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    Ingress,
    Egress,
}

impl EdgeSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Ingress => Self::Egress,
            Self::Egress => Self::Ingress,
        }
    }
}

/// An operation of a service, with the elements that use it.
#[derive(Debug, Clone)]
pub struct Operation {
    name: String,
    service: String,
    path_elems: Vec<usize>,
}

impl Operation {
    pub(crate) fn new(name: String, service: String) -> Self {
        Self {
            name,
            service,
            path_elems: Vec::new(),
        }
    }

    pub(crate) fn push_path_elem(&mut self, visibility_idx: usize) {
        self.path_elems.push(visibility_idx);
    }

    pub(crate) fn sort_path_elems(&mut self) {
        self.path_elems.sort_unstable();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Visibility indices of every element using this operation, ascending.
    pub fn path_elems(&self) -> &[usize] {
        &self.path_elems
    }
}

/// A service and its operations, keyed by operation name.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    operations: BTreeMap<String, usize>,
}

impl Service {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            operations: BTreeMap::new(),
        }
    }

    pub(crate) fn operations_mut(&mut self) -> &mut BTreeMap<String, usize> {
        &mut self.operations
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operation name to operation id.
    pub fn operations(&self) -> &BTreeMap<String, usize> {
        &self.operations
    }
}

/// One hop within one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElem {
    member_idx: usize,
    path_idx: usize,
    operation: usize,
    distance: i32,
    visibility_idx: usize,
}

impl PathElem {
    pub(crate) fn new(
        member_idx: usize,
        path_idx: usize,
        operation: usize,
        distance: i32,
        visibility_idx: usize,
    ) -> Self {
        Self {
            member_idx,
            path_idx,
            operation,
            distance,
            visibility_idx,
        }
    }

    pub fn member_idx(&self) -> usize {
        self.member_idx
    }

    /// Index of the owning path in `DdgModel::paths`.
    pub fn path_idx(&self) -> usize {
        self.path_idx
    }

    /// Operation id in `DdgModel::operation`.
    pub fn operation_id(&self) -> usize {
        self.operation
    }

    /// `member_idx - focal_idx`: negative upstream, positive downstream.
    pub fn distance(&self) -> i32 {
        self.distance
    }

    pub fn visibility_idx(&self) -> usize {
        self.visibility_idx
    }

    pub fn is_focal(&self) -> bool {
        self.distance == 0
    }

    pub fn path<'m>(&self, model: &'m DdgModel) -> &'m Path {
        &model.paths[self.path_idx]
    }

    pub fn operation<'m>(&self, model: &'m DdgModel) -> &'m Operation {
        &model.operations[self.operation]
    }

    pub fn service_name<'m>(&self, model: &'m DdgModel) -> &'m str {
        self.operation(model).service()
    }

    pub fn operation_name<'m>(&self, model: &'m DdgModel) -> &'m str {
        self.operation(model).name()
    }

    /// Side of this element's vertex that faces the focal node.
    ///
    /// Downstream elements are reached through their ingress side, upstream
    /// elements through their egress side.
    pub fn focal_side_edges(&self) -> EdgeSide {
        if self.distance > 0 {
            EdgeSide::Ingress
        } else {
            EdgeSide::Egress
        }
    }

    pub fn far_side_edges(&self) -> EdgeSide {
        self.focal_side_edges().opposite()
    }

    /// The adjacent member one step closer to the focal element.
    pub fn focal_side_neighbor<'m>(&self, model: &'m DdgModel) -> Option<&'m PathElem> {
        let member_idx = match self.distance.signum() {
            0 => return None,
            1 => self.member_idx - 1,
            _ => self.member_idx + 1,
        };
        self.member_at(model, member_idx)
    }

    /// The adjacent member one step further from the focal element.
    pub fn external_side_neighbor<'m>(&self, model: &'m DdgModel) -> Option<&'m PathElem> {
        match self.distance.signum() {
            0 => None,
            1 => self.member_at(model, self.member_idx + 1),
            _ => self
                .member_idx
                .checked_sub(1)
                .and_then(|idx| self.member_at(model, idx)),
        }
    }

    /// A non-focal element at either end of its path.
    pub fn is_external(&self, model: &DdgModel) -> bool {
        if self.distance == 0 {
            return false;
        }
        let last = self.path(model).members.len().saturating_sub(1);
        self.member_idx == 0 || self.member_idx == last
    }

    /// This element and every member between it and the focal element, inclusive,
    /// in path order.
    pub fn focal_path<'m>(&self, model: &'m DdgModel) -> Vec<&'m PathElem> {
        let focal_idx = self.path(model).focal_idx;
        let (lo, hi) = if self.member_idx <= focal_idx {
            (self.member_idx, focal_idx)
        } else {
            (focal_idx, self.member_idx)
        };
        (lo..=hi)
            .filter_map(|idx| self.member_at(model, idx))
            .collect()
    }

    /// This element and every member between it and the far end of its path,
    /// inclusive. Empty for the focal element.
    pub fn external_path<'m>(&self, model: &'m DdgModel) -> Vec<&'m PathElem> {
        let len = self.path(model).members.len();
        let range = match self.distance.signum() {
            0 => return Vec::new(),
            1 => self.member_idx..len,
            _ => 0..self.member_idx + 1,
        };
        range.filter_map(|idx| self.member_at(model, idx)).collect()
    }

    /// Human-readable identification for errors and logs.
    pub fn describe(&self, model: &DdgModel) -> String {
        format!(
            "{}\t{} (path {}, member {}, distance {})",
            self.service_name(model),
            self.operation_name(model),
            self.path_idx,
            self.member_idx,
            self.distance
        )
    }

    fn member_at<'m>(&self, model: &'m DdgModel, member_idx: usize) -> Option<&'m PathElem> {
        self.path(model)
            .members
            .get(member_idx)
            .and_then(|&vis_idx| model.path_elem(vis_idx))
    }
}

/// One call path, with the visibility indices of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    focal_idx: usize,
    members: SmallVec8<usize>,
    trace_ids: Vec<String>,
}

impl Path {
    pub(crate) fn new(focal_idx: usize, members: SmallVec8<usize>, trace_ids: Vec<String>) -> Self {
        Self {
            focal_idx,
            members,
            trace_ids,
        }
    }

    pub(crate) fn members_mut(&mut self) -> &mut SmallVec8<usize> {
        &mut self.members
    }

    pub fn focal_idx(&self) -> usize {
        self.focal_idx
    }

    /// Visibility indices of the members, in path order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Exemplar trace ids carried by the payload for this path.
    pub fn trace_ids(&self) -> &[String] {
        &self.trace_ids
    }
}

/// The parsed model for one focal query. Immutable once built.
#[derive(Debug, Clone)]
pub struct DdgModel {
    focal: FocalSelector,
    paths: Vec<Path>,
    path_elems: Vec<PathElem>,
    operations: Vec<Operation>,
    services: BTreeMap<String, Service>,
    distance_to_path_elems: BTreeMap<i32, Vec<usize>>,
    hash: u64,
}

impl DdgModel {
    pub(crate) fn from_parts(
        focal: FocalSelector,
        paths: Vec<Path>,
        path_elems: Vec<PathElem>,
        operations: Vec<Operation>,
        services: BTreeMap<String, Service>,
        distance_to_path_elems: BTreeMap<i32, Vec<usize>>,
        hash: u64,
    ) -> Self {
        Self {
            focal,
            paths,
            path_elems,
            operations,
            services,
            distance_to_path_elems,
            hash,
        }
    }

    pub fn focal(&self) -> &FocalSelector {
        &self.focal
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Every element, indexed by visibility index.
    pub fn path_elems(&self) -> &[PathElem] {
        &self.path_elems
    }

    pub fn path_elem(&self, visibility_idx: usize) -> Option<&PathElem> {
        self.path_elems.get(visibility_idx)
    }

    pub fn operation(&self, id: usize) -> Option<&Operation> {
        self.operations.get(id)
    }

    pub fn services(&self) -> &BTreeMap<String, Service> {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn distance_to_path_elems(&self) -> &BTreeMap<i32, Vec<usize>> {
        &self.distance_to_path_elems
    }

    /// Visibility indices of the elements at `distance`.
    pub fn path_elems_at(&self, distance: i32) -> &[usize] {
        self.distance_to_path_elems
            .get(&distance)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct operations of the focal elements, in visibility order.
    pub fn focal_operations(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = Vec::new();
        for &idx in self.path_elems_at(0) {
            let op = self.path_elems[idx].operation_name(self);
            if !ops.contains(&op) {
                ops.push(op);
            }
        }
        ops
    }

    /// Content hash of the sorted paths plus the focal selector.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.path_elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_elems.is_empty()
    }
}
