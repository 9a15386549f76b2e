//! Payload → `DdgModel`.
//!
//! Paths are sorted before processing so visibility indices do not depend on
//! payload order. Indices are then handed out concentrically: the focal
//! elements first, then for each distance `d` the elements at `+d` followed
//! by those at `-d`.

use xxhash_rust::xxh3::Xxh3;

use ddg_core::errors::TransformError;
use ddg_core::types::collections::{BTreeMap, SmallVec8};

use crate::model::{DdgModel, DdgPayload, FocalSelector, Operation, Path, PathElem, PayloadPath, Service};

/// An element before its visibility index is known.
struct PendingElem {
    member_idx: usize,
    path_idx: usize,
    operation: usize,
    distance: i32,
}

/// Build the model for `focal` from every path in `payload`.
///
/// Fails without returning a partial model if any path lacks the focal node.
pub fn transform_ddg_data(
    payload: &DdgPayload,
    focal: &FocalSelector,
) -> Result<DdgModel, TransformError> {
    let mut sorted: Vec<(String, &PayloadPath)> = payload
        .dependencies
        .iter()
        .map(|path| (compare_string(path), path))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Xxh3::new();
    hasher.update(focal.to_string().as_bytes());

    let mut services: BTreeMap<String, Service> = BTreeMap::new();
    let mut operations: Vec<Operation> = Vec::new();
    let mut paths: Vec<Path> = Vec::with_capacity(sorted.len());
    let mut pending: Vec<PendingElem> = Vec::new();

    for (path_idx, (compare, payload_path)) in sorted.iter().enumerate() {
        hasher.update(compare.as_bytes());
        hasher.update(b"\n");

        let focal_idx = payload_path
            .path
            .iter()
            .position(|entry| focal.matches_entry(entry))
            .ok_or_else(|| TransformError::MissingFocalNode {
                path: compare.clone(),
            })?;

        let mut members = SmallVec8::with_capacity(payload_path.path.len());
        for (member_idx, entry) in payload_path.path.iter().enumerate() {
            let operation = intern_operation(&mut services, &mut operations, &entry.service, &entry.operation);
            members.push(pending.len());
            pending.push(PendingElem {
                member_idx,
                path_idx,
                operation,
                distance: member_idx as i32 - focal_idx as i32,
            });
        }

        let mut trace_ids: Vec<String> = Vec::new();
        for id in payload_path.exemplar_trace_ids() {
            if !trace_ids.iter().any(|existing| existing == id) {
                trace_ids.push(id.to_string());
            }
        }
        paths.push(Path::new(focal_idx, members, trace_ids));
    }

    let mut pending_by_distance: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (pending_idx, elem) in pending.iter().enumerate() {
        pending_by_distance
            .entry(elem.distance)
            .or_default()
            .push(pending_idx);
    }

    let order = concentric_order(&pending_by_distance);

    // pending index → visibility index
    let mut visibility_of = vec![0usize; pending.len()];
    let mut path_elems: Vec<PathElem> = Vec::with_capacity(pending.len());
    for (visibility_idx, &pending_idx) in order.iter().enumerate() {
        visibility_of[pending_idx] = visibility_idx;
        let elem = &pending[pending_idx];
        operations[elem.operation].push_path_elem(visibility_idx);
        path_elems.push(PathElem::new(
            elem.member_idx,
            elem.path_idx,
            elem.operation,
            elem.distance,
            visibility_idx,
        ));
    }

    for path in &mut paths {
        for member in path.members_mut().iter_mut() {
            *member = visibility_of[*member];
        }
    }
    for operation in &mut operations {
        operation.sort_path_elems();
    }

    let distance_to_path_elems: BTreeMap<i32, Vec<usize>> = pending_by_distance
        .into_iter()
        .map(|(distance, elems)| {
            let mut indices: Vec<usize> = elems.into_iter().map(|idx| visibility_of[idx]).collect();
            indices.sort_unstable();
            (distance, indices)
        })
        .collect();

    tracing::info!(
        focal = %focal,
        paths = paths.len(),
        path_elems = path_elems.len(),
        services = services.len(),
        "ddg model built"
    );

    Ok(DdgModel::from_parts(
        focal.clone(),
        paths,
        path_elems,
        operations,
        services,
        distance_to_path_elems,
        hasher.digest(),
    ))
}

/// Sort key for a path: hops as `service\toperation`, joined with `,`.
fn compare_string(path: &PayloadPath) -> String {
    path.path
        .iter()
        .map(|entry| format!("{}\t{}", entry.service, entry.operation))
        .collect::<Vec<_>>()
        .join(",")
}

fn intern_operation(
    services: &mut BTreeMap<String, Service>,
    operations: &mut Vec<Operation>,
    service: &str,
    operation: &str,
) -> usize {
    let entry = services
        .entry(service.to_string())
        .or_insert_with(|| Service::new(service.to_string()));
    if let Some(&id) = entry.operations().get(operation) {
        return id;
    }
    let id = operations.len();
    operations.push(Operation::new(operation.to_string(), service.to_string()));
    entry.operations_mut().insert(operation.to_string(), id);
    id
}

/// Distance 0, then `+1`, `-1`, `+2`, `-2`, ... until both sides run out.
fn concentric_order(by_distance: &BTreeMap<i32, Vec<usize>>) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::new();
    if let Some(focal) = by_distance.get(&0) {
        order.extend_from_slice(focal);
    }
    let mut downstream = 1;
    let mut upstream = -1;
    loop {
        let down = by_distance.get(&downstream);
        let up = by_distance.get(&upstream);
        if down.is_none() && up.is_none() {
            break;
        }
        if let Some(elems) = down {
            order.extend_from_slice(elems);
            downstream += 1;
        }
        if let Some(elems) = up {
            order.extend_from_slice(elems);
            upstream -= 1;
        }
    }
    order
}
