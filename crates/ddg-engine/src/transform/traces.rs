//! Traces → payload paths.
//!
//! Every leaf span is walked up to its root to form one path. Client and
//! internal spans that only continue their parent's service are dropped so
//! each hop reads as a service boundary.

use serde::{Deserialize, Serialize};

use ddg_core::errors::TransformError;
use ddg_core::types::collections::{FxHashMap, FxHashSet};

use crate::model::{DdgPayload, FocalSelector, PayloadAttribute, PayloadEntry, PayloadPath};

const SPAN_KIND_KEY: &str = "span.kind";
const SPAN_KIND_SERVER: &str = "server";

/// A fetched trace. Traces still loading (or that failed) carry no data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub data: Option<TraceData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceData {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    pub spans: Vec<Span>,
    pub processes: FxHashMap<String, Process>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "serviceName")]
    pub service_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefType {
    #[serde(rename = "CHILD_OF")]
    ChildOf,
    #[serde(rename = "FOLLOWS_FROM")]
    FollowsFrom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanReference {
    #[serde(rename = "refType")]
    pub ref_type: RefType,
    #[serde(rename = "spanID")]
    pub span_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(rename = "operationName")]
    pub operation_name: String,
    #[serde(rename = "processID")]
    pub process_id: String,
    #[serde(default)]
    pub references: Vec<SpanReference>,
    #[serde(default)]
    pub tags: Vec<KeyValue>,
    #[serde(rename = "hasChildren", default, skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
}

impl Span {
    /// The `CHILD_OF` parent, else whatever the first reference points at.
    pub fn parent_span_id(&self) -> Option<&str> {
        self.references
            .iter()
            .find(|r| r.ref_type == RefType::ChildOf)
            .or_else(|| self.references.first())
            .map(|r| r.span_id.as_str())
    }

    pub fn is_server(&self) -> bool {
        self.tags.iter().any(|tag| {
            tag.key == SPAN_KIND_KEY && tag.value.as_str() == Some(SPAN_KIND_SERVER)
        })
    }
}

/// Paths in first-seen order, deduplicated by their hops.
#[derive(Default)]
struct PathCollector {
    paths: Vec<PayloadPath>,
    index: FxHashMap<Vec<PayloadEntry>, usize>,
}

impl PathCollector {
    fn add(&mut self, path: Vec<PayloadEntry>, trace_id: &str) {
        match self.index.get(&path) {
            Some(&idx) => {
                let existing = &mut self.paths[idx];
                if !existing.exemplar_trace_ids().any(|id| id == trace_id) {
                    existing
                        .attributes
                        .push(PayloadAttribute::exemplar_trace_id(trace_id));
                }
            }
            None => {
                self.index.insert(path.clone(), self.paths.len());
                self.paths.push(PayloadPath {
                    path,
                    attributes: vec![PayloadAttribute::exemplar_trace_id(trace_id)],
                });
            }
        }
    }
}

/// Derive the payload for a focal service (and optionally operation) from
/// a set of traces.
///
/// Only paths that contain the focal node are kept.
pub fn transform_traces_to_paths(
    traces: &[Trace],
    focal_service: &str,
    focal_operation: Option<&str>,
) -> Result<DdgPayload, TransformError> {
    let focal = FocalSelector {
        service: focal_service.to_string(),
        operation: focal_operation.map(str::to_string),
    };
    let mut collector = PathCollector::default();

    for trace in traces {
        let Some(data) = &trace.data else {
            tracing::debug!("skipping trace without data");
            continue;
        };
        collect_trace_paths(data, &focal, &mut collector)?;
    }

    tracing::debug!(
        traces = traces.len(),
        paths = collector.paths.len(),
        focal = %focal,
        "traces transformed to paths"
    );
    Ok(DdgPayload {
        dependencies: collector.paths,
    })
}

fn collect_trace_paths(
    data: &TraceData,
    focal: &FocalSelector,
    collector: &mut PathCollector,
) -> Result<(), TransformError> {
    let spans_by_id: FxHashMap<&str, &Span> = data
        .spans
        .iter()
        .map(|span| (span.span_id.as_str(), span))
        .collect();

    // Only consulted for spans that do not say whether they have children.
    let parents: FxHashSet<&str> = data
        .spans
        .iter()
        .filter_map(|span| span.parent_span_id())
        .collect();

    for leaf in &data.spans {
        let has_children = leaf
            .has_children
            .unwrap_or_else(|| parents.contains(leaf.span_id.as_str()));
        if has_children {
            continue;
        }

        let mut hops: Vec<PayloadEntry> = Vec::new();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = Some(leaf);
        while let Some(span) = current {
            if !visited.insert(span.span_id.as_str()) {
                return Err(TransformError::InvalidTrace {
                    trace_id: data.trace_id.clone(),
                    message: format!("span references form a cycle at {}", span.span_id),
                });
            }
            let service = service_of(data, span)?;
            let parent = span
                .parent_span_id()
                .and_then(|id| spans_by_id.get(id).copied());

            let continues_parent_service = match parent {
                Some(parent) => service_of(data, parent)? == service,
                None => false,
            };
            if span.is_server() || !continues_parent_service {
                hops.push(PayloadEntry::new(service, span.operation_name.clone()));
            }
            current = parent;
        }
        hops.reverse();

        if hops.iter().any(|hop| focal.matches_entry(hop)) {
            collector.add(hops, &data.trace_id);
        }
    }
    Ok(())
}

fn service_of<'d>(data: &'d TraceData, span: &Span) -> Result<&'d str, TransformError> {
    data.processes
        .get(&span.process_id)
        .map(|process| process.service_name.as_str())
        .ok_or_else(|| TransformError::InvalidTrace {
            trace_id: data.trace_id.clone(),
            message: format!(
                "span {} references unknown process {}",
                span.span_id, span.process_id
            ),
        })
}
