//! Vertex-key strategies, one per `Density`.
//!
//! A strategy decides which path elements collapse into one vertex: two
//! elements share a vertex exactly when their keys are equal.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use ddg_core::Density;

use crate::model::{DdgModel, PathElem};

/// Key of the single focal vertex in a `GraphModel`.
pub const FOCAL_KEY: &str = "focal-key";

const HOP_SEPARATOR: char = '\n';

/// Derives the vertex key of a path element.
pub trait VertexKeyStrategy: Send + Sync + fmt::Debug {
    fn density(&self) -> Density;

    /// Whether non-focal hops carry their operation name.
    fn show_operations(&self) -> bool;

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String;

    /// Whether a non-focal element is drawn as part of the focal vertex.
    fn joins_focal_vertex(&self, _elem: &PathElem, _model: &DdgModel) -> bool {
        false
    }
}

/// Selects the strategy for a density.
pub trait DensityStrategy {
    fn strategy(self, show_operations: bool) -> Arc<dyn VertexKeyStrategy>;
}

impl DensityStrategy for Density {
    fn strategy(self, show_operations: bool) -> Arc<dyn VertexKeyStrategy> {
        match self {
            Density::MostConcise => Arc::new(MostConcise { show_operations }),
            Density::UpstreamVsDownstream => Arc::new(UpstreamVsDownstream { show_operations }),
            Density::OnePerLevel => Arc::new(OnePerLevel { show_operations }),
            Density::PreventPathEntanglement => {
                Arc::new(PreventPathEntanglement { show_operations })
            }
            Density::ExternalVsInternal => Arc::new(ExternalVsInternal { show_operations }),
        }
    }
}

/// `service\toperation`, or just `service` for a non-focal hop when
/// operations are hidden. Names are escaped so neither separator can occur
/// inside a single hop.
pub fn hop_key(elem: &PathElem, model: &DdgModel, show_operations: bool) -> String {
    let service = escape_name(elem.service_name(model));
    if show_operations || elem.is_focal() {
        format!("{}\t{}", service, escape_name(elem.operation_name(model)))
    } else {
        service.into_owned()
    }
}

fn escape_name(name: &str) -> Cow<'_, str> {
    if !name.contains(['\\', '\t', '\n']) {
        return Cow::Borrowed(name);
    }
    let mut escaped = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Hops from the focal element to `elem`, inclusive, in path order.
pub fn focal_chain_key(elem: &PathElem, model: &DdgModel, show_operations: bool) -> String {
    let mut key = String::new();
    for (i, hop) in elem.focal_path(model).into_iter().enumerate() {
        if i > 0 {
            key.push(HOP_SEPARATOR);
        }
        key.push_str(&hop_key(hop, model, show_operations));
    }
    key
}

#[derive(Debug, Clone, Copy)]
pub struct MostConcise {
    pub show_operations: bool,
}

impl VertexKeyStrategy for MostConcise {
    fn density(&self) -> Density {
        Density::MostConcise
    }

    fn show_operations(&self) -> bool {
        self.show_operations
    }

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String {
        hop_key(elem, model, self.show_operations)
    }

    /// Same service as the focal node and, when operations are shown, one
    /// of the focal operations.
    fn joins_focal_vertex(&self, elem: &PathElem, model: &DdgModel) -> bool {
        if elem.service_name(model) != model.focal().service {
            return false;
        }
        !self.show_operations
            || model
                .focal_operations()
                .contains(&elem.operation_name(model))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UpstreamVsDownstream {
    pub show_operations: bool,
}

impl VertexKeyStrategy for UpstreamVsDownstream {
    fn density(&self) -> Density {
        Density::UpstreamVsDownstream
    }

    fn show_operations(&self) -> bool {
        self.show_operations
    }

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String {
        format!(
            "{}={}",
            hop_key(elem, model, self.show_operations),
            elem.distance().signum()
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OnePerLevel {
    pub show_operations: bool,
}

impl VertexKeyStrategy for OnePerLevel {
    fn density(&self) -> Density {
        Density::OnePerLevel
    }

    fn show_operations(&self) -> bool {
        self.show_operations
    }

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String {
        format!(
            "{}={}",
            hop_key(elem, model, self.show_operations),
            elem.distance()
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PreventPathEntanglement {
    pub show_operations: bool,
}

impl VertexKeyStrategy for PreventPathEntanglement {
    fn density(&self) -> Density {
        Density::PreventPathEntanglement
    }

    fn show_operations(&self) -> bool {
        self.show_operations
    }

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String {
        focal_chain_key(elem, model, self.show_operations)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExternalVsInternal {
    pub show_operations: bool,
}

impl VertexKeyStrategy for ExternalVsInternal {
    fn density(&self) -> Density {
        Density::ExternalVsInternal
    }

    fn show_operations(&self) -> bool {
        self.show_operations
    }

    fn vertex_key(&self, elem: &PathElem, model: &DdgModel) -> String {
        let key = focal_chain_key(elem, model, self.show_operations);
        if elem.is_external(model) {
            format!("{key}{HOP_SEPARATOR}(external)")
        } else {
            key
        }
    }
}
