//! Raw payload shapes accepted by the transform.

use serde::{Deserialize, Serialize};

use ddg_core::constants::EXEMPLAR_TRACE_ID_KEY;
use ddg_core::errors::TransformError;

/// One hop of a raw path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadEntry {
    pub service: String,
    pub operation: String,
}

impl PayloadEntry {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
        }
    }
}

/// Key/value attribute attached to a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadAttribute {
    pub key: String,
    pub value: String,
}

impl PayloadAttribute {
    /// Attribute carrying an exemplar trace id.
    pub fn exemplar_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            key: EXEMPLAR_TRACE_ID_KEY.to_string(),
            value: trace_id.into(),
        }
    }
}

/// A raw path plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadPath {
    pub path: Vec<PayloadEntry>,
    #[serde(default)]
    pub attributes: Vec<PayloadAttribute>,
}

impl PayloadPath {
    pub fn new(path: Vec<PayloadEntry>) -> Self {
        Self {
            path,
            attributes: Vec::new(),
        }
    }

    /// Values of every `exemplar_trace_id` attribute, in order.
    pub fn exemplar_trace_ids(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|attr| attr.key == EXEMPLAR_TRACE_ID_KEY)
            .map(|attr| attr.value.as_str())
    }
}

/// The wrapped payload: `{"dependencies": [{"path": [...], "attributes": [...]}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DdgPayload {
    pub dependencies: Vec<PayloadPath>,
}

/// Both accepted JSON shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Wrapped(DdgPayload),
    Bare(Vec<Vec<PayloadEntry>>),
}

impl DdgPayload {
    /// Wrap bare paths, without attributes.
    pub fn from_paths(paths: Vec<Vec<PayloadEntry>>) -> Self {
        Self {
            dependencies: paths.into_iter().map(PayloadPath::new).collect(),
        }
    }

    /// Parse either the wrapped or the bare `[[{service, operation}]]` shape.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let raw: RawPayload =
            serde_json::from_str(json).map_err(|e| TransformError::InvalidPayload {
                message: e.to_string(),
            })?;
        Ok(match raw {
            RawPayload::Wrapped(payload) => payload,
            RawPayload::Bare(paths) => Self::from_paths(paths),
        })
    }

    pub fn to_json(&self) -> Result<String, TransformError> {
        serde_json::to_string(self).map_err(|e| TransformError::InvalidPayload {
            message: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_shape() {
        let payload = DdgPayload::from_json(
            r#"[[{"service":"a","operation":"x"},{"service":"b","operation":"y"}]]"#,
        )
        .unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.dependencies[0].path[1], PayloadEntry::new("b", "y"));
        assert!(payload.dependencies[0].attributes.is_empty());
    }

    #[test]
    fn parses_wrapped_shape_with_trace_ids() {
        let payload = DdgPayload::from_json(
            r#"{"dependencies":[{"path":[{"service":"a","operation":"x"}],
                "attributes":[{"key":"exemplar_trace_id","value":"t1"},
                              {"key":"other","value":"v"},
                              {"key":"exemplar_trace_id","value":"t2"}]}]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = payload.dependencies[0].exemplar_trace_ids().collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn rejects_garbage() {
        let err = DdgPayload::from_json(r#"{"paths": 3}"#).unwrap_err();
        assert!(matches!(err, TransformError::InvalidPayload { .. }));
    }
}
