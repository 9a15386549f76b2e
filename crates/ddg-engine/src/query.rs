//! Query parameters identifying one dependency graph.

use serde::{Deserialize, Serialize};

use crate::model::FocalSelector;

/// The raw query shape read from the host. Parsing the host's URL or query
/// string into this struct is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdgQuery {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub start: u64,
    pub end: u64,
    #[serde(default, alias = "visEncoding", skip_serializing_if = "Option::is_none")]
    pub visibility_key: Option<String>,
}

impl DdgQuery {
    pub fn new(service: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            service: service.into(),
            operation: None,
            start,
            end,
            visibility_key: None,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_visibility_key(mut self, key: impl Into<String>) -> Self {
        self.visibility_key = Some(key.into());
        self
    }

    pub fn focal_selector(&self) -> FocalSelector {
        FocalSelector {
            service: self.service.clone(),
            operation: self.operation.clone(),
        }
    }

    /// `service\n(operation or *)\nstart\nend`. The visibility key is not
    /// part of it: every key of one query shares one model.
    pub fn cache_key(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.service,
            self.operation.as_deref().unwrap_or("*"),
            self.start,
            self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_uses_star_for_any_operation() {
        let query = DdgQuery::new("svc", 10, 20);
        assert_eq!(query.cache_key(), "svc\n*\n10\n20");
        assert_eq!(query.with_operation("op").cache_key(), "svc\nop\n10\n20");
    }

    #[test]
    fn cache_key_ignores_visibility_key() {
        let a = DdgQuery::new("svc", 1, 2);
        let b = a.clone().with_visibility_key("3,1s");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn accepts_vis_encoding_alias() {
        let query: DdgQuery = serde_json::from_str(
            r#"{"service":"svc","start":1,"end":2,"visEncoding":"7"}"#,
        )
        .unwrap();
        assert_eq!(query.visibility_key.as_deref(), Some("7"));
        assert_eq!(query.operation, None);
    }
}
