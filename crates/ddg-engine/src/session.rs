//! Per-query sessions.
//!
//! A session owns everything derived for one query: the immutable model, the
//! frozen graph answering arbitrary keys, and the incremental manager that
//! tracks the key the host is currently showing. Sessions are never shared
//! between queries.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use ddg_core::errors::DdgError;
use ddg_core::types::collections::FxHashMap;
use ddg_core::DdgConfig;

use crate::graph::{DdgEvManager, DensityStrategy, GraphModel, VertexKeyStrategy, VisibleGraph};
use crate::model::{DdgModel, DdgPayload};
use crate::query::DdgQuery;
use crate::transform::{transform_ddg_data, transform_traces_to_paths, Trace};

pub struct DdgSession {
    query: DdgQuery,
    model: Arc<DdgModel>,
    graph: GraphModel,
    strategy: Arc<dyn VertexKeyStrategy>,
    manager: DdgEvManager,
}

impl DdgSession {
    pub fn new(query: DdgQuery, payload: &DdgPayload, config: &DdgConfig) -> Result<Self, DdgError> {
        let model = Arc::new(transform_ddg_data(payload, &query.focal_selector())?);
        let strategy = config
            .graph
            .effective_density()
            .strategy(config.graph.effective_show_operations());
        let graph = GraphModel::new(Arc::clone(&model), Arc::clone(&strategy), config)?;
        let manager = DdgEvManager::new(Arc::clone(&model), Arc::clone(&strategy));
        Ok(Self {
            query,
            model,
            graph,
            strategy,
            manager,
        })
    }

    /// Build from raw traces instead of a precomputed payload.
    pub fn from_traces(query: DdgQuery, traces: &[Trace], config: &DdgConfig) -> Result<Self, DdgError> {
        let payload = transform_traces_to_paths(traces, &query.service, query.operation.as_deref())?;
        Self::new(query, &payload, config)
    }

    pub fn query(&self) -> &DdgQuery {
        &self.query
    }

    pub fn model(&self) -> &Arc<DdgModel> {
        &self.model
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn manager(&self) -> &DdgEvManager {
        &self.manager
    }

    /// The view for the query's current key, or the default view without one.
    pub fn visible(&self) -> Result<Arc<VisibleGraph>, DdgError> {
        Ok(self.graph.get_visible(self.query.visibility_key.as_deref())?)
    }

    /// Move the incremental view to `visibility_key` and remember it as the
    /// query's current key.
    ///
    /// A rejected key leaves the manager half applied, so it is replaced by a
    /// fresh one and the next update starts from the empty view.
    pub fn update(&mut self, visibility_key: &str) -> Result<VisibleGraph, DdgError> {
        match self.manager.get_edges_and_vertices(visibility_key) {
            Ok(visible) => {
                self.query.visibility_key = Some(visibility_key.to_string());
                Ok(visible)
            }
            Err(err) => {
                tracing::warn!(key = visibility_key, "discarding manager after rejected key");
                self.manager = DdgEvManager::new(Arc::clone(&self.model), Arc::clone(&self.strategy));
                Err(err.into())
            }
        }
    }
}

/// One session per query cache key.
pub struct SessionRegistry {
    config: DdgConfig,
    sessions: FxHashMap<String, DdgSession>,
}

impl SessionRegistry {
    pub fn new(config: DdgConfig) -> Self {
        Self {
            config,
            sessions: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &DdgConfig {
        &self.config
    }

    /// The session for `query`, loading its payload only on first use.
    pub fn get_or_create<F>(&mut self, query: &DdgQuery, load: F) -> Result<&mut DdgSession, DdgError>
    where
        F: FnOnce() -> Result<DdgPayload, DdgError>,
    {
        match self.sessions.entry(query.cache_key()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let payload = load()?;
                let session = DdgSession::new(query.clone(), &payload, &self.config)?;
                tracing::debug!(query = ?entry.key(), "session created");
                Ok(entry.insert(session))
            }
        }
    }

    pub fn get(&self, query: &DdgQuery) -> Option<&DdgSession> {
        self.sessions.get(&query.cache_key())
    }

    pub fn get_mut(&mut self, query: &DdgQuery) -> Option<&mut DdgSession> {
        self.sessions.get_mut(&query.cache_key())
    }

    pub fn remove(&mut self, query: &DdgQuery) -> Option<DdgSession> {
        self.sessions.remove(&query.cache_key())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
