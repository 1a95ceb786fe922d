//! The model registry: every named solid alive in the session.
//!
//! Entries are held behind `Arc`, so snapshotting a registry is a cheap
//! structural copy. The composition engine works on such a copy and only
//! the caller decides whether the result replaces the previous state,
//! which is what makes turns atomic.

use crate::model::{Model, ModelSummary};
use chatcad_ops::ModelId;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from identifier to immutable model.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<ModelId, Arc<Model>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// True if `id` names a live model.
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Look up a model by identifier.
    pub fn get(&self, id: &str) -> Option<&Arc<Model>> {
        self.models.get(id)
    }

    /// Insert or replace a model under its own identifier.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.id.clone(), Arc::new(model));
    }

    /// Remove a model, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Arc<Model>> {
        self.models.remove(id)
    }

    /// All live identifiers, sorted for stable output.
    pub fn ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self.models.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Summaries of every live model, sorted by identifier. This is the
    /// geometric feedback handed to the reasoning collaborator each turn.
    pub fn summaries(&self) -> Vec<ModelSummary> {
        let mut out: Vec<ModelSummary> = self.models.values().map(|m| m.summary()).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Iterate over all models.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Model>> {
        self.models.values()
    }
}
