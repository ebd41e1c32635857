//! Where connectivity comes from.

use crate::error::{Error, Result};
use crate::ingest::ConnectivityResponse;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Deserialize;
use std::future::Future;

/// Async `fetchConnectivity(entityId)`.
///
/// No executor is assumed; the returned future is polled by whatever drives the view.
pub trait ConnectivitySource {
    fn fetch(&self, entity_id: &str) -> impl Future<Output = Result<ConnectivityResponse>>;
}

/// An in-memory catalog of connectivity responses keyed by entity id.
///
/// Deserializes from `{"entities": {"<id>": <response>, ...}}`; entry order is preserved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticConnectivity {
    entities: IndexMap<String, ConnectivityResponse, FxBuildHasher>,
}

impl StaticConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, response: ConnectivityResponse) {
        self.entities.insert(entity_id.into(), response);
    }

    pub fn get(&self, entity_id: &str) -> Result<&ConnectivityResponse> {
        self.entities.get(entity_id).ok_or_else(|| Error::UnknownEntity {
            id: entity_id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}

impl ConnectivitySource for StaticConnectivity {
    fn fetch(&self, entity_id: &str) -> impl Future<Output = Result<ConnectivityResponse>> {
        std::future::ready(self.get(entity_id).cloned())
    }
}
