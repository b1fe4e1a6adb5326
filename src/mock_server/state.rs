//! Mock server state management.
//!
//! Provides the in-memory data store for the mock OpenProject server.
//! Resources are kept as raw HAL+JSON objects, exactly as they are served.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::hal::Hal;

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Resources by collection name (`projects`, `work_packages`, ...) and id.
    pub resources: HashMap<String, BTreeMap<u64, Value>>,

    /// Work package ids returned by each stored query.
    pub query_results: HashMap<u64, Vec<u64>>,

    /// Optional API key. If set, requests must authenticate with it.
    pub required_api_key: Option<String>,
}

/// Id of the resource a named link points to.
fn linked_id(resource: &Value, name: &str) -> Option<u64> {
    Hal::new(resource).link(name).and_then(|link| link.id())
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a resource to a collection. Resources without a numeric id are ignored.
    pub fn insert(&mut self, collection: &str, resource: Value) {
        if let Some(id) = resource.get("id").and_then(Value::as_u64) {
            self.resources
                .entry(collection.to_string())
                .or_default()
                .insert(id, resource);
        }
    }

    /// Add a resource to a collection.
    pub fn with_resource(mut self, collection: &str, resource: Value) -> Self {
        self.insert(collection, resource);
        self
    }

    /// Set the work packages a stored query returns.
    pub fn with_query_results(mut self, query_id: u64, work_package_ids: Vec<u64>) -> Self {
        self.query_results.insert(query_id, work_package_ids);
        self
    }

    /// Set the required API key.
    pub fn with_required_api_key(mut self, api_key: &str) -> Self {
        self.required_api_key = Some(api_key.to_string());
        self
    }

    /// Get a resource by collection and id.
    pub fn get(&self, collection: &str, id: u64) -> Option<&Value> {
        self.resources.get(collection)?.get(&id)
    }

    /// All resources of a collection, ordered by id.
    pub fn list(&self, collection: &str) -> Vec<&Value> {
        self.resources
            .get(collection)
            .map(|resources| resources.values().collect())
            .unwrap_or_default()
    }

    /// Work packages belonging to a project.
    pub fn work_packages_for_project(&self, project_id: u64) -> Vec<&Value> {
        self.list("work_packages")
            .into_iter()
            .filter(|wp| linked_id(wp, "project") == Some(project_id))
            .collect()
    }

    /// Relations with `work_package_id` at either end.
    pub fn relations_for(&self, work_package_id: u64) -> Vec<&Value> {
        self.list("relations")
            .into_iter()
            .filter(|relation| {
                linked_id(relation, "from") == Some(work_package_id)
                    || linked_id(relation, "to") == Some(work_package_id)
            })
            .collect()
    }

    /// Work packages returned by a stored query, in query order.
    pub fn query_work_packages(&self, query_id: u64) -> Vec<&Value> {
        self.query_results
            .get(&query_id)
            .map(|ids| ids.iter().filter_map(|id| self.get("work_packages", *id)).collect())
            .unwrap_or_default()
    }

    /// Whether the status a work package links to is a closed one.
    pub fn is_closed(&self, work_package: &Value) -> bool {
        linked_id(work_package, "status")
            .and_then(|status_id| self.get("statuses", status_id))
            .and_then(|status| status.get("isClosed"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The status id a work package links to.
    pub fn status_id(&self, work_package: &Value) -> Option<u64> {
        linked_id(work_package, "status")
    }
}
