//! Management URIs for an orchestration instance.

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::ids::InstanceId;

/// Base URIs the management endpoints are synthesized from.
///
/// Each endpoint kind carries its own base so the scheme (and host) of every
/// URI is a deployment decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUriSet {
    pub status_query: String,
    pub send_event: String,
    pub terminate: String,
    pub rewind: String,
    pub purge_history: String,
}

impl BaseUriSet {
    /// Use the same base for every endpoint.
    pub fn uniform(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            status_query: base.clone(),
            send_event: base.clone(),
            terminate: base.clone(),
            rewind: base.clone(),
            purge_history: base,
        }
    }

    /// Iterate over `(endpoint name, base)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("status_query", self.status_query.as_str()),
            ("send_event", self.send_event.as_str()),
            ("terminate", self.terminate.as_str()),
            ("rewind", self.rewind.as_str()),
            ("purge_history", self.purge_history.as_str()),
        ]
        .into_iter()
    }
}

/// The canonical id of a started instance plus its five management URIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub id: InstanceId,
    pub status_query_uri: String,
    pub send_event_uri: String,
    pub terminate_uri: String,
    pub rewind_uri: String,
    pub purge_history_uri: String,
}

impl InstanceDescriptor {
    /// Build the descriptor for `id` by template substitution on `bases`.
    ///
    /// Fails only when the id is empty.
    pub fn build(id: &InstanceId, bases: &BaseUriSet) -> Result<Self, GatewayError> {
        if id.is_empty() {
            return Err(GatewayError::InvalidArgument(
                "instance id cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: id.clone(),
            status_query_uri: endpoint(&bases.status_query, "Status", id),
            send_event_uri: endpoint(&bases.send_event, "Event", id),
            terminate_uri: endpoint(&bases.terminate, "terminate", id),
            rewind_uri: endpoint(&bases.rewind, "Rewind", id),
            purge_history_uri: endpoint(&bases.purge_history, "Delete", id),
        })
    }
}

fn endpoint(base: &str, segment: &str, id: &InstanceId) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), segment, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_uniform_base() {
        let descriptor =
            InstanceDescriptor::build(&InstanceId::new("abc123"), &BaseUriSet::uniform("https://host"))
                .unwrap();

        assert_eq!(descriptor.id.as_str(), "abc123");
        assert_eq!(descriptor.status_query_uri, "https://host/Status/abc123");
        assert_eq!(descriptor.send_event_uri, "https://host/Event/abc123");
        assert_eq!(descriptor.terminate_uri, "https://host/terminate/abc123");
        assert_eq!(descriptor.rewind_uri, "https://host/Rewind/abc123");
        assert_eq!(descriptor.purge_history_uri, "https://host/Delete/abc123");
    }

    #[test]
    fn test_build_is_deterministic() {
        let id = InstanceId::new("7f3c");
        let bases = BaseUriSet::uniform("https://gateway.example/api");

        let first = InstanceDescriptor::build(&id, &bases).unwrap();
        let second = InstanceDescriptor::build(&id, &bases).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let id = InstanceId::new("abc123");
        let with_slash = InstanceDescriptor::build(&id, &BaseUriSet::uniform("https://host/")).unwrap();
        let without = InstanceDescriptor::build(&id, &BaseUriSet::uniform("https://host")).unwrap();
        assert_eq!(with_slash, without);
    }

    #[test]
    fn test_scheme_per_endpoint() {
        let bases = BaseUriSet {
            status_query: "https://public.example".to_string(),
            send_event: "https://public.example".to_string(),
            terminate: "http://internal:8080".to_string(),
            rewind: "http://internal:8080".to_string(),
            purge_history: "http://internal:8080/admin".to_string(),
        };

        let descriptor = InstanceDescriptor::build(&InstanceId::new("i-1"), &bases).unwrap();
        assert_eq!(descriptor.status_query_uri, "https://public.example/Status/i-1");
        assert_eq!(descriptor.terminate_uri, "http://internal:8080/terminate/i-1");
        assert_eq!(descriptor.purge_history_uri, "http://internal:8080/admin/Delete/i-1");
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = InstanceDescriptor::build(&InstanceId::new(""), &BaseUriSet::uniform("https://host"));
        assert!(matches!(result, Err(GatewayError::InvalidArgument(_))));
    }
}
