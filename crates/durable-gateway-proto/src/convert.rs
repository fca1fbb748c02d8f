//! Converters between proto types and domain types.

use crate::pb;
use durable_gateway_core::{InstanceDescriptor, InstanceId};

impl From<InstanceDescriptor> for pb::NewDurableTaskResponse {
    fn from(descriptor: InstanceDescriptor) -> Self {
        pb::NewDurableTaskResponse {
            id: descriptor.id.into_inner(),
            status_query_get_uri: descriptor.status_query_uri,
            send_event_post_uri: descriptor.send_event_uri,
            terminate_post_uri: descriptor.terminate_uri,
            rewind_post_uri: descriptor.rewind_uri,
            purge_history_delete_uri: descriptor.purge_history_uri,
        }
    }
}

impl From<pb::NewDurableTaskResponse> for InstanceDescriptor {
    fn from(proto: pb::NewDurableTaskResponse) -> Self {
        InstanceDescriptor {
            id: InstanceId::new(proto.id),
            status_query_uri: proto.status_query_get_uri,
            send_event_uri: proto.send_event_post_uri,
            terminate_uri: proto.terminate_post_uri,
            rewind_uri: proto.rewind_post_uri,
            purge_history_uri: proto.purge_history_delete_uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use durable_gateway_core::BaseUriSet;

    #[test]
    fn test_descriptor_field_mapping() {
        let descriptor =
            InstanceDescriptor::build(&InstanceId::new("abc123"), &BaseUriSet::uniform("https://host"))
                .unwrap();

        let proto: pb::NewDurableTaskResponse = descriptor.clone().into();
        assert_eq!(proto.id, "abc123");
        assert_eq!(proto.status_query_get_uri, "https://host/Status/abc123");
        assert_eq!(proto.send_event_post_uri, "https://host/Event/abc123");
        assert_eq!(proto.terminate_post_uri, "https://host/terminate/abc123");
        assert_eq!(proto.rewind_post_uri, "https://host/Rewind/abc123");
        assert_eq!(proto.purge_history_delete_uri, "https://host/Delete/abc123");

        let back: InstanceDescriptor = proto.into();
        assert_eq!(back, descriptor);
    }
}
