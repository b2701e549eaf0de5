//! JSON request body extraction.
//!
//! Bodies are parsed with `serde_json` into narrow shapes that only name
//! the fields the checks read. Anything else in the body is ignored, and
//! a body that fails to parse yields "nothing to check" rather than an
//! error.

use serde::Deserialize;

use crate::policy::{NetworkId, NetworkSet};

#[derive(Debug, Deserialize)]
struct BootBody {
    server: ServerSpec,
}

#[derive(Debug, Deserialize)]
struct ServerSpec {
    #[serde(default)]
    networks: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct AttachBody {
    virtual_interface: Option<serde_json::Value>,
}

/// Networks named by a server boot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootNetworks {
    /// The body is empty, not JSON, or has no `server` object
    Unreadable,
    /// `server` has no `networks` key
    Unspecified,
    /// Ids from `server.networks[].uuid`
    Listed(NetworkSet),
}

/// Extracts the network ids from a boot body.
///
/// Entries without a string `uuid` are dropped.
///
/// # Examples
///
/// ```
/// use network_attach_policy::body::{boot_networks, BootNetworks};
///
/// let body = br#"{"server": {"networks": [{"uuid": "a"}, {"port": "p"}]}}"#;
/// match boot_networks(body) {
///     BootNetworks::Listed(nets) => assert_eq!(nets.len(), 1),
///     other => panic!("unexpected {:?}", other),
/// }
/// assert_eq!(boot_networks(br#"{"server": {}}"#), BootNetworks::Unspecified);
/// assert_eq!(boot_networks(b"not json"), BootNetworks::Unreadable);
/// ```
pub fn boot_networks(body: &[u8]) -> BootNetworks {
    let parsed: BootBody = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(_) => return BootNetworks::Unreadable,
    };

    match parsed.server.networks {
        None => BootNetworks::Unspecified,
        Some(entries) => BootNetworks::Listed(
            entries
                .iter()
                .filter_map(|entry| entry.get("uuid").and_then(|v| v.as_str()))
                .map(str::to_string)
                .collect(),
        ),
    }
}

/// Extracts `virtual_interface.network_id` from an attach body.
///
/// Returns `None` when the body is empty, not JSON, or lacks a string
/// `network_id`.
pub fn attaching_network(body: &[u8]) -> Option<NetworkId> {
    if body.is_empty() {
        return None;
    }
    let parsed: AttachBody = serde_json::from_slice(body).ok()?;
    parsed
        .virtual_interface?
        .get("network_id")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(ids: &[&str]) -> BootNetworks {
        BootNetworks::Listed(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn boot_lists_uuid_entries() {
        let body = br#"{"server": {"name": "vm", "networks": [{"uuid": "a"}, {"uuid": "b"}, {"uuid": "a"}]}}"#;
        assert_eq!(boot_networks(body), listed(&["a", "b"]));
    }

    #[test]
    fn boot_empty_network_list_is_listed_empty() {
        assert_eq!(boot_networks(br#"{"server": {"networks": []}}"#), listed(&[]));
    }

    #[test]
    fn boot_null_networks_is_unspecified() {
        assert_eq!(
            boot_networks(br#"{"server": {"networks": null}}"#),
            BootNetworks::Unspecified
        );
    }

    #[test]
    fn boot_drops_entries_without_string_uuid() {
        let body = br#"{"server": {"networks": [{"port": "x"}, {"uuid": 7}, "junk", {"uuid": "c"}]}}"#;
        assert_eq!(boot_networks(body), listed(&["c"]));
    }

    #[test]
    fn boot_without_server_is_unreadable() {
        assert_eq!(boot_networks(br#"{"other": {}}"#), BootNetworks::Unreadable);
        assert_eq!(boot_networks(b""), BootNetworks::Unreadable);
        assert_eq!(boot_networks(b"{"), BootNetworks::Unreadable);
    }

    #[test]
    fn attach_reads_network_id() {
        let body = br#"{"virtual_interface": {"network_id": "net-1"}}"#;
        assert_eq!(attaching_network(body), Some("net-1".to_string()));
    }

    #[test]
    fn attach_tolerates_malformed_bodies() {
        assert_eq!(attaching_network(b""), None);
        assert_eq!(attaching_network(b"{{"), None);
        assert_eq!(attaching_network(br#"{"virtual_interface": {}}"#), None);
        assert_eq!(attaching_network(br#"{"virtual_interface": null}"#), None);
        assert_eq!(attaching_network(br#"{"something": {"network_id": "x"}}"#), None);
        assert_eq!(
            attaching_network(br#"{"virtual_interface": {"network_id": 5}}"#),
            None
        );
    }
}
