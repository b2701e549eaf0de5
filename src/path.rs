//! Request path classification.
//!
//! Turns `(method, path, project id)` into a [`RequestIntent`]. This is a
//! pure function: no body inspection, no lookups.

use std::collections::HashSet;

use uuid::Uuid;

use crate::http::HttpMethod;

/// Path segment naming the servers collection.
pub const SERVERS: &str = "servers";

/// Path segment naming the virtual interface extension.
pub const VIRTUAL_INTERFACES: &str = "os-virtual-interfacesv2";

/// What an inbound request is trying to do, as far as network policy cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIntent {
    /// Not a request any network policy applies to
    Irrelevant,
    /// `POST /{project}/servers`
    ServerBoot {
        /// Tenant project the server is booted in
        project_id: String,
    },
    /// `POST /{project}/servers/{instance}/os-virtual-interfacesv2`
    NetworkAttach {
        /// Tenant project
        project_id: String,
        /// Instance receiving the new interface
        instance_id: String,
    },
    /// `DELETE /{project}/servers/{instance}/os-virtual-interfacesv2/{vif}`
    NetworkDetach {
        /// Tenant project
        project_id: String,
        /// Instance losing the interface
        instance_id: String,
        /// Interface being removed
        vif_id: String,
    },
}

/// Splits a path on `/`, dropping empty segments.
///
/// # Examples
///
/// ```
/// use network_attach_policy::split_path;
///
/// assert_eq!(split_path("//abc/servers/"), vec!["abc", "servers"]);
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Returns true when `value` parses as a UUID.
///
/// Hyphenated, simple (32 hex digits), braced and `urn:uuid:` forms are
/// accepted, in either case.
pub fn is_uuid_like(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Classifies a request path into a [`RequestIntent`].
///
/// Boot detection compares the segments as a set against
/// `{project_id, "servers"}`, so `/servers/{project}` is also a boot and
/// repeated segments collapse. Attach and detach are positional and
/// require UUID-like instance and VIF ids.
///
/// # Examples
///
/// ```
/// use network_attach_policy::{classify, HttpMethod, RequestIntent};
///
/// let intent = classify(
///     HttpMethod::Post,
///     "/p1/servers/12345678-1234-1234-1234-123456789012/os-virtual-interfacesv2",
///     "p1",
/// );
/// assert!(matches!(intent, RequestIntent::NetworkAttach { .. }));
///
/// assert_eq!(classify(HttpMethod::Get, "/p1/servers", "p1"), RequestIntent::Irrelevant);
/// ```
pub fn classify(method: HttpMethod, path: &str, project_id: &str) -> RequestIntent {
    let parts = split_path(path);

    match method {
        HttpMethod::Post => {
            if is_boot_path(&parts, project_id) {
                return RequestIntent::ServerBoot {
                    project_id: project_id.to_string(),
                };
            }
            match parts.as_slice() {
                [project, servers, instance, vifs]
                    if *project == project_id
                        && *servers == SERVERS
                        && *vifs == VIRTUAL_INTERFACES
                        && is_uuid_like(instance) =>
                {
                    RequestIntent::NetworkAttach {
                        project_id: project_id.to_string(),
                        instance_id: (*instance).to_string(),
                    }
                }
                _ => RequestIntent::Irrelevant,
            }
        }
        HttpMethod::Delete => match parts.as_slice() {
            [project, servers, instance, vifs, vif]
                if *project == project_id
                    && *servers == SERVERS
                    && *vifs == VIRTUAL_INTERFACES
                    && is_uuid_like(instance)
                    && is_uuid_like(vif) =>
            {
                RequestIntent::NetworkDetach {
                    project_id: project_id.to_string(),
                    instance_id: (*instance).to_string(),
                    vif_id: (*vif).to_string(),
                }
            }
            _ => RequestIntent::Irrelevant,
        },
        _ => RequestIntent::Irrelevant,
    }
}

// Set comparison: segment order and repeats are ignored, so
// `/servers/{project}` also counts as a boot path.
fn is_boot_path(parts: &[&str], project_id: &str) -> bool {
    let seen: HashSet<&str> = parts.iter().copied().collect();
    let expected: HashSet<&str> = [project_id, SERVERS].into_iter().collect();
    seen == expected
}
