//! Network attachment policy filters for a compute API.
//!
//! This crate provides two request-validating filters that sit in front of
//! a compute service's network endpoints:
//! - **Network count check**: on server boot and interface attach, enforces
//!   required networks, banned networks and the number of isolated networks
//! - **Detach network check**: on interface detach, keeps required networks
//!   attached
//!
//! Every decision is made inside a single request. A violating request is
//! answered with `403 Forbidden` and a plaintext reason; everything else
//! passes to the wrapped service untouched.
//!
//! # Core Types
//!
//! - [`RequestAdapter`]: Framework-neutral view of the inbound request
//! - [`RequestIntent`]: What the request is doing, from [`classify`]
//! - [`PolicyConfig`]: Immutable policy built once from [`FilterConf`]
//! - [`InstanceLookup`]: Collaborator returning an instance's interfaces
//! - [`filter::Filter`]: The per-request entry point
//!
//! # Examples
//!
//! ```
//! use network_attach_policy::filter::{DetachNetworkFilter, Filter};
//! use network_attach_policy::{
//!     FilterConf, InMemoryInstances, RequestAdapter, TenantContext, VirtualInterface,
//! };
//!
//! let server = "12345678-1234-1234-1234-123456789012";
//! let vif = "87654321-4321-4321-4321-210987654321";
//!
//! let mut instances = InMemoryInstances::new();
//! instances.insert("p1", server, vec![VirtualInterface::new(vif, "public-net")]);
//!
//! let conf = FilterConf::from_pairs([("required_nets", "public-net")]);
//! let filter = DetachNetworkFilter::new(&conf, instances).expect("valid config");
//!
//! let path = format!("/p1/servers/{}/os-virtual-interfacesv2/{}", server, vif);
//! let mut req = RequestAdapter::new("DELETE", path);
//! req.set_context(Some(TenantContext::new("p1")));
//!
//! let decision = filter.call(&req).expect("lookup succeeds");
//! assert_eq!(
//!     decision.rejection().map(|r| r.body()),
//!     Some("Network (public-net) cannot be detached")
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod body;
pub mod checks;
mod config;
mod error;
pub mod filter;
mod http;
mod logging;
mod lookup;
mod path;
mod policy;
mod request;

pub use config::{parse_bool, FilterConf, FilterSettings, PolicyConfig};
pub use error::{ConfigError, Error, LookupError, Violation, ViolationKind};
pub use http::{HttpMethod, Rejection, FORBIDDEN};
pub use logging::{FilterLog, RequestLog};
pub use lookup::{FixedIp, InMemoryInstances, InstanceLookup, VirtualInterface};
pub use path::{classify, is_uuid_like, split_path, RequestIntent, SERVERS, VIRTUAL_INTERFACES};
pub use policy::{
    check_banned, check_count, check_required, join_networks, CountLimits, NetworkId, NetworkSet,
};
pub use request::{ContextResolver, EnvironmentContext, RequestAdapter, TenantContext};
