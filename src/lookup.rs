//! Instance network lookup collaborator.
//!
//! The compute control plane is reached only through [`InstanceLookup`].
//! Results are never cached: every attach and detach re-reads the
//! instance's current interfaces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::LookupError;
use crate::policy::{NetworkId, NetworkSet};
use crate::request::TenantContext;

/// A fixed IP address bound to a virtual interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIp {
    /// The IP address
    pub address: String,
    /// Network the address belongs to
    pub network_id: NetworkId,
}

/// A virtual network interface attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualInterface {
    /// Interface id, as used in detach paths
    pub id: String,
    /// MAC address
    pub mac_address: String,
    /// Network the interface is plugged into
    pub network_id: NetworkId,
    /// Human-readable network label
    pub network_label: String,
    /// Fixed IPs on the interface
    pub fixed_ips: Vec<FixedIp>,
}

impl VirtualInterface {
    /// Creates an interface with no fixed IPs.
    pub fn new(id: impl Into<String>, network_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mac_address: String::new(),
            network_id: network_id.into(),
            network_label: String::new(),
            fixed_ips: Vec::new(),
        }
    }

    /// Sets the MAC address.
    pub fn with_mac(mut self, mac_address: impl Into<String>) -> Self {
        self.mac_address = mac_address.into();
        self
    }

    /// Sets the human-readable network label.
    pub fn with_network_label(mut self, label: impl Into<String>) -> Self {
        self.network_label = label.into();
        self
    }

    /// Adds a fixed IP on this interface's network.
    pub fn with_fixed_ip(mut self, address: impl Into<String>) -> Self {
        self.fixed_ips.push(FixedIp {
            address: address.into(),
            network_id: self.network_id.clone(),
        });
        self
    }
}

/// Reads an instance's current network attachments.
///
/// Implementations talk to the compute API; failures propagate to the
/// filter caller unchanged.
pub trait InstanceLookup {
    /// Returns the instance's virtual interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InstanceNotFound`] when the tenant cannot see
    /// the instance, or [`LookupError::Backend`] for other failures.
    fn virtual_interfaces(
        &self,
        context: &TenantContext,
        instance_id: &str,
    ) -> Result<Vec<VirtualInterface>, LookupError>;

    /// Returns the set of networks the instance is attached to.
    fn attached_networks(
        &self,
        context: &TenantContext,
        instance_id: &str,
    ) -> Result<NetworkSet, LookupError> {
        Ok(self
            .virtual_interfaces(context, instance_id)?
            .into_iter()
            .map(|vif| vif.network_id)
            .collect())
    }
}

impl<L: InstanceLookup + ?Sized> InstanceLookup for &L {
    fn virtual_interfaces(
        &self,
        context: &TenantContext,
        instance_id: &str,
    ) -> Result<Vec<VirtualInterface>, LookupError> {
        (**self).virtual_interfaces(context, instance_id)
    }
}

/// Map-backed [`InstanceLookup`] keyed by `(project_id, instance_id)`.
///
/// Useful for embedding tests. Counts calls so callers can assert whether
/// a lookup happened.
///
/// # Examples
///
/// ```
/// use network_attach_policy::{InMemoryInstances, InstanceLookup, TenantContext, VirtualInterface};
///
/// let mut instances = InMemoryInstances::new();
/// instances.insert("p1", "vm-1", vec![VirtualInterface::new("vif-1", "net-a")]);
///
/// let ctx = TenantContext::new("p1");
/// let nets = instances.attached_networks(&ctx, "vm-1").unwrap();
/// assert!(nets.contains("net-a"));
/// assert_eq!(instances.lookups(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryInstances {
    instances: HashMap<(String, String), Vec<VirtualInterface>>,
    lookups: AtomicUsize,
}

impl InMemoryInstances {
    /// Creates an empty instance table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance and its interfaces under a project.
    pub fn insert(
        &mut self,
        project_id: impl Into<String>,
        instance_id: impl Into<String>,
        vifs: Vec<VirtualInterface>,
    ) {
        self.instances
            .insert((project_id.into(), instance_id.into()), vifs);
    }

    /// Returns how many lookups have been served.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl InstanceLookup for InMemoryInstances {
    fn virtual_interfaces(
        &self,
        context: &TenantContext,
        instance_id: &str,
    ) -> Result<Vec<VirtualInterface>, LookupError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.instances
            .get(&(context.project_id.clone(), instance_id.to_string()))
            .cloned()
            .ok_or_else(|| LookupError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_instance_is_not_found() {
        let instances = InMemoryInstances::new();
        let err = instances
            .virtual_interfaces(&TenantContext::new("p"), "missing")
            .unwrap_err();
        assert_eq!(
            err,
            LookupError::InstanceNotFound {
                instance_id: "missing".to_string()
            }
        );
        assert_eq!(instances.lookups(), 1);
    }

    #[test]
    fn instances_are_scoped_by_project() {
        let mut instances = InMemoryInstances::new();
        instances.insert("p1", "vm", vec![VirtualInterface::new("v", "n")]);
        assert!(instances
            .virtual_interfaces(&TenantContext::new("p2"), "vm")
            .is_err());
    }

    #[test]
    fn attached_networks_deduplicates() {
        let mut instances = InMemoryInstances::new();
        instances.insert(
            "p",
            "vm",
            vec![
                VirtualInterface::new("v1", "n1").with_fixed_ip("10.0.0.2"),
                VirtualInterface::new("v2", "n1").with_mac("aa:bb:cc:dd:ee:ff"),
                VirtualInterface::new("v3", "n2"),
            ],
        );
        let nets = instances
            .attached_networks(&TenantContext::new("p"), "vm")
            .unwrap();
        assert_eq!(nets.len(), 2);
    }

    #[test]
    fn interface_builders_fill_descriptive_fields() {
        let vif = VirtualInterface::new("v", "net-x")
            .with_mac("aa:bb:cc:dd:ee:ff")
            .with_network_label("public");
        assert_eq!(vif.network_label, "public");
        assert_eq!(vif.mac_address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(VirtualInterface::new("v", "n").network_label, "");
    }

    #[test]
    fn fixed_ip_inherits_interface_network() {
        let vif = VirtualInterface::new("v", "net-x").with_fixed_ip("192.168.1.1");
        assert_eq!(vif.fixed_ips[0].network_id, "net-x");
        assert_eq!(vif.fixed_ips[0].address, "192.168.1.1");
    }
}
