use crate::body::attaching_network;
use crate::config::PolicyConfig;
use crate::error::{LookupError, Violation};
use crate::logging::RequestLog;
use crate::lookup::InstanceLookup;
use crate::policy::{check_banned, check_count, CountLimits, NetworkSet};
use crate::request::TenantContext;

/// Verifies the network named by an attach request.
///
/// Required networks are not checked here; they only matter at boot. The
/// count has no lower bound because interfaces are attached one at a
/// time, so an instance under the minimum must be allowed to grow.
#[derive(Debug)]
pub struct AttachNetworkCountCheck<'a, L> {
    config: &'a PolicyConfig,
    lookup: &'a L,
}

impl<'a, L: InstanceLookup> AttachNetworkCountCheck<'a, L> {
    /// Creates a check over `config` using `lookup` for existing networks.
    pub fn new(config: &'a PolicyConfig, lookup: &'a L) -> Self {
        Self { config, lookup }
    }

    /// Evaluates an attach of the network in `body` to `instance_id`.
    ///
    /// A body without a readable `virtual_interface.network_id` passes
    /// without a lookup.
    ///
    /// # Errors
    ///
    /// Propagates the lookup error if the instance cannot be read.
    pub fn check_networks(
        &self,
        context: &TenantContext,
        body: &[u8],
        instance_id: &str,
        log: &RequestLog<'_>,
    ) -> Result<Option<Violation>, LookupError> {
        let Some(network) = attaching_network(body) else {
            log.debug(format_args!(
                "no network_id in attach body for instance {}",
                instance_id
            ));
            return Ok(None);
        };

        let requested: NetworkSet = [network].into_iter().collect();
        let existing = self.lookup.attached_networks(context, instance_id)?;

        Ok(self.evaluate(&requested, &existing).err())
    }

    fn evaluate(&self, requested: &NetworkSet, existing: &NetworkSet) -> Result<(), Violation> {
        let cfg = self.config;
        check_banned(requested, &cfg.banned_networks)?;
        check_count(
            requested,
            CountLimits::at_most(cfg.networks_max),
            Some(existing),
            &cfg.optional_networks,
            cfg.count_optional_nets,
        )
    }
}
