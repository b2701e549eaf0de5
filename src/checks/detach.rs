use crate::error::{LookupError, Violation, ViolationKind};
use crate::logging::RequestLog;
use crate::lookup::InstanceLookup;
use crate::policy::{join_networks, NetworkSet};
use crate::request::TenantContext;

/// Prevents detaching an interface that sits on a required network.
///
/// Banned and count rules do not apply to detach.
#[derive(Debug)]
pub struct DetachNetworkCheck<'a, L> {
    required: &'a NetworkSet,
    lookup: &'a L,
}

impl<'a, L: InstanceLookup> DetachNetworkCheck<'a, L> {
    /// Creates a check protecting `required` networks.
    pub fn new(required: &'a NetworkSet, lookup: &'a L) -> Self {
        Self { required, lookup }
    }

    /// Evaluates removal of `vif_id` from `instance_id`.
    ///
    /// An interface id the instance does not have passes.
    ///
    /// # Errors
    ///
    /// Propagates the lookup error if the instance cannot be read.
    pub fn check_detach(
        &self,
        context: &TenantContext,
        instance_id: &str,
        vif_id: &str,
        log: &RequestLog<'_>,
    ) -> Result<Option<Violation>, LookupError> {
        let vifs = self.lookup.virtual_interfaces(context, instance_id)?;

        let Some(vif) = vifs.iter().find(|vif| vif.id == vif_id) else {
            log.debug(format_args!(
                "vif {} not on instance {}",
                vif_id, instance_id
            ));
            return Ok(None);
        };

        if !self.required.contains(&vif.network_id) {
            return Ok(None);
        }

        log.info(format_args!(
            "attempt to detach required network {} from instance {}",
            vif.network_id, instance_id
        ));
        Ok(Some(Violation::new(
            ViolationKind::RequiredDetach,
            format!(
                "Network ({}) cannot be detached",
                join_networks(self.required)
            ),
        )))
    }
}
