use crate::checks::DetachNetworkCheck;
use crate::config::{FilterConf, FilterSettings};
use crate::error::{ConfigError, Error};
use crate::http::HttpMethod;
use crate::logging::FilterLog;
use crate::lookup::InstanceLookup;
use crate::path::{classify, RequestIntent};
use crate::policy::NetworkSet;
use crate::request::{ContextResolver, EnvironmentContext, RequestAdapter};

use super::{decide, is_enabled, Filter, FilterDecision};

/// Keeps required networks from being detached from running instances.
///
/// Only `DELETE` requests are inspected. Configuration keys:
/// `required_nets`, `enabled`, `runtime_overrides`, `log_name`.
#[derive(Debug)]
pub struct DetachNetworkFilter<L, C = EnvironmentContext> {
    settings: FilterSettings,
    required: NetworkSet,
    lookup: L,
    resolver: C,
    log: FilterLog,
}

impl<L: InstanceLookup> DetachNetworkFilter<L> {
    /// Builds the filter, reading tenant context from the request environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable configuration values.
    pub fn new(conf: &FilterConf, lookup: L) -> Result<Self, ConfigError> {
        Self::with_resolver(conf, lookup, EnvironmentContext)
    }
}

impl<L: InstanceLookup, C: ContextResolver> DetachNetworkFilter<L, C> {
    /// Filter name used for the override header.
    pub const NAME: &'static str = "detach-network-check";

    /// Builds the filter with an explicit tenant context resolver.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable configuration values.
    pub fn with_resolver(conf: &FilterConf, lookup: L, resolver: C) -> Result<Self, ConfigError> {
        let settings = FilterSettings::from_conf(conf, "detach_network_check")?;
        let log = FilterLog::new(settings.log_name.clone());
        log.info(format_args!("Starting detach network check middleware"));

        Ok(Self {
            settings,
            required: conf.networks("required_nets"),
            lookup,
            resolver,
            log,
        })
    }

    /// Returns the networks that may not be detached.
    pub fn required_networks(&self) -> &NetworkSet {
        &self.required
    }
}

impl<L: InstanceLookup, C: ContextResolver> Filter for DetachNetworkFilter<L, C> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn call(&self, request: &RequestAdapter) -> Result<FilterDecision, Error> {
        let log = self.log.for_request(request.request_id());

        if !is_enabled(&self.settings, Self::NAME, request) {
            log.debug(format_args!("filter disabled"));
            return Ok(FilterDecision::Passthrough);
        }
        if request.method() != Some(HttpMethod::Delete) {
            return Ok(FilterDecision::Passthrough);
        }
        let Some(context) = self.resolver.resolve(request) else {
            log.debug(format_args!("no tenant context, passing through"));
            return Ok(FilterDecision::Passthrough);
        };

        let RequestIntent::NetworkDetach {
            instance_id,
            vif_id,
            ..
        } = classify(HttpMethod::Delete, request.path(), &context.project_id)
        else {
            return Ok(FilterDecision::Passthrough);
        };

        let violation = DetachNetworkCheck::new(&self.required, &self.lookup).check_detach(
            &context,
            &instance_id,
            &vif_id,
            &log,
        )?;
        Ok(decide(violation, &log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InMemoryInstances, VirtualInterface};
    use crate::request::TenantContext;

    const PROJECT: &str = "123456";
    const SERVER: &str = "12345678-1234-1234-1234-123456789012";
    const VIF: &str = "12345678-1234-1234-1234-123456789012";
    const REQUIRED_NET: &str = "12345678-1234-1234-1234-123456789012";

    fn filter(table: InMemoryInstances) -> DetachNetworkFilter<InMemoryInstances> {
        let conf = FilterConf::from_pairs([("required_nets", REQUIRED_NET)]);
        DetachNetworkFilter::new(&conf, table).unwrap()
    }

    fn table() -> InMemoryInstances {
        let mut table = InMemoryInstances::new();
        table.insert(PROJECT, SERVER, vec![VirtualInterface::new(VIF, REQUIRED_NET)]);
        table
    }

    fn delete(path: &str) -> RequestAdapter {
        let mut req = RequestAdapter::new("DELETE", path);
        req.set_context(Some(TenantContext::new(PROJECT)));
        req
    }

    fn good_url() -> String {
        format!("/{}/servers/{}/os-virtual-interfacesv2/{}", PROJECT, SERVER, VIF)
    }

    #[test]
    fn reads_required_networks() {
        let f = filter(table());
        assert!(f.required_networks().contains(REQUIRED_NET));
    }

    #[test]
    fn only_delete_is_inspected() {
        let f = filter(table());
        for method in ["POST", "PUT", "GET"] {
            let mut req = RequestAdapter::new(method, good_url());
            req.set_context(Some(TenantContext::new(PROJECT)));
            assert!(f.call(&req).unwrap().is_passthrough());
        }
        assert_eq!(f.lookup.lookups(), 0);
        assert!(!f.call(&delete(&good_url())).unwrap().is_passthrough());
        assert_eq!(f.lookup.lookups(), 1);
    }

    #[test]
    fn unrelated_path_skips_lookup() {
        let f = filter(table());
        assert!(f.call(&delete("/something")).unwrap().is_passthrough());
        assert_eq!(f.lookup.lookups(), 0);
    }

    #[test]
    fn required_network_detach_is_forbidden() {
        let f = filter(table());
        let decision = f.call(&delete(&good_url())).unwrap();
        let rejection = decision.rejection().unwrap();
        assert_eq!(rejection.status(), 403);
        assert!(rejection.body().contains("cannot be detached"));
    }

    #[test]
    fn non_uuid_vif_is_irrelevant() {
        let f = filter(table());
        let url = format!("/{}/servers/{}/os-virtual-interfacesv2/derp", PROJECT, SERVER);
        assert!(f.call(&delete(&url)).unwrap().is_passthrough());
    }

    #[test]
    fn missing_instance_is_an_error() {
        let f = filter(InMemoryInstances::new());
        let err = f.call(&delete(&good_url())).unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }
}
