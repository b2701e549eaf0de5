use crate::checks::{AttachNetworkCountCheck, BootNetworkCountCheck};
use crate::config::{FilterConf, FilterSettings, PolicyConfig};
use crate::error::{ConfigError, Error};
use crate::http::HttpMethod;
use crate::logging::FilterLog;
use crate::lookup::InstanceLookup;
use crate::path::{classify, RequestIntent};
use crate::request::{ContextResolver, EnvironmentContext, RequestAdapter};

use super::{decide, is_enabled, Filter, FilterDecision};

/// Enforces required, banned and count policy on boot and attach requests.
///
/// Only `POST` requests are inspected.
///
/// # Examples
///
/// ```
/// use network_attach_policy::filter::{Filter, NetworkCountFilter};
/// use network_attach_policy::{FilterConf, InMemoryInstances, RequestAdapter, TenantContext};
///
/// let conf = FilterConf::from_pairs([("networks_min", "1"), ("networks_max", "1")]);
/// let filter = NetworkCountFilter::new(&conf, InMemoryInstances::new()).unwrap();
///
/// let mut req = RequestAdapter::new("POST", "/p1/servers");
/// req.set_context(Some(TenantContext::new("p1")));
/// req.set_body(r#"{"server": {"networks": []}}"#);
///
/// let decision = filter.call(&req).unwrap();
/// let rejection = decision.rejection().expect("no networks is below the minimum");
/// assert_eq!(rejection.status(), 403);
/// assert!(rejection.body().contains("be attached"));
/// ```
#[derive(Debug)]
pub struct NetworkCountFilter<L, C = EnvironmentContext> {
    settings: FilterSettings,
    policy: PolicyConfig,
    lookup: L,
    resolver: C,
    log: FilterLog,
}

impl<L: InstanceLookup> NetworkCountFilter<L> {
    /// Builds the filter, reading tenant context from the request environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable configuration values.
    pub fn new(conf: &FilterConf, lookup: L) -> Result<Self, ConfigError> {
        Self::with_resolver(conf, lookup, EnvironmentContext)
    }
}

impl<L: InstanceLookup, C: ContextResolver> NetworkCountFilter<L, C> {
    /// Filter name used for the override header.
    pub const NAME: &'static str = "network-count-check";

    /// Builds the filter with an explicit tenant context resolver.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable configuration values.
    pub fn with_resolver(conf: &FilterConf, lookup: L, resolver: C) -> Result<Self, ConfigError> {
        let settings = FilterSettings::from_conf(conf, "network_count_check")?;
        let policy = PolicyConfig::from_conf(conf)?;
        let log = FilterLog::new(settings.log_name.clone());

        log.info(format_args!("Starting network count check middleware"));
        if !policy.limits_consistent() {
            log.warn(format_args!(
                "networks_min ({}) exceeds networks_max ({}); every counted request will be rejected",
                policy.networks_min, policy.networks_max
            ));
        }

        Ok(Self {
            settings,
            policy,
            lookup,
            resolver,
            log,
        })
    }

    /// Returns the parsed policy.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Returns the shared filter settings.
    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }
}

impl<L: InstanceLookup, C: ContextResolver> Filter for NetworkCountFilter<L, C> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn call(&self, request: &RequestAdapter) -> Result<FilterDecision, Error> {
        let log = self.log.for_request(request.request_id());

        if !is_enabled(&self.settings, Self::NAME, request) {
            log.debug(format_args!("filter disabled"));
            return Ok(FilterDecision::Passthrough);
        }
        if request.method() != Some(HttpMethod::Post) {
            return Ok(FilterDecision::Passthrough);
        }
        let Some(context) = self.resolver.resolve(request) else {
            log.debug(format_args!("no tenant context, passing through"));
            return Ok(FilterDecision::Passthrough);
        };

        let violation = match classify(HttpMethod::Post, request.path(), &context.project_id) {
            RequestIntent::NetworkAttach { instance_id, .. } => {
                AttachNetworkCountCheck::new(&self.policy, &self.lookup).check_networks(
                    &context,
                    request.body(),
                    &instance_id,
                    &log,
                )?
            }
            RequestIntent::ServerBoot { .. } => {
                BootNetworkCountCheck::new(&self.policy).check_networks(request.body(), &log)
            }
            RequestIntent::NetworkDetach { .. } | RequestIntent::Irrelevant => None,
        };

        Ok(decide(violation, &log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InMemoryInstances, VirtualInterface};
    use crate::request::TenantContext;

    const PROJECT: &str = "123456";
    const INSTANCE: &str = "12345678-1234-1234-1234-123456789012";

    fn filter(conf: &[(&str, &str)]) -> NetworkCountFilter<InMemoryInstances> {
        let mut table = InMemoryInstances::new();
        table.insert(
            PROJECT,
            INSTANCE,
            vec![VirtualInterface::new("vif-1", "private")],
        );
        NetworkCountFilter::new(&FilterConf::from_pairs(conf.iter().copied()), table).unwrap()
    }

    fn request(method: &str, path: &str, body: &str) -> RequestAdapter {
        let mut req = RequestAdapter::new(method, path);
        req.set_context(Some(TenantContext::new(PROJECT)));
        req.set_body(body);
        req
    }

    #[test]
    fn reads_configuration() {
        let f = filter(&[("networks_max", "2"), ("banned_nets", "pub")]);
        assert_eq!(f.policy().networks_max, 2);
        assert_eq!(f.policy().banned_networks.len(), 1);
        assert!(f.settings().enabled);
        assert_eq!(f.name(), "network-count-check");
    }

    #[test]
    fn only_post_is_inspected() {
        let f = filter(&[]);
        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let req = request(method, "/123456/servers", r#"{"server": {"networks": []}}"#);
            assert!(f.call(&req).unwrap().is_passthrough(), "{}", method);
        }
        let req = request("POST", "/123456/servers", r#"{"server": {"networks": []}}"#);
        assert!(!f.call(&req).unwrap().is_passthrough());
    }

    #[test]
    fn disabled_filter_passes_everything() {
        let f = filter(&[("enabled", "false")]);
        let req = request("POST", "/123456/servers", r#"{"server": {"networks": []}}"#);
        assert!(f.call(&req).unwrap().is_passthrough());
    }

    #[test]
    fn missing_context_fails_open() {
        let f = filter(&[]);
        let mut req = request("POST", "/123456/servers", r#"{"server": {"networks": []}}"#);
        req.set_context(None);
        assert!(f.call(&req).unwrap().is_passthrough());
    }

    #[test]
    fn other_project_path_is_irrelevant() {
        let f = filter(&[]);
        let req = request("POST", "/999/servers", r#"{"server": {"networks": []}}"#);
        assert!(f.call(&req).unwrap().is_passthrough());
    }

    #[test]
    fn attach_over_limit_is_rejected() {
        let f = filter(&[]);
        let path = format!("/{}/servers/{}/os-virtual-interfacesv2", PROJECT, INSTANCE);
        let req = request(
            "POST",
            &path,
            r#"{"virtual_interface": {"network_id": "other"}}"#,
        );
        let decision = f.call(&req).unwrap();
        assert_eq!(
            decision.rejection().unwrap().body(),
            "At most 1 isolated network(s) can be attached"
        );
    }

    #[test]
    fn custom_resolver_is_used() {
        let conf = FilterConf::new();
        let f = NetworkCountFilter::with_resolver(
            &conf,
            InMemoryInstances::new(),
            |_: &RequestAdapter| Some(TenantContext::new("from-resolver")),
        )
        .unwrap();
        let mut req = RequestAdapter::new("POST", "/from-resolver/servers");
        req.set_body(r#"{"server": {"networks": []}}"#);
        assert!(!f.call(&req).unwrap().is_passthrough());
    }
}
