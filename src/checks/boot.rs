use crate::body::{boot_networks, BootNetworks};
use crate::config::PolicyConfig;
use crate::error::Violation;
use crate::logging::RequestLog;
use crate::policy::{check_banned, check_count, check_required, NetworkSet};

/// Verifies the networks requested when booting a server.
///
/// The instance does not exist yet, so only the requested set is counted.
#[derive(Debug)]
pub struct BootNetworkCountCheck<'a> {
    config: &'a PolicyConfig,
}

impl<'a> BootNetworkCountCheck<'a> {
    /// Creates a check over `config`.
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self { config }
    }

    /// Evaluates the boot request `body`.
    ///
    /// An empty or unreadable body passes. A `server` without `networks`
    /// passes unless `strict_boot_check` is set, in which case it is
    /// checked as an empty network list.
    pub fn check_networks(&self, body: &[u8], log: &RequestLog<'_>) -> Option<Violation> {
        if body.is_empty() {
            return None;
        }

        let networks = match boot_networks(body) {
            BootNetworks::Listed(networks) => networks,
            BootNetworks::Unspecified if self.config.strict_boot_check => NetworkSet::new(),
            BootNetworks::Unspecified => {
                log.debug(format_args!("boot request names no networks"));
                return None;
            }
            BootNetworks::Unreadable => {
                log.debug(format_args!("boot body unreadable, skipping checks"));
                return None;
            }
        };

        self.evaluate(&networks).err()
    }

    fn evaluate(&self, networks: &NetworkSet) -> Result<(), Violation> {
        let cfg = self.config;
        check_required(networks, &cfg.required_networks)?;
        check_banned(networks, &cfg.banned_networks)?;
        check_count(
            networks,
            cfg.limits(),
            None,
            &cfg.optional_networks,
            cfg.count_optional_nets,
        )
    }
}
