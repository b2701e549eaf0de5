//! Network set policy rules.
//!
//! Three independent, pure rules over sets of network ids. Each returns
//! `Ok(())` when satisfied or the [`Violation`] to report. Callers chain
//! them with `?`, so only the first failing rule is reported.

use std::collections::BTreeSet;

use crate::error::{Violation, ViolationKind};

/// Opaque network identifier.
///
/// Ids taken from request bodies are never format-checked.
pub type NetworkId = String;

/// Ordered set of network ids; ordering keeps messages deterministic.
pub type NetworkSet = BTreeSet<NetworkId>;

/// Bounds on the number of isolated networks an instance may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountLimits {
    /// Lower bound; `0` disables it
    pub min: usize,
    /// Upper bound, inclusive
    pub max: usize,
}

impl CountLimits {
    /// Creates limits from a minimum and maximum.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Limits with no lower bound.
    pub fn at_most(max: usize) -> Self {
        Self { min: 0, max }
    }

    /// The message reported when the count is out of range.
    pub fn violation_message(&self) -> String {
        if self.min == 0 {
            format!("At most {} isolated network(s) can be attached", self.max)
        } else if self.min == self.max {
            format!("Exactly {} isolated network(s) must be attached", self.min)
        } else {
            format!(
                "Only {} to {} isolated network(s) can be attached",
                self.min, self.max
            )
        }
    }

    fn admits(&self, count: usize) -> bool {
        !(self.min > 0 && count < self.min) && count <= self.max
    }
}

/// Joins network ids with `,` for use in messages.
pub fn join_networks(networks: &NetworkSet) -> String {
    networks
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Verifies every required network is present.
///
/// The message lists all required networks, not only the missing ones.
///
/// # Examples
///
/// ```
/// use network_attach_policy::{check_required, NetworkSet};
///
/// let required: NetworkSet = ["a".to_string()].into_iter().collect();
/// let present: NetworkSet = ["b".to_string()].into_iter().collect();
///
/// let err = check_required(&present, &required).unwrap_err();
/// assert_eq!(err.message(), "Networks (a) required but missing");
/// assert!(check_required(&required, &required).is_ok());
/// ```
pub fn check_required(present: &NetworkSet, required: &NetworkSet) -> Result<(), Violation> {
    if required.is_subset(present) {
        return Ok(());
    }
    Err(Violation::new(
        ViolationKind::RequiredMissing,
        format!("Networks ({}) required but missing", join_networks(required)),
    ))
}

/// Verifies no banned network is present.
///
/// The message lists all configured banned networks.
pub fn check_banned(present: &NetworkSet, banned: &NetworkSet) -> Result<(), Violation> {
    if present.is_disjoint(banned) {
        return Ok(());
    }
    Err(Violation::new(
        ViolationKind::BannedPresent,
        format!("Networks ({}) not allowed", join_networks(banned)),
    ))
}

/// Verifies the number of isolated networks is within `limits`.
///
/// The counted set is `requested ∪ existing`, minus `optional` unless
/// `count_optional` is set.
///
/// # Examples
///
/// ```
/// use network_attach_policy::{check_count, CountLimits, NetworkSet};
///
/// let requested: NetworkSet = ["a".to_string()].into_iter().collect();
/// let existing: NetworkSet = ["b".to_string()].into_iter().collect();
/// let optional = NetworkSet::new();
///
/// let err = check_count(&requested, CountLimits::at_most(1), Some(&existing), &optional, false)
///     .unwrap_err();
/// assert_eq!(err.message(), "At most 1 isolated network(s) can be attached");
/// ```
pub fn check_count(
    requested: &NetworkSet,
    limits: CountLimits,
    existing: Option<&NetworkSet>,
    optional: &NetworkSet,
    count_optional: bool,
) -> Result<(), Violation> {
    let isolated = requested
        .iter()
        .chain(existing.into_iter().flatten())
        .filter(|net| count_optional || !optional.contains(*net))
        .collect::<BTreeSet<_>>();

    if limits.admits(isolated.len()) {
        return Ok(());
    }
    Err(Violation::new(
        ViolationKind::CountOutOfRange,
        limits.violation_message(),
    ))
}
