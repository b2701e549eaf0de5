//! Request entry points.
//!
//! A filter is invoked once per inbound request and either lets it
//! through to the wrapped service untouched or rejects it with a 403.
//!
//! # Dispatch
//!
//! ```text
//! request
//!   ↓ disabled (config or override header)?  → passthrough
//!   ↓ method not relevant?                   → passthrough
//!   ↓ no tenant context?                     → passthrough (fail open)
//!   ↓ classify path; irrelevant?             → passthrough
//!   ↓ run the matching check
//!   ↓ violation? → rejected(403, message) : passthrough
//! ```
//!
//! Missing tenant context fails open: authorization stays with the
//! wrapped service, and this layer offers no protection for requests the
//! auth layer did not resolve.

mod count;
mod detach;

pub use count::NetworkCountFilter;
pub use detach::DetachNetworkFilter;

use crate::config::{parse_bool, FilterSettings};
use crate::error::{Error, Violation};
use crate::http::Rejection;
use crate::logging::RequestLog;
use crate::request::RequestAdapter;

/// Result of running a filter over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Forward the request to the wrapped service unmodified
    Passthrough,
    /// Answer the request with this rejection instead
    Rejected(Rejection),
}

impl FilterDecision {
    /// Returns true for [`FilterDecision::Passthrough`].
    pub fn is_passthrough(&self) -> bool {
        matches!(self, FilterDecision::Passthrough)
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            FilterDecision::Rejected(r) => Some(r),
            FilterDecision::Passthrough => None,
        }
    }
}

/// Response of a filtered service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered<R> {
    /// The wrapped service ran and produced this response
    Service(R),
    /// A filter rejected the request; the service never ran
    Rejected(Rejection),
}

/// A request-validating filter.
pub trait Filter {
    /// Stable filter name; also the base of the override header.
    fn name(&self) -> &'static str;

    /// Evaluates one request.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a collaborator fails. Policy violations
    /// are not errors; they produce [`FilterDecision::Rejected`].
    fn call(&self, request: &RequestAdapter) -> Result<FilterDecision, Error>;

    /// Runs the filter and, on passthrough, the wrapped `service`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`call`](Filter::call); `service` is not
    /// invoked in that case.
    fn handle<R, F>(&self, request: &RequestAdapter, service: F) -> Result<Filtered<R>, Error>
    where
        Self: Sized,
        F: FnOnce(&RequestAdapter) -> R,
    {
        match self.call(request)? {
            FilterDecision::Passthrough => Ok(Filtered::Service(service(request))),
            FilterDecision::Rejected(r) => Ok(Filtered::Rejected(r)),
        }
    }
}

/// Header that overrides `enabled` for the filter called `name`.
///
/// # Examples
///
/// ```
/// use network_attach_policy::filter::override_header;
///
/// assert_eq!(override_header("network-count-check"), "x-network-count-check-enabled");
/// ```
pub fn override_header(name: &str) -> String {
    format!("x-{}-enabled", name.replace('_', "-").to_ascii_lowercase())
}

/// Decides whether a filter runs for this request.
///
/// The override header is consulted only when the operator enabled
/// runtime overrides; an unrecognized header value leaves the configured
/// setting in place.
pub(crate) fn is_enabled(settings: &FilterSettings, name: &str, request: &RequestAdapter) -> bool {
    if settings.runtime_overrides {
        if let Some(value) = request
            .header(&override_header(name))
            .and_then(parse_bool)
        {
            return value;
        }
    }
    settings.enabled
}

pub(crate) fn decide(violation: Option<Violation>, log: &RequestLog<'_>) -> FilterDecision {
    match violation {
        None => FilterDecision::Passthrough,
        Some(v) => {
            log.info(format_args!("rejecting request: {}", v));
            FilterDecision::Rejected(Rejection::from(v))
        }
    }
}

/// Ordered list of filters evaluated in front of one service.
///
/// Filters run in insertion order; the first rejection or error stops
/// the chain.
#[derive(Default)]
pub struct FilterChain<'a> {
    filters: Vec<Box<dyn Filter + 'a>>,
}

impl<'a> FilterChain<'a> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Appends a filter to the chain.
    pub fn with(mut self, filter: impl Filter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Returns the filter names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl std::fmt::Debug for FilterChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}

impl Filter for FilterChain<'_> {
    fn name(&self) -> &'static str {
        "filter-chain"
    }

    fn call(&self, request: &RequestAdapter) -> Result<FilterDecision, Error> {
        for filter in &self.filters {
            let decision = filter.call(request)?;
            if !decision.is_passthrough() {
                return Ok(decision);
            }
        }
        Ok(FilterDecision::Passthrough)
    }
}
