use std::fmt;

/// Errors that can occur while a filter evaluates a request.
///
/// A policy violation is not an error: it is reported as a rejection
/// decision. Only collaborator failures surface here.
#[derive(Debug)]
pub enum Error {
    /// The instance lookup collaborator failed
    Lookup(LookupError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lookup(e) => write!(f, "Instance lookup failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lookup(e) => Some(e),
        }
    }
}

impl From<LookupError> for Error {
    fn from(e: LookupError) -> Self {
        Error::Lookup(e)
    }
}

/// Failure reported by an [`InstanceLookup`](crate::InstanceLookup) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No instance with this id is visible to the tenant
    InstanceNotFound {
        /// The instance id that was looked up
        instance_id: String,
    },
    /// The compute backend failed for another reason
    Backend(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InstanceNotFound { instance_id } => {
                write!(f, "instance {} not found", instance_id)
            }
            LookupError::Backend(msg) => write!(f, "compute backend error: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// A configuration value that could not be parsed at filter construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    key: String,
    value: String,
    reason: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error for `key`.
    pub fn new(key: impl Into<String>, value: impl Into<String>, reason: &'static str) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            reason,
        }
    }

    /// Returns the configuration key that failed to parse.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the offending raw value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value {:?} for '{}': {}",
            self.value, self.key, self.reason
        )
    }
}

impl std::error::Error for ConfigError {}

/// A network policy violation with details about which rule failed.
///
/// The [`message`](Violation::message) is the plaintext body sent back to
/// the caller with a 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The rule that was violated
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the caller-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Violation {}

/// The rule a [`Violation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// One or more required networks are absent
    RequiredMissing,
    /// A banned network is present
    BannedPresent,
    /// The isolated network count is outside the configured bounds
    CountOutOfRange,
    /// A detach targets a required network
    RequiredDetach,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::RequiredMissing => write!(f, "required network missing"),
            ViolationKind::BannedPresent => write!(f, "banned network present"),
            ViolationKind::CountOutOfRange => write!(f, "network count out of range"),
            ViolationKind::RequiredDetach => write!(f, "required network detach"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_includes_kind_and_message() {
        let v = Violation::new(ViolationKind::BannedPresent, "Networks (a) not allowed");
        assert_eq!(
            v.to_string(),
            "banned network present: Networks (a) not allowed"
        );
        assert_eq!(v.message(), "Networks (a) not allowed");
    }

    #[test]
    fn lookup_error_converts_into_error() {
        let err: Error = LookupError::InstanceNotFound {
            instance_id: "abc".to_string(),
        }
        .into();
        assert!(err.to_string().contains("instance abc not found"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_error_names_key_and_value() {
        let e = ConfigError::new("networks_max", "two", "expected a non-negative integer");
        assert_eq!(e.key(), "networks_max");
        assert_eq!(e.value(), "two");
        assert!(e.to_string().contains("'networks_max'"));
    }
}
