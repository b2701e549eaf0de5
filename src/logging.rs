use std::fmt;

/// A named logger owned by a single filter instance.
///
/// `FilterLog` replaces any process-wide logger configuration: each filter
/// is built with its own `log_name` and every event it emits carries that
/// name as the `filter` field.
///
/// Events are emitted through `tracing`, so the hosting process decides
/// where they go by installing a subscriber.
#[derive(Debug, Clone)]
pub struct FilterLog {
    name: String,
}

impl FilterLog {
    /// Creates a logger that tags events with `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the configured log name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a logger bound to a single request.
    pub fn for_request<'a>(&'a self, request_id: Option<&'a str>) -> RequestLog<'a> {
        RequestLog {
            filter: &self.name,
            request_id: request_id.unwrap_or("-"),
        }
    }

    /// Logs an info-level message outside of any request.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(filter = %self.name, "{}", args);
    }

    /// Logs a warning-level message outside of any request.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(filter = %self.name, "{}", args);
    }
}

/// Request-scoped view of a [`FilterLog`].
///
/// All messages include the filter name and the request id for tracing.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    filter: &'a str,
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with filter name and request ID.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(filter = %self.filter, request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with filter name and request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(filter = %self.filter, request_id = %self.request_id, "{}", args);
    }
}
