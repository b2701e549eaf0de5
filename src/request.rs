//! Inbound request model and tenant context resolution.

use std::collections::HashMap;

use crate::http::HttpMethod;

/// The authenticated caller's identity and project scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Project (tenant) the caller acts in
    pub project_id: String,
    /// Authenticated user, if the auth layer exposes one
    pub user_id: Option<String>,
}

impl TenantContext {
    /// Creates a context scoped to `project_id`.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: None,
        }
    }

    /// Attaches the authenticated user id.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Framework-neutral view of an inbound HTTP request.
///
/// Hosting frameworks build one of these per request and hand it to a
/// filter. The adapter owns plain data only, so it carries no coupling to
/// any server crate.
///
/// # Examples
///
/// ```
/// use network_attach_policy::{RequestAdapter, TenantContext, HttpMethod};
///
/// let mut req = RequestAdapter::new("POST", "/p1/servers");
/// req.add_header("X-Request-Id", "req-1");
/// req.set_body(r#"{"server": {}}"#);
/// req.set_context(Some(TenantContext::new("p1")));
///
/// assert_eq!(req.method(), Some(HttpMethod::Post));
/// assert_eq!(req.header("x-request-id"), Some("req-1"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    method: String,
    path: String,
    /// Header names are stored lowercased
    headers: HashMap<String, String>,
    body: Vec<u8>,
    context: Option<TenantContext>,
}

impl RequestAdapter {
    /// Header carrying the request correlation id.
    pub const REQUEST_ID_HEADER: &'static str = "x-request-id";

    /// Creates an adapter for `method` on `path` with no headers or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            context: None,
        }
    }

    /// Adds a header; names are case-insensitive.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Replaces the request body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Sets the tenant context placed on the request by the auth layer.
    pub fn set_context(&mut self, context: Option<TenantContext>) {
        self.context = context;
    }

    /// Returns the parsed method, or `None` for an unknown token.
    pub fn method(&self) -> Option<HttpMethod> {
        HttpMethod::parse(&self.method)
    }

    /// Returns the raw method token.
    pub fn method_token(&self) -> &str {
        &self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the request id header, if present.
    pub fn request_id(&self) -> Option<&str> {
        self.header(Self::REQUEST_ID_HEADER)
    }

    /// Returns the context the host framework attached, if any.
    pub fn environment_context(&self) -> Option<&TenantContext> {
        self.context.as_ref()
    }
}

/// Resolves the tenant context for a request.
///
/// This is the seam for the authentication layer. Returning `None` means
/// the caller is not (yet) authenticated; filters then let the request
/// through untouched and leave authorization to the wrapped service.
pub trait ContextResolver {
    /// Resolves the caller's tenant context.
    fn resolve(&self, request: &RequestAdapter) -> Option<TenantContext>;
}

/// Reads the context the hosting framework stored on the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentContext;

impl ContextResolver for EnvironmentContext {
    fn resolve(&self, request: &RequestAdapter) -> Option<TenantContext> {
        request.environment_context().cloned()
    }
}

impl<F> ContextResolver for F
where
    F: Fn(&RequestAdapter) -> Option<TenantContext>,
{
    fn resolve(&self, request: &RequestAdapter) -> Option<TenantContext> {
        self(request)
    }
}
