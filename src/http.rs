use std::fmt;

use crate::error::Violation;

/// HTTP method of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP HEAD method
    Head,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
}

impl HttpMethod {
    /// Parses a method token as sent on the wire.
    ///
    /// Method tokens are case-sensitive; anything outside the known set
    /// returns `None`, which every filter treats as irrelevant.
    ///
    /// # Examples
    ///
    /// ```
    /// use network_attach_policy::HttpMethod;
    ///
    /// assert_eq!(HttpMethod::parse("DELETE"), Some(HttpMethod::Delete));
    /// assert_eq!(HttpMethod::parse("delete"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

/// Status code used for every policy rejection.
pub const FORBIDDEN: u16 = 403;

/// A response that replaces the wrapped service's response.
///
/// Rejections are always `403 Forbidden` with a short plaintext body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    status: u16,
    body: String,
}

impl Rejection {
    /// Creates a 403 rejection with the given plaintext body.
    pub fn forbidden(body: impl Into<String>) -> Self {
        Self {
            status: FORBIDDEN,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the plaintext response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the `Content-Type` of the body.
    pub fn content_type(&self) -> &'static str {
        "text/plain; charset=UTF-8"
    }
}

impl From<Violation> for Rejection {
    fn from(v: Violation) -> Self {
        Rejection::forbidden(v.message)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Forbidden: {}", self.status, self.body)
    }
}
