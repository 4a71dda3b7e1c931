//! Request context consumed by route matching
//!
//! The router never reads process-wide state: everything it needs to know
//! about the current request (method, URL, TLS, host, query) is handed to
//! it in an immutable [`RequestContext`].

use crate::error::{Result, RouteError};
use crate::param::{build_query, Params};
use crate::path::normalize_base;

/// Request context passed to matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method, upper-cased
    pub method: String,

    /// Request path, already percent-decoded by the caller
    pub path: String,

    /// Whether the connection is TLS
    pub secure: bool,

    /// Host name without port
    pub host: String,

    /// Port the request arrived on (None = scheme default)
    pub port: Option<u16>,

    /// Query parameters from the URL (?key=value)
    pub query: Params,

    /// Front-controller path, used for base path detection (e.g. "/app/index.php")
    pub script_name: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
            secure: false,
            host: "localhost".to_string(),
            port: None,
            query: Params::new(),
            script_name: None,
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    pub fn with_script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = Some(script_name.into());
        self
    }

    /// Check if this is a specific method (case-insensitive)
    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    /// Base path derived from the front-controller location
    pub fn base(&self) -> String {
        self.script_name
            .as_deref()
            .map(detect_base)
            .unwrap_or_else(|| "/".to_string())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("GET", "/")
    }
}

/// Directory part of a front-controller path
///
/// ```
/// use titon_router::context::detect_base;
///
/// assert_eq!(detect_base("/app/index.php"), "/app");
/// assert_eq!(detect_base("/index.php"), "/");
/// assert_eq!(detect_base("/shop/public/"), "/shop/public");
/// ```
pub fn detect_base(script_name: &str) -> String {
    let script = script_name.replace('\\', "/");

    let dir = if script.ends_with('/') {
        script.as_str()
    } else {
        match script.rfind('/') {
            Some(idx) => &script[..idx],
            None => "",
        }
    };

    normalize_base(dir).into_owned()
}

/// Parsed pieces of the current request URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Params,
}

impl Segments {
    /// Snapshot the URL segments of a request
    pub fn from_context(ctx: &RequestContext) -> Self {
        Self {
            scheme: if ctx.secure { "https" } else { "http" }.to_string(),
            host: ctx.host.clone(),
            port: ctx.port,
            path: ctx.path.clone(),
            query: ctx.query.clone(),
        }
    }

    /// Scalar segment by name
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "scheme" => Ok(self.scheme.clone()),
            "host" => Ok(self.host.clone()),
            "port" => Ok(self.effective_port().to_string()),
            "path" => Ok(self.path.clone()),
            "query" => Ok(build_query(&self.query)),
            _ => Err(RouteError::MissingSegment(key.to_string())),
        }
    }

    fn default_port(&self) -> u16 {
        if self.scheme == "https" {
            443
        } else {
            80
        }
    }

    fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.default_port())
    }

    /// Full URL of the current request
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);

        if self.effective_port() != self.default_port() {
            url.push_str(&format!(":{}", self.effective_port()));
        }

        url.push_str(&self.path);

        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&build_query(&self.query));
        }

        url
    }
}
