//! Route definitions, compiled routes and match results
//!
//! A route lives in two states, expressed as two types:
//! - [`Route`]: the mutable definition (path, default params, constraints).
//!   Paths can be extended with `append`/`prepend` while building.
//! - [`CompiledRoute`]: produced once by [`Route::compile`]. Immutable, so it
//!   can be shared read-only across threads; matching returns a fresh
//!   [`RouteMatch`] value instead of storing state on the route.

pub mod pattern;

use std::collections::BTreeMap;

use regex::Captures;
use tracing::trace;

use crate::context::RequestContext;
use crate::error::{Result, RouteError};
use crate::param::{is_shorthand, merge_defaults, parse_shorthand, Param, Params};
use crate::path::{append_path, prepend_path};

pub use pattern::{CompiledPattern, Token, TokenKind};

/// Constraints attached to a route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteConfig {
    /// Only match over TLS
    pub secure: bool,
    /// Allowed HTTP methods, upper-cased (empty = any)
    pub methods: Vec<String>,
    /// Custom patterns referenced by `<name>` tokens
    pub patterns: BTreeMap<String, String>,
    /// Token names whose values are appended to `args`
    pub pass: Vec<String>,
    /// Filter keys invoked after a match, in order
    pub filters: Vec<String>,
    /// Locale applied to matches that do not capture one
    pub locale: Option<String>,
}

/// A routable path with default params and constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: String,
    params: Params,
    config: RouteConfig,
}

fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !list.contains(&value) {
        list.push(value);
    }
}

impl Route {
    /// Creates a route; `params` are merged over the library defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use titon_router::{params, Route};
    ///
    /// let route = Route::new("/blog/[id]", params! { "controller" => "blog", "action" => "read" });
    /// assert_eq!(route.path(), "/blog/[id]");
    /// assert_eq!(route.param("module").and_then(|p| p.as_str()), Some("main"));
    /// ```
    pub fn new(path: impl Into<String>, params: Params) -> Self {
        let path = path.into();
        let path = if path.is_empty() { "/".to_string() } else { path };

        Self {
            path,
            params: merge_defaults(params),
            config: RouteConfig::default(),
        }
    }

    /// Creates a route from `Module\Controller@action.ext` shorthand
    ///
    /// ```
    /// use titon_router::Route;
    ///
    /// let route = Route::action("/topics", r"Forum\Topic@index").unwrap();
    /// assert_eq!(route.param("controller").and_then(|p| p.as_str()), Some("Topic"));
    /// ```
    pub fn action(path: impl Into<String>, shorthand: &str) -> Result<Self> {
        if !is_shorthand(shorthand) {
            return Err(RouteError::InvalidRoute(format!(
                "`{}` is not in Module\\Controller@action.ext form",
                shorthand
            )));
        }
        let params = parse_shorthand(shorthand).unwrap_or_default();
        Ok(Self::new(path, params))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut RouteConfig {
        &mut self.config
    }

    /// Appends to the path. Only available before compilation.
    pub fn append(&mut self, suffix: &str) -> &mut Self {
        self.path = append_path(&self.path, suffix);
        self
    }

    /// Prepends to the path. Only available before compilation.
    pub fn prepend(&mut self, prefix: &str) -> &mut Self {
        self.path = prepend_path(prefix, &self.path);
        self
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Restricts the route to one more HTTP method
    pub fn with_method(mut self, method: &str) -> Self {
        push_unique(&mut self.config.methods, method.to_ascii_uppercase());
        self
    }

    /// Replaces the allowed HTTP methods
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_methods(methods);
        self
    }

    pub(crate) fn set_methods<I, S>(&mut self, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.methods.clear();
        for method in methods {
            push_unique(&mut self.config.methods, method.as_ref().to_ascii_uppercase());
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;
        self
    }

    pub fn with_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.config.patterns.insert(name.into(), pattern.into());
        self
    }

    pub fn with_patterns<I, K, V>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, pattern) in patterns {
            self.config.patterns.insert(name.into(), pattern.into());
        }
        self
    }

    pub fn with_pass<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            push_unique(&mut self.config.pass, token);
        }
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        push_unique(&mut self.config.filters, filter);
        self
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for filter in filters {
            push_unique(&mut self.config.filters, filter);
        }
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = Some(locale.into());
        self
    }

    /// Compiles the path into its matcher, consuming the definition
    ///
    /// Patterns declared inline (`<name:REGEX>`) are registered into the
    /// route's pattern map so reverse-building can reuse them.
    ///
    /// # Errors
    ///
    /// `MissingPattern` when a `<name>` token has no pattern, `InvalidPattern`
    /// when an expression does not compile.
    pub fn compile(mut self) -> Result<CompiledRoute> {
        let pattern = pattern::compile(&self.path, &self.config.patterns)?;

        for (name, fragment) in &pattern.inline_patterns {
            self.config.patterns.insert(name.clone(), fragment.clone());
        }

        trace!(path = %self.path, compiled = %pattern.source, "compiled route");

        Ok(CompiledRoute {
            path: self.path,
            params: self.params,
            config: self.config,
            pattern,
        })
    }
}

/// An immutable, compiled route
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    path: String,
    params: Params,
    config: RouteConfig,
    pattern: CompiledPattern,
}

impl CompiledRoute {
    /// Whether the route matches `url` for this request
    ///
    /// ```
    /// use titon_router::{params, Route, RequestContext};
    ///
    /// let route = Route::new("/users/[id?]", params! {}).compile().unwrap();
    /// let ctx = RequestContext::default();
    ///
    /// assert!(route.is_match("/users/1", &ctx));
    /// assert!(route.is_match("/users", &ctx));
    /// assert!(!route.is_match("/users//", &ctx));
    /// ```
    pub fn is_match(&self, url: &str, ctx: &RequestContext) -> bool {
        self.match_url(url, ctx).is_some()
    }

    /// Matches `url` and extracts the bound params
    ///
    /// Method and TLS constraints are checked before the path. A path
    /// literally equal to the URL matches without running the expression.
    pub fn match_url(&self, url: &str, ctx: &RequestContext) -> Option<RouteMatch<'_>> {
        if !self.allows_method(&ctx.method) {
            trace!(path = %self.path, method = %ctx.method, "method not allowed");
            return None;
        }

        if self.config.secure && !ctx.secure {
            trace!(path = %self.path, "route requires a secure connection");
            return None;
        }

        if self.path == url {
            return Some(self.bind(url.to_string(), None));
        }

        let caps = self.pattern.regex.captures(url)?;
        let matched = caps.get(0).map(|m| m.as_str()).unwrap_or(url).to_string();

        Some(self.bind(matched, Some(&caps)))
    }

    /// Merges token captures over the defaults and collects passed args
    fn bind(&self, url: String, caps: Option<&Captures<'_>>) -> RouteMatch<'_> {
        let mut params = self.params.clone();
        let mut args: Vec<Param> = params
            .get("args")
            .and_then(Param::as_list)
            .map(<[Param]>::to_vec)
            .unwrap_or_default();

        if let Some(caps) = caps {
            for token in &self.pattern.tokens {
                let Some(value) = caps.get(token.group) else {
                    continue;
                };
                let value = value.as_str().to_string();

                if self.config.pass.contains(&token.name) {
                    args.push(Param::Str(value.clone()));
                }
                params.insert(token.name.clone(), Param::Str(value));
            }
        }

        params.insert("args".to_string(), Param::List(args));

        if let Some(locale) = &self.config.locale {
            params
                .entry("locale".to_string())
                .or_insert_with(|| Param::Str(locale.clone()));
        }

        RouteMatch {
            route: self,
            key: None,
            url,
            params,
        }
    }

    /// Whether `method` passes the route's method constraint
    pub fn allows_method(&self, method: &str) -> bool {
        self.config.methods.is_empty()
            || self
                .config
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Compiled expression body (without anchors)
    pub fn compiled(&self) -> &str {
        &self.pattern.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.pattern.tokens
    }

    /// A route without tokens
    pub fn is_static(&self) -> bool {
        self.pattern.is_static()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn methods(&self) -> &[String] {
        &self.config.methods
    }

    pub fn is_secure(&self) -> bool {
        self.config.secure
    }

    pub fn patterns(&self) -> &BTreeMap<String, String> {
        &self.config.patterns
    }

    pub fn pass(&self) -> &[String] {
        &self.config.pass
    }

    pub fn filters(&self) -> &[String] {
        &self.config.filters
    }

    pub fn locale(&self) -> Option<&str> {
        self.config.locale.as_deref()
    }
}

/// Result of matching a route against a URL
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    route: &'r CompiledRoute,
    key: Option<&'r str>,
    url: String,
    params: Params,
}

impl<'r> RouteMatch<'r> {
    pub(crate) fn with_key(mut self, key: &'r str) -> Self {
        self.key = Some(key);
        self
    }

    /// The matched route
    pub fn route(&self) -> &'r CompiledRoute {
        self.route
    }

    /// Key the route was registered under (set by the router)
    pub fn key(&self) -> Option<&'r str> {
        self.key
    }

    /// The part of the URL that matched
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Defaults merged with the captured token values
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    /// String value of a param, if it is a scalar
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Param::as_str)
    }

    /// Positional args: defaults followed by passed token values
    pub fn args(&self) -> &[Param] {
        self.params
            .get("args")
            .and_then(Param::as_list)
            .unwrap_or_default()
    }

    pub fn module(&self) -> &str {
        self.get("module").unwrap_or_default()
    }

    pub fn controller(&self) -> &str {
        self.get("controller").unwrap_or_default()
    }

    pub fn action(&self) -> &str {
        self.get("action").unwrap_or_default()
    }

    pub fn ext(&self) -> &str {
        self.get("ext").unwrap_or_default()
    }
}
