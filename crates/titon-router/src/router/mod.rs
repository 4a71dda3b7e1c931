//! The router: registration, groups, filters, matching and reverse-building
//!
//! Routes are registered once at startup. Each one is compiled as it is
//! mapped, so a bad pattern fails registration rather than a request.
//! After that the router is only read: matching borrows it immutably and
//! the build cache is a concurrent map, so a fully built `Router` can be
//! shared across threads behind an `Arc`.

mod build;
mod group;
mod resource;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::context::RequestContext;
use crate::error::{Result, RouteError};
use crate::matcher::{LoopMatcher, Matcher, RouteTable};
use crate::param::{parse_shorthand, Param};
use crate::path::normalize_base;
use crate::route::{CompiledRoute, Route, RouteMatch};

pub use build::BuildTarget;
pub use group::GroupOptions;
pub use resource::{ResourceAction, ResourceMap};

/// Handler invoked for each filter a matched route names
pub type FilterFn = dyn Fn(&Router, &RouteMatch<'_>) + Send + Sync;

/// Listener notified before matching starts
pub type PreMatchFn = dyn Fn(&Router, &str) + Send + Sync;

/// Listener notified after a route matched and its filters ran
pub type PostMatchFn = dyn Fn(&Router, &RouteMatch<'_>) + Send + Sync;

/// Registry of routes and filters
///
/// # Example
///
/// ```
/// use titon_router::{params, GroupOptions, RequestContext, Route, Router};
///
/// let mut router = Router::new();
/// router.get("home", Route::new("/", params! {})).unwrap();
/// router
///     .group(GroupOptions::new().prefix("/admin"), |r| {
///         r.get("admin.users", Route::action("/users/[id?]", "Users@edit")?)
///     })
///     .unwrap();
///
/// let ctx = RequestContext::new("GET", "/admin/users/5");
/// let matched = router.match_request(&ctx).unwrap();
/// assert_eq!(matched.key(), Some("admin.users"));
/// assert_eq!(matched.get("id"), Some("5"));
///
/// let url = router.build(params! { "route" => "admin.users", "id" => 9 }).unwrap();
/// assert_eq!(url, "/admin/users/9");
/// ```
pub struct Router {
    routes: RouteTable,
    filters: HashMap<String, Arc<FilterFn>>,
    groups: Vec<GroupOptions>,
    patterns: BTreeMap<String, String>,
    matcher: Box<dyn Matcher>,
    base: String,
    pre_match: Vec<Arc<PreMatchFn>>,
    post_match: Vec<Arc<PostMatchFn>>,
    build_cache: DashMap<String, String>,
}

impl Router {
    /// Create an empty router using the [`LoopMatcher`] and a `/` base
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            filters: HashMap::new(),
            groups: Vec::new(),
            patterns: BTreeMap::new(),
            matcher: Box::new(LoopMatcher),
            base: "/".to_string(),
            pre_match: Vec::new(),
            post_match: Vec::new(),
            build_cache: DashMap::new(),
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Sets the application base path, prepended to built URLs and stripped
    /// from request paths in [`match_request`](Self::match_request)
    pub fn with_base(mut self, base: &str) -> Self {
        self.set_base(base);
        self
    }

    pub fn set_base(&mut self, base: &str) {
        self.base = normalize_base(base).into_owned();
        self.build_cache.clear();
    }

    /// Replaces the matching strategy
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.set_matcher(matcher);
        self
    }

    pub fn set_matcher(&mut self, matcher: impl Matcher + 'static) {
        self.matcher = Box::new(matcher);
    }

    /// Router-wide pattern, applied to every route that does not define its own
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.add_pattern(name, pattern);
        self
    }

    pub fn add_pattern(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.patterns.insert(name.into(), pattern.into());
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers a route under `key`, replacing any route with the same key
    ///
    /// Open groups are applied first, then the route is compiled.
    ///
    /// # Errors
    ///
    /// `MissingPattern` or `InvalidPattern` when the path does not compile.
    pub fn map(&mut self, key: impl Into<String>, mut route: Route) -> Result<()> {
        let key = key.into();

        group::apply_groups(&mut route, &self.groups);
        for (name, pattern) in &self.patterns {
            route
                .config_mut()
                .patterns
                .entry(name.clone())
                .or_insert_with(|| pattern.clone());
        }

        let compiled = route.compile()?;
        debug!(
            key = %key,
            path = %compiled.path(),
            compiled = %compiled.compiled(),
            methods = ?compiled.methods(),
            "registered route"
        );

        self.routes.insert(key, compiled);
        self.build_cache.clear();
        Ok(())
    }

    /// Registers a route restricted to `methods`
    pub fn http<I, S>(&mut self, key: impl Into<String>, methods: I, mut route: Route) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        route.set_methods(methods);
        self.map(key, route)
    }

    pub fn get(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["GET"], route)
    }

    pub fn post(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["POST"], route)
    }

    pub fn put(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["PUT"], route)
    }

    pub fn delete(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["DELETE"], route)
    }

    pub fn head(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["HEAD"], route)
    }

    pub fn options(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["OPTIONS"], route)
    }

    pub fn patch(&mut self, key: impl Into<String>, route: Route) -> Result<()> {
        self.http(key, ["PATCH"], route)
    }

    /// Expands `route` into `list`, `create`, `read`, `update` and `delete`
    /// routes registered as `key.list`, `key.create`, ...
    ///
    /// Member actions (read, update, delete) get an `/(id)` segment whose
    /// value is passed as the first arg.
    pub fn resource(&mut self, key: &str, route: Route, map: ResourceMap) -> Result<()> {
        for (key, route) in resource::expand(key, &route, &map) {
            self.map(key, route)?;
        }
        Ok(())
    }

    /// Runs `body` with `options` applied to every route it registers
    ///
    /// Groups nest. The frame is removed when `body` returns, whether it
    /// succeeded or not.
    pub fn group<F>(&mut self, options: GroupOptions, body: F) -> Result<()>
    where
        F: FnOnce(&mut Router) -> Result<()>,
    {
        self.groups.push(options);
        let result = body(self);
        self.groups.pop();
        result
    }

    /// Declares a filter that routes can reference by `key`
    ///
    /// # Errors
    ///
    /// `InvalidFilter` when the key is blank.
    pub fn filter<F>(&mut self, key: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(&Router, &RouteMatch<'_>) + Send + Sync + 'static,
    {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RouteError::InvalidFilter(
                "filter key must not be empty".to_string(),
            ));
        }

        self.filters.insert(key, Arc::new(handler));
        Ok(())
    }

    /// Registers a listener called with the URL before each match
    pub fn on_pre_match<F>(&mut self, listener: F)
    where
        F: Fn(&Router, &str) + Send + Sync + 'static,
    {
        self.pre_match.push(Arc::new(listener));
    }

    /// Registers a listener called with each successful match
    pub fn on_post_match<F>(&mut self, listener: F)
    where
        F: Fn(&Router, &RouteMatch<'_>) + Send + Sync + 'static,
    {
        self.post_match.push(Arc::new(listener));
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Route registered under `key`
    pub fn route(&self, key: &str) -> Result<&CompiledRoute> {
        self.routes
            .get(key)
            .ok_or_else(|| RouteError::MissingRoute(key.to_string()))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn has_route(&self, key: &str) -> bool {
        self.routes.contains(key)
    }

    pub fn has_filter(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Name of the matching strategy in use
    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Finds the route for `url`, then runs its filters and the listeners
    ///
    /// Filters run in the order the route lists them. They observe the
    /// match but cannot reject it.
    ///
    /// # Errors
    ///
    /// `NoMatch` when no route matches, `MissingFilter` when the matched
    /// route names a filter that was never declared.
    pub fn match_url<'r>(&'r self, url: &str, ctx: &RequestContext) -> Result<RouteMatch<'r>> {
        for listener in &self.pre_match {
            listener(self, url);
        }

        let Some(matched) = self.matcher.match_route(url, ctx, &self.routes) else {
            warn!(url, method = %ctx.method, "no route matched");
            return Err(RouteError::NoMatch {
                url: url.to_string(),
            });
        };

        debug!(
            key = matched.key().unwrap_or_default(),
            url,
            matcher = self.matcher.name(),
            "matched route"
        );

        for name in matched.route().filters() {
            let Some(filter) = self.filters.get(name) else {
                warn!(filter = %name, "route references an undeclared filter");
                return Err(RouteError::MissingFilter(name.clone()));
            };
            filter(self, &matched);
        }

        for listener in &self.post_match {
            listener(self, &matched);
        }

        Ok(matched)
    }

    /// Matches the request's path, relative to the base path
    pub fn match_request<'r>(&'r self, ctx: &RequestContext) -> Result<RouteMatch<'r>> {
        let url = self.strip_base(&ctx.path);
        self.match_url(url, ctx)
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base == "/" {
            return path;
        }

        match path.strip_prefix(self.base.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    // ========================================================================
    // Reverse Building
    // ========================================================================

    /// Builds a URL from a route key, shorthand, literal URL or params
    ///
    /// - a registered route key builds that route (it must have no required tokens),
    /// - `Module\Controller@action.ext` shorthand composes a positional URL,
    /// - any other string is returned unchanged,
    /// - params with a `route` entry fill that route's tokens; other params
    ///   compose a positional URL.
    ///
    /// Results are cached for the life of the route table.
    ///
    /// ```
    /// use titon_router::{params, Router};
    ///
    /// let router = Router::new().with_base("/app");
    /// assert_eq!(router.build(r"Forum\Topic@view_all").unwrap(), "/app/forum/topic/view-all");
    /// assert_eq!(router.build("https://example.com").unwrap(), "https://example.com");
    /// assert_eq!(
    ///     router.build(params! { "controller" => "users", "action" => "edit", "args" => vec![5] }).unwrap(),
    ///     "/app/users/edit/5"
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// `InvalidRoute` when the named route does not exist or a required
    /// token has no value.
    pub fn build(&self, target: impl Into<BuildTarget>) -> Result<String> {
        let target = target.into();
        let cache_key = target.cache_key();

        if let Some(url) = self.build_cache.get(&cache_key) {
            trace!(key = %cache_key, "build cache hit");
            return Ok(url.value().clone());
        }

        let url = match target {
            BuildTarget::Url(url) => {
                if let Some(route) = self.routes.get(&url) {
                    build::reverse(&url, route, Default::default(), &self.base)?
                } else if let Some(params) = parse_shorthand(&url) {
                    build::compose(params, &self.base)
                } else {
                    url
                }
            }
            BuildTarget::Params(mut params) => match params.remove("route") {
                Some(Param::Str(key)) => {
                    let route = self.routes.get(&key).ok_or_else(|| {
                        RouteError::InvalidRoute(format!("route `{}` does not exist", key))
                    })?;
                    build::reverse(&key, route, params, &self.base)?
                }
                Some(other) => {
                    return Err(RouteError::InvalidRoute(format!(
                        "`route` must be a route key, got `{}`",
                        other
                    )))
                }
                None => build::compose(params, &self.base),
            },
        };

        self.build_cache.insert(cache_key, url.clone());
        Ok(url)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("matcher", &self.matcher.name())
            .field("base", &self.base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_frame_popped_on_error() {
        let mut router = Router::new();
        let result = router.group(GroupOptions::new().prefix("/admin"), |r| {
            r.map("bad", Route::new("/<nope>", params! {}))
        });

        assert!(matches!(result, Err(RouteError::MissingPattern { .. })));
        router.map("after", Route::new("/after", params! {})).unwrap();
        assert_eq!(router.route("after").unwrap().path(), "/after");
    }

    #[test]
    fn test_router_patterns_fill_missing() {
        let mut router = Router::new().with_pattern("slug", "([a-z-]+)");
        router.map("post", Route::new("/posts/<slug>", params! {})).unwrap();
        router
            .map(
                "page",
                Route::new("/pages/<slug>", params! {}).with_pattern("slug", "([0-9]+)"),
            )
            .unwrap();

        assert_eq!(router.route("post").unwrap().compiled(), r"/posts/([a-z-]+)/?");
        assert_eq!(router.route("page").unwrap().compiled(), r"/pages/([0-9]+)/?");
    }

    #[test]
    fn test_strip_base() {
        let router = Router::new().with_base("/app/");
        assert_eq!(router.base(), "/app");
        assert_eq!(router.strip_base("/app/users"), "/users");
        assert_eq!(router.strip_base("/app"), "/");
        assert_eq!(router.strip_base("/application"), "/application");
    }

    #[test]
    fn test_map_invalidates_build_cache() {
        let mut router = Router::new();
        router.map("about", Route::new("/about", params! {})).unwrap();
        assert_eq!(router.build("about").unwrap(), "/about");

        router.map("about", Route::new("/about-us", params! {})).unwrap();
        assert_eq!(router.build("about").unwrap(), "/about-us");
    }

    #[test]
    fn test_empty_filter_key() {
        let mut router = Router::new();
        let err = router.filter("  ", |_, _| {}).unwrap_err();
        assert!(matches!(err, RouteError::InvalidFilter(_)));
    }

    #[test]
    fn test_router_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router>();
    }
}
