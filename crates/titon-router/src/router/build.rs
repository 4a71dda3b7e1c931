//! Reverse URL building
//!
//! Two directions back from params to a URL:
//! - a named route: its tokens are substituted back into the path template,
//! - anything else: `/module/controller/action/args.ext`, positionally.
//!
//! Whatever params remain unconsumed end up in the query string. A `#`
//! param becomes the fragment.

use crate::error::{Result, RouteError};
use crate::param::{
    build_query, canonical, inflect_route, merge_defaults, Param, Params, DEFAULT_ACTION,
    DEFAULT_CONTROLLER, DEFAULT_MODULE,
};
use crate::path::prepend_path;
use crate::route::CompiledRoute;

/// Input accepted by [`Router::build`](crate::Router::build)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    /// A literal URL, a route key, or `Module\Controller@action.ext` shorthand
    Url(String),
    /// Structured params, optionally naming a route under `route`
    Params(Params),
}

impl BuildTarget {
    /// Stable key for the build cache
    pub(crate) fn cache_key(&self) -> String {
        match self {
            BuildTarget::Url(url) => format!("url:{}", url),
            BuildTarget::Params(params) => format!("params:{}", canonical(params)),
        }
    }
}

impl From<&str> for BuildTarget {
    fn from(url: &str) -> Self {
        BuildTarget::Url(url.to_string())
    }
}

impl From<String> for BuildTarget {
    fn from(url: String) -> Self {
        BuildTarget::Url(url)
    }
}

impl From<&String> for BuildTarget {
    fn from(url: &String) -> Self {
        BuildTarget::Url(url.clone())
    }
}

impl From<Params> for BuildTarget {
    fn from(params: Params) -> Self {
        BuildTarget::Params(params)
    }
}

/// Params describing the route itself, never carried into the query string
const ROUTE_KEYS: [&str; 4] = ["module", "controller", "action", "args"];

/// Substitutes params into a named route's path template
///
/// Optional tokens without a value are dropped along with the `/` or `.`
/// that precedes them. A required token without a value is an error.
pub(crate) fn reverse(key: &str, route: &CompiledRoute, mut params: Params, base: &str) -> Result<String> {
    let template = route.path();
    let mut path = String::with_capacity(template.len());
    let mut last = 0;

    for token in route.tokens() {
        path.push_str(&template[last..token.span.start]);
        last = token.span.end;

        match params.remove(&token.name).filter(|value| !value.is_empty()) {
            Some(value) => path.push_str(&value.to_string()),
            None if token.optional => {
                if path.ends_with('/') || path.ends_with('.') {
                    path.pop();
                }
            }
            None => {
                return Err(RouteError::InvalidRoute(format!(
                    "route `{}` requires a value for token `{}`",
                    key, token.name
                )))
            }
        }
    }
    path.push_str(&template[last..]);

    if path.is_empty() {
        path.push('/');
    }

    for name in ROUTE_KEYS {
        params.remove(name);
    }
    if let Some(ext) = take_string(&mut params, "ext").filter(|ext| !ext.is_empty()) {
        path.push('.');
        path.push_str(&ext);
    }

    Ok(finish(path, params, base))
}

/// Composes `/module/controller/action/args.ext` from params
///
/// The module is left out when it is the default, controller and action
/// are left out when both are `index` and there is nothing after them.
pub(crate) fn compose(params: Params, base: &str) -> String {
    let mut params = merge_defaults(params);

    let module = take_string(&mut params, "module").map(|m| inflect_route(&m)).unwrap_or_default();
    let controller = take_string(&mut params, "controller")
        .map(|c| inflect_route(&c))
        .unwrap_or_else(|| DEFAULT_CONTROLLER.to_string());
    let action = take_string(&mut params, "action")
        .map(|a| inflect_route(&a))
        .unwrap_or_else(|| DEFAULT_ACTION.to_string());
    let ext = take_string(&mut params, "ext").unwrap_or_default();
    let args = match params.remove("args") {
        Some(Param::List(items)) => items,
        Some(Param::Str(s)) if !s.is_empty() => vec![Param::Str(s)],
        _ => Vec::new(),
    };

    let mut segments = Vec::new();
    if !module.is_empty() && module != DEFAULT_MODULE {
        segments.push(module);
    }

    let is_root = controller == DEFAULT_CONTROLLER
        && action == DEFAULT_ACTION
        && args.is_empty()
        && ext.is_empty();

    if !is_root {
        segments.push(controller);
        segments.push(action);
        segments.extend(
            args.iter()
                .map(|arg| urlencoding::encode(&arg.to_string()).into_owned()),
        );
    }

    let mut path = format!("/{}", segments.join("/"));
    if !ext.is_empty() {
        path.push('.');
        path.push_str(&ext);
    }

    finish(path, params, base)
}

/// Prepends the base path and appends the query string and fragment
fn finish(path: String, mut params: Params, base: &str) -> String {
    let fragment = params.remove("#");

    let mut query = Params::new();
    let explicit = params.remove("query");
    query.extend(params);
    if let Some(Param::Map(map)) = explicit {
        query.extend(map);
    }

    let mut url = if base == "/" {
        path
    } else {
        prepend_path(base, &path)
    };

    if !query.is_empty() {
        url.push('?');
        url.push_str(&build_query(&query));
    }

    match fragment {
        Some(Param::Map(map)) if !map.is_empty() => {
            url.push('#');
            url.push_str(&build_query(&map));
        }
        Some(Param::Str(fragment)) if !fragment.is_empty() => {
            url.push('#');
            url.push_str(&fragment);
        }
        _ => {}
    }

    url
}

fn take_string(params: &mut Params, key: &str) -> Option<String> {
    match params.remove(key)? {
        Param::Str(value) => Some(value),
        _ => None,
    }
}
