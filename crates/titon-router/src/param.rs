//! Route parameter values
//!
//! Routes carry a flat map of named parameters (`module`, `controller`,
//! `action`, `ext`, `args`, `query` and every token name). Most values are
//! plain strings; `args` is a list and `query` a nested map, so values are
//! modelled as a small recursive sum type.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Parameter map keyed by name. Ordered so rendering and cache keys are stable.
pub type Params = BTreeMap<String, Param>;

pub const DEFAULT_MODULE: &str = "main";
pub const DEFAULT_CONTROLLER: &str = "index";
pub const DEFAULT_ACTION: &str = "index";

/// `Module\Controller@action.ext`, module and ext optional
static SHORTHAND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<module>\w+)\\)?(?P<controller>\w+)@(?P<action>[\w-]+)(?:\.(?P<ext>\w+))?$")
        .expect("shorthand regex is valid")
});

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Str(String),
    List(Vec<Param>),
    Map(BTreeMap<String, Param>),
}

impl Param {
    /// String view of scalar values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Param]> {
        match self {
            Param::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Param>> {
        match self {
            Param::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Empty strings, lists and maps
    pub fn is_empty(&self) -> bool {
        match self {
            Param::Str(s) => s.is_empty(),
            Param::List(items) => items.is_empty(),
            Param::Map(map) => map.is_empty(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Str(s) => f.write_str(s),
            Param::List(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Param::Map(_) => f.write_str("[Map]"),
        }
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Str(s)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Str(s.to_string())
    }
}

impl From<&String> for Param {
    fn from(s: &String) -> Self {
        Param::Str(s.clone())
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Str(n.to_string())
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Str(n.to_string())
    }
}

impl From<u32> for Param {
    fn from(n: u32) -> Self {
        Param::Str(n.to_string())
    }
}

impl From<u64> for Param {
    fn from(n: u64) -> Self {
        Param::Str(n.to_string())
    }
}

impl From<usize> for Param {
    fn from(n: usize) -> Self {
        Param::Str(n.to_string())
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(items: Vec<T>) -> Self {
        Param::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Param>> for Param {
    fn from(map: BTreeMap<String, Param>) -> Self {
        Param::Map(map)
    }
}

/// Builds a [`Params`] map from `key => value` pairs
///
/// ```
/// use titon_router::{params, Param};
///
/// let p = params! { "controller" => "users", "id" => 5 };
/// assert_eq!(p.get("id"), Some(&Param::from("5")));
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Params::new();
        $( map.insert(::std::string::String::from($key), $crate::Param::from($value)); )+
        map
    }};
}

/// Library-wide defaults every route starts from
pub fn default_params() -> Params {
    let mut params = Params::new();
    params.insert("module".into(), DEFAULT_MODULE.into());
    params.insert("controller".into(), DEFAULT_CONTROLLER.into());
    params.insert("action".into(), DEFAULT_ACTION.into());
    params.insert("ext".into(), "".into());
    params.insert("args".into(), Param::List(Vec::new()));
    params.insert("query".into(), Param::Map(BTreeMap::new()));
    params
}

/// Parses `Module\Controller@action.ext` into params
///
/// Returns `None` when the string is not shorthand.
///
/// ```
/// use titon_router::param::parse_shorthand;
///
/// let p = parse_shorthand(r"Forum\Topic@stats.html").unwrap();
/// assert_eq!(p["module"].as_str(), Some("Forum"));
/// assert_eq!(p["controller"].as_str(), Some("Topic"));
/// assert_eq!(p["action"].as_str(), Some("stats"));
/// assert_eq!(p["ext"].as_str(), Some("html"));
/// ```
pub fn parse_shorthand(value: &str) -> Option<Params> {
    let caps = SHORTHAND_REGEX.captures(value.trim())?;

    let mut params = Params::new();
    for name in ["module", "controller", "action", "ext"] {
        if let Some(m) = caps.name(name) {
            params.insert(name.to_string(), m.as_str().into());
        }
    }
    Some(params)
}

/// Whether a string uses `Controller@action` routing syntax
pub fn is_shorthand(value: &str) -> bool {
    value.contains('@') && SHORTHAND_REGEX.is_match(value.trim())
}

/// Merges `overrides` over the library defaults
pub fn merge_defaults(overrides: Params) -> Params {
    let mut params = default_params();
    params.extend(overrides);
    params
}

/// Converts a name into its URL form: `ForumTopic` → `forum-topic`
///
/// ```
/// use titon_router::param::inflect_route;
///
/// assert_eq!(inflect_route("ForumTopic"), "forum-topic");
/// assert_eq!(inflect_route("view_all"), "view-all");
/// assert_eq!(inflect_route("stats"), "stats");
/// ```
pub fn inflect_route(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev_lower = false;

    for c in value.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else if c == '_' || c == ' ' || c == '-' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_alphanumeric();
        }
    }

    out.trim_end_matches('-').to_string()
}

/// Encodes params as a query string (`a=1&b[c]=2&list[0]=x`)
///
/// ```
/// use titon_router::{params, param::build_query};
///
/// assert_eq!(build_query(&params! { "page" => 2, "sort" => "name asc" }), "page=2&sort=name%20asc");
/// ```
pub fn build_query(params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_query_pairs(&mut pairs, urlencoding::encode(key).into_owned(), value);
    }
    pairs.join("&")
}

fn push_query_pairs(pairs: &mut Vec<String>, prefix: String, value: &Param) {
    match value {
        Param::Str(s) => pairs.push(format!("{}={}", prefix, urlencoding::encode(s))),
        Param::List(items) => {
            for (i, item) in items.iter().enumerate() {
                push_query_pairs(pairs, format!("{}%5B{}%5D", prefix, i), item);
            }
        }
        Param::Map(map) => {
            for (key, item) in map {
                push_query_pairs(pairs, format!("{}%5B{}%5D", prefix, urlencoding::encode(key)), item);
            }
        }
    }
}

/// Canonical single-line rendering, used as a cache key
pub(crate) fn canonical(params: &Params) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{:?}:", key));
        canonical_value(&mut out, value);
    }
    out.push('}');
    out
}

fn canonical_value(out: &mut String, value: &Param) {
    match value {
        Param::Str(s) => out.push_str(&format!("{:?}", s)),
        Param::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                canonical_value(out, item);
            }
            out.push(']');
        }
        Param::Map(map) => out.push_str(&canonical(map)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let params = default_params();
        assert_eq!(params["module"].as_str(), Some("main"));
        assert_eq!(params["controller"].as_str(), Some("index"));
        assert_eq!(params["action"].as_str(), Some("index"));
        assert_eq!(params["ext"].as_str(), Some(""));
        assert!(params["args"].is_empty());
        assert!(params["query"].is_empty());
    }

    #[test]
    fn test_shorthand_minimal() {
        let params = parse_shorthand("Users@edit").unwrap();
        assert_eq!(params.get("module"), None);
        assert_eq!(params["controller"].as_str(), Some("Users"));
        assert_eq!(params["action"].as_str(), Some("edit"));
        assert_eq!(params.get("ext"), None);
    }

    #[test]
    fn test_shorthand_rejects_plain_strings() {
        assert!(parse_shorthand("/users/5").is_none());
        assert!(parse_shorthand("users").is_none());
        assert!(!is_shorthand("mailto:a@b.com"));
        assert!(is_shorthand(r"Blog\Post@read.json"));
    }

    #[test]
    fn test_merge_defaults_keeps_overrides() {
        let params = merge_defaults(params! { "controller" => "blog", "id" => 3 });
        assert_eq!(params["controller"].as_str(), Some("blog"));
        assert_eq!(params["action"].as_str(), Some("index"));
        assert_eq!(params["id"].as_str(), Some("3"));
    }

    #[test]
    fn test_inflect_route() {
        assert_eq!(inflect_route("Forum"), "forum");
        assert_eq!(inflect_route("BlogPost"), "blog-post");
        assert_eq!(inflect_route("view all"), "view-all");
        assert_eq!(inflect_route("already-dashed"), "already-dashed");
    }

    #[test]
    fn test_build_query_nested() {
        let mut filter = BTreeMap::new();
        filter.insert("tag".to_string(), Param::from("rust"));

        let params = params! {
            "filter" => Param::Map(filter),
            "ids" => vec![1, 2],
        };

        assert_eq!(
            build_query(&params),
            "filter%5Btag%5D=rust&ids%5B0%5D=1&ids%5B1%5D=2"
        );
    }

    #[test]
    fn test_canonical_is_stable() {
        let a = params! { "b" => "2", "a" => "1" };
        let b = params! { "a" => "1", "b" => "2" };
        assert_eq!(canonical(&a), canonical(&b));
        assert_eq!(canonical(&a), r#"{"a":"1","b":"2"}"#);
    }
}
