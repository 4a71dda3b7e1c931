//! Integration tests for titon-router
//!
//! Organized by feature area:
//! - Pattern compilation and token extraction
//! - Optional tokens
//! - Method and TLS gating
//! - Registration order
//! - Groups and resources
//! - Filters and match listeners

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rstest::rstest;
use titon_router::*;

fn get(path: &str) -> RequestContext {
    RequestContext::new("GET", path)
}

// ============================================================================
// Pattern Compilation
// ============================================================================

#[rstest]
#[case("/{name}", "/alice", "alice")]
#[case("/{name?}", "/bob", "bob")]
#[case("/[name]", "/1.5", "1.5")]
#[case("/[name?]", "/42", "42")]
#[case("/(name)", "/a/b/c", "a/b/c")]
#[case("/(name?)", "/x", "x")]
#[case("/<locale>", "/en-us", "en-us")]
#[case("/<name:([0-9]{4})>", "/2024", "2024")]
#[case("/<name:[a-f]+>", "/beef", "beef")]
fn test_token_round_trip(#[case] path: &str, #[case] url: &str, #[case] expected: &str) {
    let token = if path.contains("locale") { "locale" } else { "name" };
    let route = Route::new(path, params! {}).compile().unwrap();

    assert_eq!(route.tokens().len(), 1);
    assert_eq!(route.tokens()[0].name, token);

    let matched = route.match_url(url, &get(url)).unwrap();
    assert_eq!(matched.get(token), Some(expected));
}

#[test]
fn test_mixed_tokens_compose_left_to_right() {
    let route = Route::new("/(wild)/{str}/<code>/[id?]", params! {})
        .with_pattern("code", "([a-z]{3})")
        .compile()
        .unwrap();

    assert_eq!(
        route.compiled(),
        r"/(.*)/([a-z_\-+]+)/([a-z]{3})(?:/([0-9.]+))?/?"
    );

    let names: Vec<&str> = route.tokens().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["wild", "str", "code", "id"]);

    let matched = route.match_url("/w/s/abc/9", &get("/")).unwrap();
    assert_eq!(matched.get("wild"), Some("w"));
    assert_eq!(matched.get("str"), Some("s"));
    assert_eq!(matched.get("code"), Some("abc"));
    assert_eq!(matched.get("id"), Some("9"));
}

#[test]
fn test_compile_is_idempotent() {
    let route = Route::new("/blog/[id]/{slug?}", params! {});
    let first = route.clone().compile().unwrap();
    let second = route.compile().unwrap();
    assert_eq!(first.compiled(), second.compiled());

    let ctx = get("/");
    let a = first.match_url("/blog/1/intro", &ctx).map(|m| m.params().clone());
    let b = first.match_url("/blog/1/intro", &ctx).map(|m| m.params().clone());
    assert_eq!(a, b);
    assert!(a.is_some());
}

#[test]
fn test_missing_custom_pattern_fails_registration() {
    let mut router = Router::new();
    let err = router
        .map("tag", Route::new("/tags/<tag>", params! {}))
        .unwrap_err();

    assert_eq!(
        err,
        RouteError::MissingPattern {
            path: "/tags/<tag>".to_string(),
            token: "tag".to_string(),
        }
    );
    assert!(!router.has_route("tag"));
}

#[test]
fn test_module_controller_action_ext_scenario() {
    let route = Route::new("/{module}/{controller}/{action}.{ext}", params! {})
        .compile()
        .unwrap();
    let matched = route
        .match_url("/forum/topic/stats.html", &get("/"))
        .unwrap();

    assert_eq!(matched.module(), "forum");
    assert_eq!(matched.controller(), "topic");
    assert_eq!(matched.action(), "stats");
    assert_eq!(matched.ext(), "html");
}

#[test]
fn test_numeric_token_with_defaults_scenario() {
    let route = Route::new(
        "/blog/[id]",
        params! { "module" => "blog", "controller" => "api", "action" => "read" },
    )
    .compile()
    .unwrap();
    let matched = route.match_url("/blog/123456", &get("/")).unwrap();

    assert_eq!(matched.get("id"), Some("123456"));
    assert_eq!(matched.module(), "blog");
    assert_eq!(matched.controller(), "api");
    assert_eq!(matched.action(), "read");
}

// ============================================================================
// Optional Tokens
// ============================================================================

#[rstest]
#[case("/users/1", true)]
#[case("/users/", true)]
#[case("/users", true)]
#[case("/users//", false)]
#[case("/users/abc", false)]
fn test_optional_token_boundary(#[case] url: &str, #[case] expected: bool) {
    let route = Route::new("/users/[id?]", params! {}).compile().unwrap();
    assert_eq!(route.is_match(url, &get(url)), expected);
}

// ============================================================================
// Method and TLS Gating
// ============================================================================

#[test]
fn test_method_gate_rejects_exact_path() {
    let mut router = Router::new();
    router.post("login", Route::new("/login", params! {})).unwrap();

    let err = router.match_url("/login", &get("/login")).unwrap_err();
    assert_eq!(err, RouteError::NoMatch { url: "/login".to_string() });

    let ctx = RequestContext::new("post", "/login");
    assert_eq!(router.match_url("/login", &ctx).unwrap().key(), Some("login"));
}

#[rstest]
#[case("POST", false, false)]
#[case("POST", true, true)]
#[case("GET", true, false)]
#[case("GET", false, false)]
fn test_secure_post_root_scenario(#[case] method: &str, #[case] secure: bool, #[case] expected: bool) {
    let route = Route::new("/", params! {})
        .with_method("POST")
        .secure(true)
        .compile()
        .unwrap();

    let ctx = RequestContext::new(method, "/").with_secure(secure);
    assert_eq!(route.is_match("/", &ctx), expected);
}

// ============================================================================
// Registration Order
// ============================================================================

#[rstest]
#[case::loop_matcher(Box::new(LoopMatcher) as Box<dyn Matcher>)]
#[case::static_matcher(Box::new(StaticMatcher) as Box<dyn Matcher>)]
fn test_first_registered_wins(#[case] matcher: Box<dyn Matcher>) {
    let mut router = Router::new().with_matcher(matcher);
    router.map("numeric", Route::new("/users/[id]", params! {})).unwrap();
    router.map("wildcard", Route::new("/users/(rest)", params! {})).unwrap();
    router.map("exact", Route::new("/users/5", params! {})).unwrap();

    let matched = router.match_url("/users/5", &get("/users/5")).unwrap();
    assert_eq!(matched.key(), Some("numeric"));

    let matched = router.match_url("/users/me", &get("/users/me")).unwrap();
    assert_eq!(matched.key(), Some("wildcard"));
}

#[test]
fn test_remap_keeps_registration_position() {
    let mut router = Router::new();
    router.map("first", Route::new("/(any)", params! {})).unwrap();
    router.map("second", Route::new("/about", params! {})).unwrap();
    router.map("first", Route::new("/blog/(any)", params! {})).unwrap();

    let keys: Vec<&str> = router.routes().keys().collect();
    assert_eq!(keys, vec!["first", "second"]);
    assert_eq!(router.match_url("/about", &get("/")).unwrap().key(), Some("second"));
}

#[test]
fn test_match_request_strips_base() {
    let mut router = Router::new().with_base("/shop");
    router.get("cart", Route::new("/cart", params! {})).unwrap();

    let matched = router.match_request(&get("/shop/cart")).unwrap();
    assert_eq!(matched.key(), Some("cart"));
    assert_eq!(matched.url(), "/cart");
}

// ============================================================================
// Groups and Resources
// ============================================================================

#[test]
fn test_nested_groups() {
    let mut router = Router::new();
    router.filter("auth", |_, _| {}).unwrap();
    router.filter("audit", |_, _| {}).unwrap();

    router
        .group(
            GroupOptions::new().prefix("/a").pass(["id"]).filter("auth"),
            |r| {
                r.group(
                    GroupOptions::new().prefix("/b").pass(["slug"]).filter("audit"),
                    |r| r.map("nested", Route::new("/[id]/{slug}", params! {})),
                )
            },
        )
        .unwrap();

    let route = router.route("nested").unwrap();
    assert_eq!(route.path(), "/a/b/[id]/{slug}");
    assert_eq!(route.pass(), &["id".to_string(), "slug".to_string()]);
    assert_eq!(route.filters(), &["auth".to_string(), "audit".to_string()]);

    let matched = router.match_url("/a/b/7/post", &get("/")).unwrap();
    assert_eq!(matched.args(), &[Param::from("7"), Param::from("post")]);
}

#[test]
fn test_group_suffix_and_secure() {
    let mut router = Router::new();
    router
        .group(GroupOptions::new().suffix("/feed").secure(true), |r| {
            r.get("news", Route::new("/news", params! {}))
        })
        .unwrap();
    router.get("outside", Route::new("/outside", params! {})).unwrap();

    let route = router.route("news").unwrap();
    assert_eq!(route.path(), "/news/feed");
    assert!(route.is_secure());
    assert!(!router.route("outside").unwrap().is_secure());
}

#[test]
fn test_resource_expansion() {
    let mut router = Router::new();
    router
        .resource(
            "users",
            Route::new("/users", params! { "controller" => "users" }),
            ResourceMap::default(),
        )
        .unwrap();

    let read = router
        .match_url("/users/15", &get("/users/15"))
        .unwrap();
    assert_eq!(read.key(), Some("users.read"));
    assert_eq!(read.action(), "read");
    assert_eq!(read.args(), &[Param::from("15")]);

    let create = router
        .match_url("/users", &RequestContext::new("POST", "/users"))
        .unwrap();
    assert_eq!(create.key(), Some("users.create"));

    let update = router
        .match_url("/users/15", &RequestContext::new("PUT", "/users/15"))
        .unwrap();
    assert_eq!(update.key(), Some("users.update"));

    let delete = router
        .match_url("/users/15", &RequestContext::new("DELETE", "/users/15"))
        .unwrap();
    assert_eq!(delete.key(), Some("users.delete"));

    assert_eq!(router.match_url("/users", &get("/users")).unwrap().action(), "index");
}

// ============================================================================
// Filters and Listeners
// ============================================================================

#[test]
fn test_filters_run_in_order_after_match() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();

    for name in ["first", "second"] {
        let calls = Arc::clone(&calls);
        router
            .filter(name, move |_, matched| {
                calls
                    .lock()
                    .unwrap()
                    .push(format!("{}:{}", name, matched.key().unwrap_or_default()));
            })
            .unwrap();
    }

    router
        .get(
            "home",
            Route::new("/", params! {}).with_filters(["second", "first"]),
        )
        .unwrap();

    router.match_url("/", &get("/")).unwrap();
    assert_eq!(*calls.lock().unwrap(), vec!["second:home", "first:home"]);
}

#[test]
fn test_missing_filter() {
    let mut router = Router::new();
    router
        .get("home", Route::new("/", params! {}).with_filter("auth"))
        .unwrap();

    let err = router.match_url("/", &get("/")).unwrap_err();
    assert_eq!(err, RouteError::MissingFilter("auth".to_string()));
}

#[test]
fn test_match_listeners() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    router.get("home", Route::new("/", params! {})).unwrap();

    let pre = Arc::clone(&events);
    router.on_pre_match(move |_, url| pre.lock().unwrap().push(format!("pre {}", url)));
    let post = Arc::clone(&events);
    router.on_post_match(move |_, m| {
        post.lock()
            .unwrap()
            .push(format!("post {}", m.key().unwrap_or_default()))
    });

    router.match_url("/", &get("/")).unwrap();
    let _ = router.match_url("/missing", &get("/missing"));

    assert_eq!(
        *events.lock().unwrap(),
        vec!["pre /", "post home", "pre /missing"]
    );
}

#[test]
fn test_missing_route_lookup() {
    let router = Router::new();
    assert_eq!(
        router.route("nope").unwrap_err(),
        RouteError::MissingRoute("nope".to_string())
    );
}
