//! # Titon Router
//!
//! A pattern-compiling URL router with:
//! - Typed tokens (`{alpha}`, `[numeric]`, `(wildcard)`, `<custom>`, `<inline:REGEX>`)
//! - Optional tokens (`/users/[id?]` matches `/users` and `/users/5`)
//! - Method and TLS constraints per route
//! - Nested route groups (prefix, suffix, patterns, pass, filters, secure)
//! - CRUD resource expansion
//! - Post-match filters and match listeners
//! - Reverse URL building from route keys, params or `Controller@action` shorthand
//!
//! ## Matching Order
//!
//! Routes are tried in the order they were registered and the first match
//! wins. Register specific routes before generic fallbacks.
//!
//! ## Build, Then Share
//!
//! A [`Route`] is a mutable definition. Mapping it into the [`Router`]
//! compiles it into an immutable [`CompiledRoute`]. Matching borrows the
//! router and returns a [`RouteMatch`] value, so nothing about a request is
//! ever stored on a route.
//!
//! ## Example
//!
//! ```
//! use titon_router::{params, RequestContext, Route, Router};
//!
//! let mut router = Router::new();
//! router.get("blog.read", Route::new("/blog/[id]/{slug?}", params! { "controller" => "blog", "action" => "read" })).unwrap();
//!
//! let ctx = RequestContext::new("GET", "/blog/42/hello-world");
//! let matched = router.match_request(&ctx).unwrap();
//!
//! assert_eq!(matched.controller(), "blog");
//! assert_eq!(matched.get("id"), Some("42"));
//! assert_eq!(matched.get("slug"), Some("hello-world"));
//!
//! assert_eq!(router.build(params! { "route" => "blog.read", "id" => 7 }).unwrap(), "/blog/7");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod context;
pub mod error;
pub mod matcher;
pub mod param;
pub mod path;
pub mod route;
pub mod router;

pub use context::{RequestContext, Segments};
pub use error::{Result, RouteError};
pub use matcher::{matcher_for, LoopMatcher, Matcher, RouteTable, StaticMatcher};
pub use param::{Param, Params};
pub use route::pattern::{CompiledPattern, Token, TokenKind};
pub use route::{CompiledRoute, Route, RouteConfig, RouteMatch};
pub use router::{BuildTarget, GroupOptions, ResourceAction, ResourceMap, Router};
