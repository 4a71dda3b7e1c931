//! Path utilities for base paths, prefixes and suffixes
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Validates if a base path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use titon_router::path::is_canonical;
///
/// assert!(is_canonical("/"));
/// assert!(is_canonical("/app"));
///
/// assert!(!is_canonical(""));
/// assert!(!is_canonical("app")); // Missing leading /
/// assert!(!is_canonical("/app/")); // Trailing /
/// assert!(!is_canonical("/app//v1")); // Double //
/// ```
pub fn is_canonical(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a base path to canonical form
///
/// Returns `Cow::Borrowed` when input is already canonical.
///
/// ```
/// use titon_router::path::normalize_base;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_base("/app"), Cow::Borrowed("/app")));
/// assert_eq!(normalize_base("app/"), "/app");
/// assert_eq!(normalize_base("\\shop\\public"), "/shop/public");
/// assert_eq!(normalize_base(""), "/");
/// ```
pub fn normalize_base(path: &str) -> Cow<'_, str> {
    if is_canonical(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Prepends `prefix` to a route path
///
/// ```
/// use titon_router::path::prepend_path;
///
/// assert_eq!(prepend_path("/admin", "/users/[id]"), "/admin/users/[id]");
/// assert_eq!(prepend_path("admin/", "/"), "/admin");
/// assert_eq!(prepend_path("/", "/users"), "/users");
/// ```
pub fn prepend_path(prefix: &str, path: &str) -> String {
    join(prefix, path)
}

/// Appends `suffix` to a route path
///
/// ```
/// use titon_router::path::append_path;
///
/// assert_eq!(append_path("/users", "/(id)"), "/users/(id)");
/// assert_eq!(append_path("/", "feed"), "/feed");
/// ```
pub fn append_path(path: &str, suffix: &str) -> String {
    join(path, suffix)
}

fn join(head: &str, tail: &str) -> String {
    let head = head.trim_matches('/');
    let tail = tail.trim_matches('/');

    match (head.is_empty(), tail.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", tail),
        (false, true) => format!("/{}", head),
        (false, false) => format!("/{}/{}", head, tail),
    }
}

/// Key used to index static routes: one trailing slash dropped, ASCII lower-cased
///
/// Only meaningful for ASCII input, where it agrees with the case-insensitive
/// `PATH/?` expression a static route compiles to.
pub(crate) fn static_key(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    trimmed.to_ascii_lowercase()
}
