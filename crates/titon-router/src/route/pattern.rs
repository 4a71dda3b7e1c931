//! Pattern compiler for route paths
//!
//! Turns a path template into an anchored, case-insensitive regular
//! expression plus the ordered list of tokens it captures. Four token
//! shapes are recognized, each optionally suffixed with `?`:
//!
//! | token          | matches                                  |
//! |----------------|------------------------------------------|
//! | `{name}`       | alphabetic: `[a-z_\-+]+`                 |
//! | `[name]`       | numeric: `[0-9.]+`                       |
//! | `(name)`       | wildcard: `.*`                           |
//! | `<name>`       | a pattern registered under `name`        |
//! | `<name:REGEX>` | `REGEX`, also registered under `name`    |
//!
//! Tokens are discovered left to right and that order is the order their
//! capture groups appear in the compiled expression.

use std::collections::BTreeMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, RouteError};

/// Alphabetic token fragment
pub const ALPHA: &str = r"([a-z_\-+]+)";
/// Numeric token fragment
pub const NUMERIC: &str = r"([0-9.]+)";
/// Wildcard token fragment
pub const WILDCARD: &str = r"(.*)";
/// Built-in `<locale>` fragment (`en`, `en-us`)
pub const LOCALE: &str = r"([a-z]{2}(?:-[a-z]{2})?)";

/// Shape of a token in the path template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{name}`
    Alpha,
    /// `[name]`
    Numeric,
    /// `(name)`
    Wildcard,
    /// `<name>` or `<name:REGEX>`
    Custom,
}

/// A named placeholder discovered during compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    pub optional: bool,
    pub kind: TokenKind,
    /// Byte range of the token (brackets included) within the path
    pub span: Range<usize>,
    /// Capture group the value is read from
    pub group: usize,
}

/// Output of [`compile`]
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Expression body, without anchors
    pub source: String,
    /// Anchored, case-insensitive matcher
    pub regex: Regex,
    pub tokens: Vec<Token>,
    /// Patterns declared inline with `<name:REGEX>`
    pub inline_patterns: Vec<(String, String)>,
}

impl CompiledPattern {
    /// A pattern without tokens
    pub fn is_static(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A token located by the scanner, before its fragment is resolved
struct RawToken<'a> {
    name: &'a str,
    optional: bool,
    kind: TokenKind,
    inline: Option<&'a str>,
    end: usize,
}

/// Compiles a path template against the route's custom patterns
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use titon_router::route::pattern::compile;
///
/// let compiled = compile("/users/[id?]", &BTreeMap::new()).unwrap();
/// assert_eq!(compiled.source, "/users(?:/([0-9.]+))?/?");
/// assert_eq!(compiled.tokens[0].name, "id");
/// assert!(compiled.tokens[0].optional);
/// ```
pub fn compile(path: &str, patterns: &BTreeMap<String, String>) -> Result<CompiledPattern> {
    let mut source = String::with_capacity(path.len() * 2);
    let mut literal = String::new();
    let mut tokens = Vec::new();
    let mut inline_patterns = Vec::new();
    let mut next_group = 1;
    let mut pos = 0;

    while pos < path.len() {
        let Some(raw) = scan_token(path, pos) else {
            let c = path[pos..].chars().next().unwrap_or_default();
            literal.push(c);
            pos += c.len_utf8().max(1);
            continue;
        };

        let fragment = match (raw.kind, raw.inline) {
            (TokenKind::Alpha, _) => ALPHA.to_string(),
            (TokenKind::Numeric, _) => NUMERIC.to_string(),
            (TokenKind::Wildcard, _) => WILDCARD.to_string(),
            (TokenKind::Custom, Some(inline)) => {
                let fragment = wrap_group(inline);
                inline_patterns.push((raw.name.to_string(), fragment.clone()));
                fragment
            }
            (TokenKind::Custom, None) => patterns
                .get(raw.name)
                .map(|p| wrap_group(p))
                .or_else(|| builtin_pattern(raw.name).map(str::to_string))
                .ok_or_else(|| RouteError::missing_pattern(path, raw.name))?,
        };

        let groups = count_groups(path, &fragment)?;

        if raw.optional {
            let swallow_slash = literal.ends_with('/');
            if swallow_slash {
                literal.pop();
            }
            source.push_str(&regex::escape(&literal));
            literal.clear();

            source.push_str("(?:");
            if swallow_slash {
                source.push('/');
            }
            source.push_str(&fragment);
            source.push_str(")?");
        } else {
            source.push_str(&regex::escape(&literal));
            literal.clear();
            source.push_str(&fragment);
        }

        tokens.push(Token {
            name: raw.name.to_string(),
            optional: raw.optional,
            kind: raw.kind,
            span: pos..raw.end,
            group: next_group,
        });

        next_group += groups;
        pos = raw.end;
    }

    source.push_str(&regex::escape(&literal));

    if path != "/" {
        source.push_str("/?");
    }

    let regex = RegexBuilder::new(&format!("^{}$", source))
        .case_insensitive(true)
        .build()
        .map_err(|e| RouteError::invalid_pattern(path, e))?;

    Ok(CompiledPattern {
        source,
        regex,
        tokens,
        inline_patterns,
    })
}

/// Patterns every route can reference without declaring them
pub fn builtin_pattern(name: &str) -> Option<&'static str> {
    match name {
        "locale" => Some(LOCALE),
        "alpha" => Some(ALPHA),
        "numeric" => Some(NUMERIC),
        "wildcard" => Some(WILDCARD),
        _ => None,
    }
}

/// Recognizes a token starting at `pos`
///
/// `<...>` is checked first so a custom expression may itself contain
/// bracket characters.
fn scan_token(path: &str, pos: usize) -> Option<RawToken<'_>> {
    let rest = &path[pos..];

    match *rest.as_bytes().first()? {
        b'<' => {
            let close = find_custom_end(rest)?;
            let inner = &rest[1..close];
            let (head, inline) = match inner.split_once(':') {
                Some((head, expr)) if !expr.is_empty() => (head, Some(expr)),
                Some(_) => return None,
                None => (inner, None),
            };
            let (name, optional) = split_optional(head)?;

            Some(RawToken {
                name,
                optional,
                kind: TokenKind::Custom,
                inline,
                end: pos + close + 1,
            })
        }
        open @ (b'{' | b'[' | b'(') => {
            let (closer, kind) = match open {
                b'{' => ('}', TokenKind::Alpha),
                b'[' => (']', TokenKind::Numeric),
                _ => (')', TokenKind::Wildcard),
            };
            let close = rest.find(closer)?;
            let (name, optional) = split_optional(&rest[1..close])?;

            Some(RawToken {
                name,
                optional,
                kind,
                inline: None,
                end: pos + close + 1,
            })
        }
        _ => None,
    }
}

/// Splits `name?` into `("name", true)`; rejects anything but word characters
fn split_optional(head: &str) -> Option<(&str, bool)> {
    let (name, optional) = match head.strip_suffix('?') {
        Some(name) => (name, true),
        None => (head, false),
    };

    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some((name, optional))
}

/// Index of the `>` closing a `<...>` token, skipping nested brackets and escapes
fn find_custom_end(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(i),
            '<' if depth == 0 => return None,
            _ => {}
        }
    }

    None
}

/// Ensures a fragment is one outer capturing group
fn wrap_group(fragment: &str) -> String {
    if is_wrapped_group(fragment) {
        fragment.to_string()
    } else {
        format!("({})", fragment)
    }
}

/// Whether the first `(` opens a plain capturing group closed by the last character
fn is_wrapped_group(fragment: &str) -> bool {
    if !fragment.starts_with('(') || fragment.starts_with("(?") || !fragment.ends_with(')') {
        return false;
    }

    let mut depth = 0usize;
    let mut escaped = false;
    let mut in_class = false;

    for (i, c) in fragment.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == fragment.len() - 1;
                }
            }
            _ => {}
        }
    }

    false
}

/// Number of capture groups a fragment contributes
fn count_groups(path: &str, fragment: &str) -> Result<usize> {
    let regex = Regex::new(fragment).map_err(|e| RouteError::invalid_pattern(path, e))?;
    Ok(regex.captures_len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_patterns() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_compile_static() {
        let compiled = compile("/about/team", &no_patterns()).unwrap();
        assert_eq!(compiled.source, "/about/team/?");
        assert!(compiled.is_static());
    }

    #[test]
    fn test_trailing_slash_in_template_is_kept() {
        let compiled = compile("/about/", &no_patterns()).unwrap();
        assert_eq!(compiled.source, "/about//?");
        assert!(!compiled.regex.is_match("/about"));
        assert!(compiled.regex.is_match("/about/"));
        assert!(compiled.regex.is_match("/about//"));
    }

    #[test]
    fn test_compile_root() {
        let compiled = compile("/", &no_patterns()).unwrap();
        assert_eq!(compiled.source, "/");
        assert!(compiled.regex.is_match("/"));
        assert!(!compiled.regex.is_match(""));
    }

    #[test]
    fn test_compile_escapes_dots() {
        let compiled = compile("/{action}.{ext}", &no_patterns()).unwrap();
        assert_eq!(compiled.source, r"/([a-z_\-+]+)\.([a-z_\-+]+)/?");
        assert!(!compiled.regex.is_match("/statsxhtml"));
    }

    #[test]
    fn test_compile_mixed_tokens_in_source_order() {
        let mut patterns = no_patterns();
        patterns.insert("regex".to_string(), "([a-z]{3})".to_string());

        let compiled = compile("/(wild)/{str}/<regex>/[id?]", &patterns).unwrap();
        let names: Vec<&str> = compiled.tokens.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["wild", "str", "regex", "id"]);
        assert_eq!(
            compiled.source,
            r"/(.*)/([a-z_\-+]+)/([a-z]{3})(?:/([0-9.]+))?/?"
        );
        assert_eq!(compiled.regex.captures_len() - 1, compiled.tokens.len());
    }

    #[test]
    fn test_compile_inline_pattern_is_registered() {
        let compiled = compile("/blog/<slug:([a-z-]+)>", &no_patterns()).unwrap();
        assert_eq!(
            compiled.inline_patterns,
            vec![("slug".to_string(), "([a-z-]+)".to_string())]
        );
        assert_eq!(compiled.tokens[0].kind, TokenKind::Custom);
    }

    #[test]
    fn test_compile_inline_pattern_with_brackets() {
        let compiled = compile(r"/archive/<year:\d{4}>/<month:([0-9]{2})>", &no_patterns()).unwrap();
        assert_eq!(compiled.tokens.len(), 2);
        assert_eq!(compiled.inline_patterns[0].1, r"(\d{4})");
        assert!(compiled.regex.is_match("/archive/2024/05"));
    }

    #[test]
    fn test_compile_unwrapped_pattern_is_wrapped() {
        assert_eq!(wrap_group("[0-9]+"), "([0-9]+)");
        assert_eq!(wrap_group("(a)|(b)"), "((a)|(b))");
        assert_eq!(wrap_group("(?:x)"), "((?:x))");
        assert_eq!(wrap_group("(a(b))"), "(a(b))");
        assert_eq!(wrap_group("([)])"), "([)])");
    }

    #[test]
    fn test_inner_groups_shift_later_tokens() {
        let compiled = compile("/<pair:((a)(b))>/[id]", &no_patterns()).unwrap();
        assert_eq!(compiled.tokens[0].group, 1);
        assert_eq!(compiled.tokens[1].group, 4);
    }

    #[test]
    fn test_missing_pattern() {
        let err = compile("/users/<uuid>", &no_patterns()).unwrap_err();
        assert_eq!(
            err,
            RouteError::MissingPattern {
                path: "/users/<uuid>".to_string(),
                token: "uuid".to_string(),
            }
        );
    }

    #[test]
    fn test_builtin_locale_pattern() {
        let compiled = compile("/<locale>/blog", &no_patterns()).unwrap();
        assert!(compiled.regex.is_match("/en-us/blog"));
        assert!(compiled.regex.is_match("/fr/blog"));
        assert!(!compiled.regex.is_match("/english/blog"));
    }

    #[test]
    fn test_invalid_inline_pattern() {
        let err = compile("/x/<bad:a{2,1}>", &no_patterns()).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_non_token_brackets_are_literal() {
        let compiled = compile("/docs/(v1.2)", &no_patterns()).unwrap();
        assert!(compiled.is_static());
        assert!(compiled.regex.is_match("/docs/(v1.2)"));
    }

    #[test]
    fn test_optional_without_slash() {
        let compiled = compile("/feed.{ext?}", &no_patterns()).unwrap();
        assert_eq!(compiled.source, r"/feed\.(?:([a-z_\-+]+))?/?");
    }

    #[test]
    fn test_token_spans() {
        let path = "/blog/[id]/{slug?}";
        let compiled = compile(path, &no_patterns()).unwrap();
        assert_eq!(&path[compiled.tokens[0].span.clone()], "[id]");
        assert_eq!(&path[compiled.tokens[1].span.clone()], "{slug?}");
    }
}
