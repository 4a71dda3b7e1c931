//! Route groups: scoped modifiers applied to every route registered inside

use std::collections::BTreeMap;

use crate::route::Route;

/// Modifiers applied to routes registered inside [`Router::group`](crate::Router::group)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOptions {
    /// Prepended to each route path
    pub prefix: Option<String>,
    /// Appended to each route path
    pub suffix: Option<String>,
    /// `Some(true)` makes every route secure
    pub secure: Option<bool>,
    /// Patterns added where the route does not define its own
    pub patterns: BTreeMap<String, String>,
    /// Token names added to each route's pass list
    pub pass: Vec<String>,
    /// Filters added to each route
    pub filters: Vec<String>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), pattern.into());
        self
    }

    pub fn pass<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.extend(filters.into_iter().map(Into::into));
        self
    }
}

/// Applies the open group frames (outermost first in `frames`) to a route
///
/// Frames are walked innermost first, so prefixes nest outer-to-inner
/// (`/outer/inner/path`) and suffixes mirror them (`path/inner/outer`).
/// Patterns only fill keys the route lacks, inner frames before outer.
/// Group pass and filter entries go ahead of the route's own, outer first.
pub(crate) fn apply_groups(route: &mut Route, frames: &[GroupOptions]) {
    for frame in frames.iter().rev() {
        if let Some(prefix) = &frame.prefix {
            route.prepend(prefix);
        }
        if let Some(suffix) = &frame.suffix {
            route.append(suffix);
        }
    }

    let config = route.config_mut();

    if frames.iter().any(|f| f.secure == Some(true)) {
        config.secure = true;
    }

    for frame in frames.iter().rev() {
        for (name, pattern) in &frame.patterns {
            config
                .patterns
                .entry(name.clone())
                .or_insert_with(|| pattern.clone());
        }
    }

    config.pass = merge_lists(frames.iter().map(|f| &f.pass), &config.pass);
    config.filters = merge_lists(frames.iter().map(|f| &f.filters), &config.filters);
}

/// Union of group lists followed by the route's own, first occurrence kept
fn merge_lists<'a>(
    groups: impl Iterator<Item = &'a Vec<String>>,
    own: &'a [String],
) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for item in groups.flatten().chain(own.iter()) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}
