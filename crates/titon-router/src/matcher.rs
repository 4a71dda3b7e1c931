//! Route table and matching strategies
//!
//! Every [`Matcher`] makes the same guarantee: when several routes match a
//! URL, the one registered first wins. Applications rely on this to declare
//! specific routes ahead of generic fallbacks.

use std::collections::HashMap;

use tracing::trace;

use crate::context::RequestContext;
use crate::path::static_key;
use crate::route::{CompiledRoute, RouteMatch};

/// Insertion-ordered collection of compiled routes keyed by name
///
/// Re-inserting an existing key replaces the route but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(String, CompiledRoute)>,
    index: HashMap<String, usize>,
    statics: HashMap<String, Vec<usize>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the route stored under `key`
    pub fn insert(&mut self, key: impl Into<String>, route: CompiledRoute) {
        let key = key.into();

        let existing = self.index.get(&key).copied();
        let position = match existing {
            Some(pos) => {
                self.unindex_static(pos);
                self.entries[pos].1 = route;
                pos
            }
            None => {
                self.entries.push((key.clone(), route));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let route = &self.entries[position].1;
        if is_indexable(route) {
            let slot = self.statics.entry(static_key(route.path())).or_default();
            slot.push(position);
            slot.sort_unstable();
        }
    }

    fn unindex_static(&mut self, position: usize) {
        let route = &self.entries[position].1;
        if !is_indexable(route) {
            return;
        }
        if let Some(slot) = self.statics.get_mut(&static_key(route.path())) {
            slot.retain(|&p| p != position);
        }
    }

    pub fn get(&self, key: &str) -> Option<&CompiledRoute> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Route and key at a registration position
    pub fn entry(&self, position: usize) -> Option<(&str, &CompiledRoute)> {
        self.entries
            .get(position)
            .map(|(key, route)| (key.as_str(), route))
    }

    /// Routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompiledRoute)> {
        self.entries.iter().map(|(key, route)| (key.as_str(), route))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positions of indexed static routes whose path equals `url` (ignoring
    /// ASCII case and one trailing slash), in registration order
    ///
    /// Always empty for non-ASCII URLs.
    pub fn static_candidates(&self, url: &str) -> &[usize] {
        if !url.is_ascii() {
            return &[];
        }
        self.statics
            .get(&static_key(url))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Whether a route can be found through the static index
///
/// The index key agrees with the compiled `PATH/?` expression only for
/// non-root ASCII paths without a trailing slash. Any other static route
/// is scanned like a dynamic one.
fn is_indexable(route: &CompiledRoute) -> bool {
    let path = route.path();
    route.is_static() && path.is_ascii() && path != "/" && !path.ends_with('/')
}

/// Strategy that finds the route for a URL
pub trait Matcher: Send + Sync {
    /// Returns the first-registered route matching `url`, if any
    fn match_route<'r>(
        &self,
        url: &str,
        ctx: &RequestContext,
        routes: &'r RouteTable,
    ) -> Option<RouteMatch<'r>>;

    /// Strategy name, for diagnostics
    fn name(&self) -> &'static str;
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn match_route<'r>(
        &self,
        url: &str,
        ctx: &RequestContext,
        routes: &'r RouteTable,
    ) -> Option<RouteMatch<'r>> {
        (**self).match_route(url, ctx, routes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Tries every route in registration order
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopMatcher;

impl Matcher for LoopMatcher {
    fn match_route<'r>(
        &self,
        url: &str,
        ctx: &RequestContext,
        routes: &'r RouteTable,
    ) -> Option<RouteMatch<'r>> {
        routes.iter().find_map(|(key, route)| {
            trace!(key, compiled = route.compiled(), "trying route");
            route.match_url(url, ctx).map(|m| m.with_key(key))
        })
    }

    fn name(&self) -> &'static str {
        "loop"
    }
}

/// Looks static routes up by path, then scans only the unindexed routes
/// registered before the static hit
///
/// Gives the same answer as [`LoopMatcher`]: an indexed route can only match
/// URLs equal to its path, so any earlier indexed route that could match is
/// among the candidates. Non-ASCII URLs, which case folding could map onto
/// an ASCII path, fall back to a full scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMatcher;

impl Matcher for StaticMatcher {
    fn match_route<'r>(
        &self,
        url: &str,
        ctx: &RequestContext,
        routes: &'r RouteTable,
    ) -> Option<RouteMatch<'r>> {
        if !url.is_ascii() {
            return LoopMatcher.match_route(url, ctx, routes);
        }

        let static_hit = routes.static_candidates(url).iter().find_map(|&pos| {
            let (key, route) = routes.entry(pos)?;
            route.match_url(url, ctx).map(|m| (pos, m.with_key(key)))
        });

        let limit = static_hit
            .as_ref()
            .map(|(pos, _)| *pos)
            .unwrap_or_else(|| routes.len());

        let dynamic_hit = routes
            .iter()
            .take(limit)
            .filter(|(_, route)| !is_indexable(route))
            .find_map(|(key, route)| {
                trace!(key, compiled = route.compiled(), "trying route");
                route.match_url(url, ctx).map(|m| m.with_key(key))
            });

        dynamic_hit.or_else(|| static_hit.map(|(_, m)| m))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Matcher for a strategy name (`"loop"` or `"static"`)
pub fn matcher_for(name: &str) -> Option<Box<dyn Matcher>> {
    match name {
        "loop" => Some(Box::new(LoopMatcher)),
        "static" => Some(Box::new(StaticMatcher)),
        _ => None,
    }
}
