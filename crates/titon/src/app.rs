// File: src/app.rs
// Purpose: Build a Router from configuration

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use titon_router::param::parse_shorthand;
use titon_router::{matcher_for, Param, Params, ResourceAction, ResourceMap, Route, Router};
use tracing::{debug, info};

use crate::config::{ActionDefinition, Config, ResourceDefinition, RouteDefinition};

/// A configured application: its settings and the router built from them
#[derive(Debug)]
pub struct App {
    config: Config,
    router: Router,
}

impl App {
    /// Build the router described by `config`
    ///
    /// Routes are registered in file order, then resources. Registration
    /// order is matching order.
    pub fn from_config(config: &Config) -> Result<Self> {
        let routing = &config.routing;
        let mut router = Router::new();

        if let Some(base) = &routing.base_path {
            router.set_base(base);
        }

        let matcher = matcher_for(&routing.matcher).ok_or_else(|| {
            anyhow!(
                "Unknown matcher {:?} (expected \"loop\" or \"static\")",
                routing.matcher
            )
        })?;
        router.set_matcher(matcher);

        for (name, pattern) in &routing.patterns {
            router.add_pattern(name, pattern);
        }

        for definition in &routing.routes {
            let route = route_from_definition(definition)
                .with_context(|| format!("Invalid route {:?}", definition.key))?;
            router
                .map(&definition.key, route)
                .with_context(|| format!("Failed to register route {:?}", definition.key))?;
        }

        for definition in &routing.resources {
            let (route, map) = resource_from_definition(definition)
                .with_context(|| format!("Invalid resource {:?}", definition.key))?;
            router
                .resource(&definition.key, route, map)
                .with_context(|| format!("Failed to register resource {:?}", definition.key))?;
        }

        info!(
            routes = router.routes().len(),
            matcher = router.matcher_name(),
            base = router.base(),
            "route table loaded"
        );

        Ok(Self {
            config: config.clone(),
            router,
        })
    }

    /// Load titon.toml (or any config file) and build the app
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::load(path)?;
        Self::from_config(&config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mutable access, for declaring filters and listeners in code
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

fn route_from_definition(definition: &RouteDefinition) -> Result<Route> {
    let mut route = match &definition.action {
        Some(ActionDefinition::Shorthand(action)) => Route::action(&definition.path, action)?,
        Some(ActionDefinition::Params(table)) => Route::new(
            &definition.path,
            table
                .iter()
                .map(|(key, value)| (key.clone(), param_from_toml(value)))
                .collect(),
        ),
        None => Route::new(&definition.path, Params::new()),
    };

    route = route
        .with_methods(&definition.method)
        .secure(definition.secure)
        .with_pass(definition.pass.iter().cloned())
        .with_filters(definition.filters.iter().cloned())
        .with_patterns(definition.patterns.clone());

    if let Some(locale) = &definition.locale {
        route = route.with_locale(locale);
    }

    debug!(key = %definition.key, path = %definition.path, "loaded route definition");
    Ok(route)
}

fn resource_from_definition(definition: &ResourceDefinition) -> Result<(Route, ResourceMap)> {
    let params = parse_shorthand(&definition.action).ok_or_else(|| {
        anyhow!(
            "Resource action {:?} is not in Module\\Controller@action form",
            definition.action
        )
    })?;

    let mut map = ResourceMap::default();
    for (name, action) in &definition.actions {
        let kind = ResourceAction::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name.as_str())
            .ok_or_else(|| anyhow!("Unknown resource action {:?}", name))?;
        map = map.with(kind, action);
    }

    Ok((Route::new(&definition.path, params), map))
}

/// Converts a TOML value into a route param
fn param_from_toml(value: &toml::Value) -> Param {
    match value {
        toml::Value::String(s) => Param::Str(s.clone()),
        toml::Value::Integer(n) => Param::Str(n.to_string()),
        toml::Value::Float(n) => Param::Str(n.to_string()),
        toml::Value::Boolean(b) => Param::Str(b.to_string()),
        toml::Value::Datetime(d) => Param::Str(d.to_string()),
        toml::Value::Array(items) => Param::List(items.iter().map(param_from_toml).collect()),
        toml::Value::Table(table) => Param::Map(
            table
                .iter()
                .map(|(key, value)| (key.clone(), param_from_toml(value)))
                .collect(),
        ),
    }
}
