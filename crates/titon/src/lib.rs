// Titon - configuration-driven routing
// Loads a route table from titon.toml and exposes it as a ready Router

pub mod app;
pub mod config;
pub mod telemetry;

pub use app::App;
pub use config::{
    ActionDefinition, Config, LoggingConfig, ResourceDefinition, RouteDefinition, RoutingConfig,
};

// Re-export the router so applications depend on one crate
pub use titon_router;
pub use titon_router::{
    params, BuildTarget, GroupOptions, Param, Params, RequestContext, Route, RouteError,
    RouteMatch, Router,
};
