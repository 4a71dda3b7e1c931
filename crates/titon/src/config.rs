// File: src/config.rs
// Purpose: Configuration parsing from titon.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base path for all routes (e.g., "/app")
    #[serde(default)]
    pub base_path: Option<String>,

    /// Matching strategy: "loop" or "static" (default: "loop")
    #[serde(default = "default_matcher")]
    pub matcher: String,

    /// Patterns available to every route, e.g. `slug = "([a-z0-9-]+)"`
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,

    #[serde(default)]
    pub routes: Vec<RouteDefinition>,

    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

/// A `[[routing.routes]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteDefinition {
    pub key: String,

    pub path: String,

    /// `Module\Controller@action.ext`, or a table of default params
    #[serde(default)]
    pub action: Option<ActionDefinition>,

    /// Allowed HTTP methods (empty = any)
    #[serde(default)]
    pub method: Vec<String>,

    #[serde(default = "default_false")]
    pub secure: bool,

    #[serde(default)]
    pub pass: Vec<String>,

    #[serde(default)]
    pub filters: Vec<String>,

    #[serde(default)]
    pub patterns: BTreeMap<String, String>,

    #[serde(default)]
    pub locale: Option<String>,
}

/// Route target: shorthand string or explicit params
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ActionDefinition {
    Shorthand(String),
    Params(BTreeMap<String, toml::Value>),
}

/// A `[[routing.resources]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDefinition {
    pub key: String,

    pub path: String,

    /// `Module\Controller@action` naming the resource controller
    pub action: String,

    /// Controller action per resource action, e.g. `read = "show"`
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level used when RUST_LOG is not set (default: "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Colored output (default: true)
    #[serde(default = "default_true")]
    pub ansi: bool,
}

// Default values
fn default_matcher() -> String {
    "loop".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

// Default implementations
impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            matcher: default_matcher(),
            patterns: BTreeMap::new(),
            routes: Vec::new(),
            resources: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from titon.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from default path (./titon.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("titon.toml")
    }
}
