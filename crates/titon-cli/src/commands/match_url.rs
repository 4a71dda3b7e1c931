use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use titon::{App, Config, RequestContext};
use tracing::debug;

use super::{display_param, param_to_json};

pub fn execute(config: &Config, method: &str, url: &str, secure: bool, as_json: bool) -> Result<()> {
    let mut app = App::from_config(config)?;
    declare_filters(&mut app)?;

    let ctx = RequestContext::new(method, url).with_secure(secure);
    debug!(method = %ctx.method, url, secure, "matching request");
    let matched = app
        .router()
        .match_request(&ctx)
        .with_context(|| format!("{} {}", ctx.method, url))?;

    if as_json {
        let params: serde_json::Map<String, serde_json::Value> = matched
            .params()
            .iter()
            .map(|(key, value)| (key.clone(), param_to_json(value)))
            .collect();
        let value = json!({
            "key": matched.key(),
            "url": matched.url(),
            "params": params,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "✓ Matched".green().bold(),
        matched.key().unwrap_or_default().cyan()
    );
    println!("  path:     {}", matched.route().path());
    println!("  compiled: {}", matched.route().compiled().dimmed());
    println!();

    for (key, value) in matched.params() {
        println!("  {:<12} {}", key, display_param(value));
    }

    Ok(())
}

/// Filters only exist in application code; stand in for them so the
/// lifecycle can complete, reporting each one as it runs
fn declare_filters(app: &mut App) -> Result<()> {
    let names: Vec<String> = app
        .router()
        .routes()
        .iter()
        .flat_map(|(_, route)| route.filters().iter().cloned())
        .collect();

    let router = app.router_mut();
    for name in names {
        if router.has_filter(&name) {
            continue;
        }
        debug!(filter = %name, "declaring stand-in filter");
        let label = name.clone();
        router.filter(name, move |_, _| {
            println!("  {} filter {}", "→".blue(), label.cyan());
        })?;
    }

    Ok(())
}
