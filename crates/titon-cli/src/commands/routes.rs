use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use titon::titon_router::CompiledRoute;
use titon::{App, Config};

pub fn execute(config: &Config, as_json: bool) -> Result<()> {
    let app = App::from_config(config)?;
    let router = app.router();

    if as_json {
        let routes: Vec<serde_json::Value> = router
            .routes()
            .iter()
            .map(|(key, route)| route_json(key, route))
            .collect();
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    if router.routes().is_empty() {
        println!("{}", "⚠ No routes configured".yellow());
        return Ok(());
    }

    println!(
        "{} {} (base {}, {} matcher)",
        router.routes().len().to_string().green().bold(),
        "routes".green().bold(),
        router.base().cyan(),
        router.matcher_name()
    );
    println!();

    for (key, route) in router.routes().iter() {
        println!(
            "  {:<24} {:<16} {}",
            key.cyan(),
            methods_label(route),
            route.path()
        );

        let mut notes = Vec::new();
        if route.is_secure() {
            notes.push("secure".to_string());
        }
        if !route.filters().is_empty() {
            notes.push(format!("filters: {}", route.filters().join(", ")));
        }
        if !route.pass().is_empty() {
            notes.push(format!("pass: {}", route.pass().join(", ")));
        }
        if !notes.is_empty() {
            println!("  {:<24} {:<16} {}", "", "", notes.join("; ").dimmed());
        }
    }

    Ok(())
}

fn methods_label(route: &CompiledRoute) -> String {
    if route.methods().is_empty() {
        "ANY".to_string()
    } else {
        route.methods().join("|")
    }
}

fn route_json(key: &str, route: &CompiledRoute) -> serde_json::Value {
    json!({
        "key": key,
        "path": route.path(),
        "compiled": route.compiled(),
        "methods": route.methods(),
        "secure": route.is_secure(),
        "pass": route.pass(),
        "filters": route.filters(),
        "tokens": route.tokens().iter().map(|t| json!({
            "name": t.name,
            "optional": t.optional,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use titon::{params, Route};

    #[test]
    fn test_route_json() {
        let route = Route::new("/users/[id?]", params! {})
            .with_method("GET")
            .compile()
            .unwrap();
        let value = route_json("users", &route);

        assert_eq!(value["key"], "users");
        assert_eq!(value["compiled"], "/users(?:/([0-9.]+))?/?");
        assert_eq!(value["methods"], json!(["GET"]));
        assert_eq!(value["tokens"][0]["optional"], true);
    }

    #[test]
    fn test_methods_label() {
        let any = Route::new("/", params! {}).compile().unwrap();
        assert_eq!(methods_label(&any), "ANY");
    }
}
