use anyhow::{bail, Context, Result};
use titon::titon_router::param::{is_shorthand, parse_shorthand};
use titon::{App, BuildTarget, Config, Param, Params};
use tracing::debug;

pub fn execute(config: &Config, target: &str, pairs: &[String]) -> Result<()> {
    let app = App::from_config(config)?;
    let router = app.router();

    let target = build_target(target, pairs, |key| router.has_route(key))?;
    debug!(?target, "building url");
    let url = router.build(target)?;

    println!("{}", url);
    Ok(())
}

/// Without params the target is passed through as-is. With params it must
/// name a route or be shorthand, and the params are merged in.
fn build_target(
    target: &str,
    pairs: &[String],
    has_route: impl Fn(&str) -> bool,
) -> Result<BuildTarget> {
    if pairs.is_empty() {
        return Ok(BuildTarget::from(target));
    }

    let mut params = if has_route(target) {
        let mut params = Params::new();
        params.insert("route".to_string(), Param::from(target));
        params
    } else if is_shorthand(target) {
        parse_shorthand(target).unwrap_or_default()
    } else {
        bail!(
            "{:?} is neither a route key nor Controller@action shorthand",
            target
        );
    };

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected key=value, got {:?}", pair))?;

        let value = if key == "args" {
            Param::from(value.split(',').collect::<Vec<_>>())
        } else {
            Param::from(value)
        };
        params.insert(key.to_string(), value);
    }

    Ok(BuildTarget::Params(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use titon::params;

    fn pairs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_plain_target() {
        let target = build_target("about", &[], |_| true).unwrap();
        assert_eq!(target, BuildTarget::from("about"));
    }

    #[test]
    fn test_route_key_with_params() {
        let target = build_target("blog.read", &pairs(&["id=5"]), |key| key == "blog.read").unwrap();
        assert_eq!(
            target,
            BuildTarget::Params(params! { "route" => "blog.read", "id" => "5" })
        );
    }

    #[test]
    fn test_shorthand_with_args() {
        let target = build_target("Users@edit", &pairs(&["args=5,6"]), |_| false).unwrap();
        assert_eq!(
            target,
            BuildTarget::Params(params! {
                "controller" => "Users",
                "action" => "edit",
                "args" => vec!["5", "6"],
            })
        );
    }

    #[test]
    fn test_rejects_unknown_target_with_params() {
        assert!(build_target("nope", &pairs(&["a=1"]), |_| false).is_err());
        assert!(build_target("blog", &pairs(&["novalue"]), |_| true).is_err());
    }
}
