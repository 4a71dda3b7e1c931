pub mod build;
pub mod match_url;
pub mod routes;

use titon::titon_router::Param;

/// Renders a param for terminal output
pub(crate) fn display_param(value: &Param) -> String {
    match value {
        Param::Str(s) if s.is_empty() => "\"\"".to_string(),
        other => other.to_string(),
    }
}

/// Converts a param into JSON
pub(crate) fn param_to_json(value: &Param) -> serde_json::Value {
    match value {
        Param::Str(s) => serde_json::Value::String(s.clone()),
        Param::List(items) => serde_json::Value::Array(items.iter().map(param_to_json).collect()),
        Param::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), param_to_json(value)))
                .collect(),
        ),
    }
}
