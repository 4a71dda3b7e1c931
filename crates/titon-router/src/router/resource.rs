//! CRUD expansion for [`Router::resource`](crate::Router::resource)

use std::fmt;

use crate::route::Route;

/// The five actions a resource expands into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    List,
    Create,
    Read,
    Update,
    Delete,
}

impl ResourceAction {
    pub const ALL: [ResourceAction; 5] = [
        ResourceAction::List,
        ResourceAction::Create,
        ResourceAction::Read,
        ResourceAction::Update,
        ResourceAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::List => "list",
            ResourceAction::Create => "create",
            ResourceAction::Read => "read",
            ResourceAction::Update => "update",
            ResourceAction::Delete => "delete",
        }
    }

    /// Conventional HTTP methods for the action
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            ResourceAction::List | ResourceAction::Read => &["GET"],
            ResourceAction::Create => &["POST"],
            ResourceAction::Update => &["PUT", "POST"],
            ResourceAction::Delete => &["DELETE", "POST"],
        }
    }

    /// Whether the action addresses a single record (`/(id)`)
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            ResourceAction::Read | ResourceAction::Update | ResourceAction::Delete
        )
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller action name used for each resource action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMap {
    pub list: String,
    pub create: String,
    pub read: String,
    pub update: String,
    pub delete: String,
}

impl Default for ResourceMap {
    fn default() -> Self {
        Self {
            list: "index".to_string(),
            create: "create".to_string(),
            read: "read".to_string(),
            update: "update".to_string(),
            delete: "delete".to_string(),
        }
    }
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the controller action for one resource action
    pub fn with(mut self, action: ResourceAction, name: impl Into<String>) -> Self {
        let name = name.into();
        match action {
            ResourceAction::List => self.list = name,
            ResourceAction::Create => self.create = name,
            ResourceAction::Read => self.read = name,
            ResourceAction::Update => self.update = name,
            ResourceAction::Delete => self.delete = name,
        }
        self
    }

    pub fn action_for(&self, action: ResourceAction) -> &str {
        match action {
            ResourceAction::List => &self.list,
            ResourceAction::Create => &self.create,
            ResourceAction::Read => &self.read,
            ResourceAction::Update => &self.update,
            ResourceAction::Delete => &self.delete,
        }
    }
}

/// Clones `base` into the CRUD set, keyed `key.action`
pub(crate) fn expand(key: &str, base: &Route, map: &ResourceMap) -> Vec<(String, Route)> {
    ResourceAction::ALL
        .iter()
        .map(|&action| {
            let mut route = base
                .clone()
                .with_param("action", map.action_for(action));

            if action.is_member() {
                route.append("/(id)");
                route = route.with_pass(["id"]);
            }
            route.set_methods(action.methods());

            (format!("{}.{}", key, action), route)
        })
        .collect()
}
