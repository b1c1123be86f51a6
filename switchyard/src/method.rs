//! HTTP methods, including the `WS` pseudo-verb used by WebSocket
//! upgrade routes.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// HTTP method, e.g. GET, POST, etc.
///
/// `Ws` is not a real HTTP verb; it keys the routing tree that holds
/// WebSocket upgrade routes. `Other` carries any method we don't have
/// a name for, including the empty string.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub enum Method {
    /// `GET` request.
    #[default]
    Get,
    /// `POST` request.
    Post,
    /// `PUT` request.
    Put,
    /// `PATCH` request.
    Patch,
    /// `DELETE` request.
    Delete,
    /// `HEAD` request.
    Head,
    /// `OPTIONS` request.
    Options,
    /// `TRACE` request.
    Trace,
    /// WebSocket upgrade pseudo-method.
    Ws,
    /// Some other request we don't have a name for.
    Other(String),
}

/// Default controller action name for each HTTP method, used when the
/// route configuration does not provide one.
static DEFAULT_ACTIONS: Lazy<HashMap<Method, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Method::Get, "Index"),
        (Method::Post, "Create"),
        (Method::Put, "Update"),
        (Method::Patch, "Update"),
        (Method::Delete, "Delete"),
        (Method::Options, "Options"),
        (Method::Head, "Head"),
        (Method::Trace, "Trace"),
    ])
});

impl Method {
    /// The default action name for this method, if it has one.
    ///
    /// WebSocket routes and unnamed methods have no default; their
    /// action must be configured explicitly.
    pub fn default_action(&self) -> Option<&'static str> {
        DEFAULT_ACTIONS.get(self).copied()
    }

    /// True if the method carries no name at all. An empty method can
    /// only come from an explicit `method = ""` in the configuration.
    pub fn is_empty(&self) -> bool {
        matches!(self, Method::Other(name) if name.is_empty())
    }
}

/// True if the given action name is one the router assigns by default
/// in absence of a configured route action name.
pub fn is_default_action(action: &str) -> bool {
    DEFAULT_ACTIONS.values().any(|a| *a == action)
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "TRACE" => Method::Trace,
            "WS" => Method::Ws,
            other => Method::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Ws => "WS",
            Method::Other(other) => other.as_str(),
        };

        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Method::from("get"), Method::Get);
        assert_eq!(Method::from("POST"), Method::Post);
        assert_eq!(Method::from("ws"), Method::Ws);
        assert_eq!(Method::from("BREW"), Method::Other("BREW".into()));
        assert!(Method::from("").is_empty());
        assert!(!Method::Get.is_empty());
    }

    #[test]
    fn test_default_actions() {
        assert_eq!(Method::Get.default_action(), Some("Index"));
        assert_eq!(Method::Patch.default_action(), Some("Update"));
        assert_eq!(Method::Ws.default_action(), None);

        assert!(is_default_action("Index"));
        assert!(is_default_action("Head"));
        assert!(!is_default_action("Show"));
    }
}
