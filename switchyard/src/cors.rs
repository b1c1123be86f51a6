//! Resolved CORS policies.
//!
//! The router composes policies hierarchically (domain base, route
//! overrides) and attaches the result to each route. Enforcement is
//! the host server's job.

use serde::Serialize;

use crate::config::Config;

const ALL_ORIGINS: &str = "*";

/// CORS policy attached to a domain or route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cors {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub allow_credentials: bool,
    /// `Access-Control-Max-Age` value, as configured. Empty when unset.
    pub max_age: String,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_origins: vec![ALL_ORIGINS.to_string()],
            allow_methods: vec!["GET".to_string(), "POST".to_string(), "HEAD".to_string()],
            allow_headers: vec![
                "Origin".to_string(),
                "Accept".to_string(),
                "Content-Type".to_string(),
                "Authorization".to_string(),
            ],
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: String::new(),
        }
    }
}

impl Cors {
    /// Domain-level base policy from a `cors { … }` subtree.
    pub(crate) fn from_config(config: &Config) -> Cors {
        Self::compose(config, &Cors::default())
    }

    /// Route-level policy: configured keys override the base, absent
    /// keys inherit it.
    pub(crate) fn from_config_with(config: &Config, base: Option<&Cors>) -> Cors {
        let default = Cors::default();
        Self::compose(config, base.unwrap_or(&default))
    }

    fn compose(config: &Config, base: &Cors) -> Cors {
        Cors {
            allow_origins: list(config, "allow_origins", &base.allow_origins),
            allow_methods: list(config, "allow_methods", &base.allow_methods)
                .iter()
                .map(|m| m.to_uppercase())
                .collect(),
            allow_headers: list(config, "allow_headers", &base.allow_headers),
            expose_headers: list(config, "expose_headers", &base.expose_headers),
            allow_credentials: config.bool_default("allow_credentials", base.allow_credentials),
            max_age: config.string_default("max_age", &base.max_age),
        }
    }

    /// True when any origin is admitted.
    pub fn allows_all_origins(&self) -> bool {
        self.allow_origins.iter().any(|o| o == ALL_ORIGINS)
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allows_all_origins() || self.allow_origins.iter().any(|o| o == origin)
    }
}

fn list(config: &Config, key: &str, inherited: &[String]) -> Vec<String> {
    match config.string_list(key) {
        Some(values) => values.iter().map(|v| v.trim().to_string()).collect(),
        None => inherited.to_vec(),
    }
}
