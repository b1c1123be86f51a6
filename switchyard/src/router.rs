//! Top-level router: loads the routing configuration once and resolves
//! incoming hosts to their [`Domain`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::domain::Domain;
use crate::error::Error;
use crate::load::process_routes_config;
use crate::method::Method;
use crate::request::Request;

const WILDCARD_SUBDOMAIN_PREFIX: &str = "*.";

/// Host application context.
///
/// The router reads the application config for `server.port` and an
/// optional `routes { … }` override subtree, and uses the declared
/// auth scheme names to sanity-check route configuration. It resolves
/// nothing else from the host.
#[derive(Debug, Default)]
pub struct App {
    config: Config,
    auth_schemes: Vec<String>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            auth_schemes: Vec::new(),
        }
    }

    /// Declare the auth scheme names the application registered.
    pub fn with_auth_schemes(mut self, schemes: impl IntoIterator<Item = impl ToString>) -> Self {
        self.auth_schemes = schemes.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth_schemes(&self) -> &[String] {
        &self.auth_schemes
    }
}

/// All registered domains and their routes.
///
/// Built once by [`Router::load`]; read-only afterwards, so lookups
/// need no locking.
#[derive(Debug)]
pub struct Router {
    domains: HashMap<String, Domain>,
    config_path: PathBuf,
}

impl Router {
    /// Load a routing configuration, e.g. `routes.toml`.
    ///
    /// When the application config carries a `routes { … }` subtree,
    /// it is merged over the loaded document before processing.
    /// Loading is all-or-nothing: any error leaves no router behind.
    pub fn load(app: Option<&App>, config_path: impl AsRef<Path>) -> Result<Router, Error> {
        let app = app.ok_or(Error::InvalidApp)?;

        let path = config_path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigurationNotFound(path.display().to_string()));
        }

        let mut config = Config::load_file(path)?;

        if let Some(overrides) = app.config().sub("routes") {
            debug!("application routes {{...}} override values found, applying them");
            config.merge(&overrides);
        }

        let router = Router {
            domains: process_routes_config(&mut config, app)?,
            config_path: path.to_path_buf(),
        };
        router.log_routes();

        Ok(router)
    }

    /// Domain for an incoming request, by its `Host` header.
    pub fn find_domain(&self, req: &Request) -> Option<&Domain> {
        self.find_domain_by_host(req.host())
    }

    /// Exact host match first, e.g. `admin.sample.com:8080`; failing
    /// that, a wildcard match, e.g. `*.sample.com:8080` for
    /// `user1.sample.com:8080`.
    pub fn find_domain_by_host(&self, host: &str) -> Option<&Domain> {
        let host = host.to_lowercase();

        if let Some(domain) = self.domains.get(&host) {
            return Some(domain);
        }

        match host.find('.') {
            Some(idx) if idx > 0 => self
                .domains
                .get(&format!("{}{}", WILDCARD_SUBDOMAIN_PREFIX, &host[idx + 1..])),
            _ => None,
        }
    }

    /// The first domain not flagged as a subdomain.
    pub fn root_domain(&self) -> Option<&Domain> {
        self.domains.values().find(|d| !d.is_subdomain)
    }

    /// All domain keys (`host` or `host:port`).
    pub fn domain_addresses(&self) -> Vec<String> {
        self.domains.keys().cloned().collect()
    }

    /// Every target and its actions across all domains, excluding
    /// static routes. The host framework uses this to check that the
    /// declared handlers actually exist.
    pub fn registered_actions(&self) -> HashMap<String, HashSet<String>> {
        self.collect_actions(|route| !route.is_static)
    }

    /// Like [`Router::registered_actions`], restricted to WebSocket
    /// routes.
    pub fn registered_ws_actions(&self) -> HashMap<String, HashSet<String>> {
        self.collect_actions(|route| route.method == Method::Ws)
    }

    /// Path the configuration was loaded from; diagnostics only.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn collect_actions(
        &self,
        keep: impl Fn(&crate::route::Route) -> bool,
    ) -> HashMap<String, HashSet<String>> {
        let mut targets: HashMap<String, HashSet<String>> = HashMap::new();

        for domain in self.domains.values() {
            for route in domain.routes().values() {
                if keep(route) {
                    targets
                        .entry(route.target.clone())
                        .or_default()
                        .insert(route.action.clone());
                }
            }
        }

        targets
    }

    fn log_routes(&self) {
        for domain in self.domains.values() {
            for route in domain.routes().values() {
                debug!(
                    ">> {} {} {} => {}.{}",
                    domain.key, route.method, route.path, route.target, route.action
                );
            }
        }
    }
}
