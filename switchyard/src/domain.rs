//! A domain groups the routes served for one (host, port) pair: one
//! routing tree per HTTP method plus a by-name index for reverse URLs.

use std::collections::{BTreeMap, HashMap};

use tracing::error;

use crate::cors::Cors;
use crate::error::Error;
use crate::method::Method;
use crate::params::PathParams;
use crate::request::Request;
use crate::route::Route;
use crate::trie::{count_params, Tree};
use crate::url::encode_query;

/// Routes and behavior toggles for one domain.
///
/// Built by the configuration loader, immutable afterwards. All
/// request-time methods take `&self` and are safe to call from any
/// number of threads.
#[derive(Debug)]
pub struct Domain {
    /// Display name; defaults to the configuration key.
    pub name: String,
    /// Lowercased hostname; may begin with the wildcard prefix `*.`.
    pub host: String,
    /// Port, with `80` and `443` normalized to empty.
    pub port: String,
    /// Index key: `host` or `host:port`, lowercased.
    pub key: String,
    pub is_subdomain: bool,
    /// Answer 405 instead of falling through when the path exists
    /// under another method.
    pub method_not_allowed: bool,
    pub redirect_trailing_slash: bool,
    /// Synthesize `OPTIONS` replies from the routing tables.
    pub auto_options: bool,
    pub default_auth: String,
    pub cors_enabled: bool,
    pub cors: Option<Cors>,
    trees: HashMap<Method, Tree>,
    routes: HashMap<String, Route>,
}

impl Domain {
    pub fn new(host: impl ToString, port: impl ToString) -> Self {
        let mut domain = Self {
            name: host.to_string(),
            host: host.to_string().to_lowercase(),
            port: port.to_string(),
            key: String::new(),
            is_subdomain: false,
            method_not_allowed: true,
            redirect_trailing_slash: true,
            auto_options: true,
            default_auth: String::new(),
            cors_enabled: false,
            cors: None,
            trees: HashMap::new(),
            routes: HashMap::new(),
        };
        domain.infer_key();
        domain
    }

    /// Recompute `key` from `host` and `port`.
    pub fn infer_key(&mut self) {
        self.key = if self.port.is_empty() {
            self.host.to_lowercase()
        } else {
            format!("{}:{}", self.host, self.port).to_lowercase()
        };
    }

    /// Register a route in this domain's routing tree.
    pub fn add_route(&mut self, route: Route) -> Result<(), Error> {
        if route.method.is_empty() {
            return Err(Error::MethodEmpty);
        }

        let tree = self.trees.entry(route.method.clone()).or_insert_with(Tree::new);
        tree.insert(&route.path, &route.name)?;

        self.routes.insert(route.name.clone(), route);
        Ok(())
    }

    /// Find the route for a request.
    ///
    /// Returns the route and its extracted path parameters, or a
    /// trailing-slash indicator when the canonical path is one `/`
    /// away, or neither on a plain miss.
    pub fn lookup(&self, req: &Request) -> (Option<&Route>, PathParams, bool) {
        // HTTP method override support; only trusted for POST
        let mut method = req.method().clone();
        if method == Method::Post {
            if let Some(overridden) = req.headers().get("x-http-method-override") {
                if !overridden.is_empty() {
                    method = Method::from(overridden.as_str());
                }
            }
        }

        let tree = match self.route_tree(&method, req) {
            Some(tree) => tree,
            None => return (None, PathParams::new(), false),
        };

        let found = tree.find(req.path());
        match found.name {
            Some(name) => {
                let route = match self.routes.get(name) {
                    Some(route) => route,
                    None => return (None, PathParams::new(), false),
                };

                let mut params = found.params;
                if route.is_static && route.is_dir() {
                    // expose the catch-all as a filesystem suffix
                    if let Some(filepath) = params.get_mut("filepath") {
                        if filepath.starts_with('/') {
                            filepath.remove(0);
                        }
                    }
                }

                (Some(route), params, false)
            }
            None => (None, PathParams::new(), found.rts),
        }
    }

    /// Find a route by its configured name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Value for the `Allow` header: every method that could serve the
    /// given path, except the one asked and `OPTIONS`. The path `*`
    /// means server-wide.
    pub fn allowed(&self, request_method: &Method, path: &str) -> String {
        let mut allowed = Vec::new();

        for (method, tree) in &self.trees {
            if *method == Method::Options {
                continue;
            }

            if path == "*" {
                allowed.push(method.to_string());
            } else if method != request_method && tree.find(path).name.is_some() {
                allowed.push(method.to_string());
            }
        }

        allowed.join(", ")
    }

    /// Compose a URL from a route name and named arguments. Arguments
    /// beyond the route's path parameters become query parameters,
    /// alphabetized. On any failure this logs and returns an empty
    /// string; it never panics, since templates call it mid-render.
    pub fn route_url_named_args<K, V>(
        &self,
        route_name: &str,
        args: impl IntoIterator<Item = (K, V)>,
    ) -> String
    where
        K: ToString,
        V: ToString,
    {
        let route = match self.routes.get(route_name) {
            Some(route) => route,
            None => {
                error!("route name '{}' not found", route_name);
                return String::new();
            }
        };

        let mut args: BTreeMap<String, String> = args
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let param_count = count_params(&route.path);
        if param_count == 0 && args.is_empty() {
            return route.path.clone();
        }

        if args.len() < param_count {
            error!(
                "not enough arguments, path: '{}' params count: {}, supplied values count: {}",
                route.path,
                param_count,
                args.len()
            );
            return String::new();
        }

        let mut segments = Vec::new();
        for segment in route.path.split('/').filter(|s| !s.is_empty()) {
            if segment.starts_with(':') || segment.starts_with('*') {
                match args.remove(&segment[1..]) {
                    Some(value) => segments.push(value),
                    None => {
                        error!("'{}' param not found in given args", &segment[1..]);
                        return String::new();
                    }
                }
            } else {
                segments.push(segment.to_string());
            }
        }

        let mut url = format!("/{}", segments.join("/"));

        // leftover named arguments become the query string
        if !args.is_empty() {
            url = format!("{}?{}", url, encode_query(args.iter()));
        }

        url
    }

    /// Compose a URL from a route name and positional arguments. The
    /// argument count must match the route's parameter count exactly;
    /// positional calls produce no query parameters. Failures log and
    /// return an empty string.
    pub fn route_url(&self, route_name: &str, args: &[&dyn std::fmt::Display]) -> String {
        let route = match self.routes.get(route_name) {
            Some(route) => route,
            None => {
                error!("route name '{}' not found", route_name);
                return String::new();
            }
        };

        let param_count = count_params(&route.path);
        if param_count == 0 && args.is_empty() {
            return route.path.clone();
        }

        if args.len() != param_count {
            error!(
                "incorrect number of arguments, path: '{}' params count: {}, supplied values count: {}",
                route.path,
                param_count,
                args.len()
            );
            return String::new();
        }

        let mut values = args.iter().map(|a| a.to_string());
        let mut segments = Vec::new();
        for segment in route.path.split('/').filter(|s| !s.is_empty()) {
            if segment.starts_with(':') || segment.starts_with('*') {
                match values.next() {
                    Some(value) => segments.push(value),
                    None => return String::new(),
                }
            } else {
                segments.push(segment.to_string());
            }
        }

        format!("/{}", segments.join("/"))
    }

    /// All routes in this domain, keyed by name.
    pub fn routes(&self) -> &HashMap<String, Route> {
        &self.routes
    }

    fn route_tree(&self, method: &Method, req: &Request) -> Option<&Tree> {
        if let Some(tree) = self.trees.get(method) {
            return Some(tree);
        }

        // CORS preflight: route OPTIONS against the requested method
        if *method == Method::Options && self.cors_enabled {
            if let Some(requested) = req.headers().get("access-control-request-method") {
                return self.trees.get(&Method::from(requested.as_str()));
            }
        }

        None
    }
}
