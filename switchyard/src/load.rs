//! Configuration loading: turns the `domains.*` document tree into
//! [`Domain`]s populated with [`Route`]s.
//!
//! Nested route groups flatten through here: each level contributes
//! its path prefix, target, auth scheme and CORS policy to its
//! children. A level that only groups (child `routes` present, no
//! `action` or `controller`/`websocket` of its own) registers nothing.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::Config;
use crate::cors::Cors;
use crate::domain::Domain;
use crate::error::Error;
use crate::method::Method;
use crate::route::{parse_size, Route};
use crate::router::App;

const ANONYMOUS_AUTH: &str = "anonymous";

/// Inheritance context threaded through the recursive routes walk.
struct ParentRouteInfo {
    parent_name: String,
    prefix_path: String,
    target: String,
    auth: String,
    cors: Option<Cors>,
    cors_enabled: bool,
}

/// Build every domain in the routes document. Fails fast on the first
/// error; the caller discards everything on failure.
pub(crate) fn process_routes_config(
    config: &mut Config,
    app: &App,
) -> Result<HashMap<String, Domain>, Error> {
    // document-level view, for keys resolved outside the domain scope
    let doc = config.clone();

    if !config.set_profile("domains") {
        return Err(Error::NoDomainRoutes);
    }

    let keys = config.keys();
    if keys.is_empty() {
        return Err(Error::NoDomainRoutes);
    }
    debug!("domain count: {}", keys.len());

    let mut domains = HashMap::with_capacity(keys.len());
    for key in &keys {
        let domain_cfg = config.sub(key).unwrap_or_default();

        let host = domain_cfg
            .string("host")
            .ok_or_else(|| Error::Config(format!("'{}.host' key is missing", key)))?;

        // port precedence: domain entry, then the application's
        // server.port, then 8080; default HTTP(S) ports match bare hosts
        let mut port = domain_cfg.string_default(
            "port",
            &app.config().string_default("server.port", "8080"),
        );
        if port == "80" || port == "443" {
            port.clear();
        }

        let mut domain = Domain::new(&host, &port);
        domain.name = domain_cfg.string_default("name", key);
        domain.is_subdomain = domain_cfg.bool_default("subdomain", false);
        domain.method_not_allowed = domain_cfg.bool_default("method_not_allowed", true);
        domain.redirect_trailing_slash = domain_cfg.bool_default("redirect_trailing_slash", true);
        domain.auto_options = domain_cfg.bool_default("auto_options", true);
        domain.default_auth = domain_cfg.string_default("default_auth", "");
        domain.cors_enabled = domain_cfg.bool_default("cors.enable", false);

        if domain.cors_enabled {
            if let Some(cors_cfg) = domain_cfg.sub("cors") {
                domain.cors = Some(Cors::from_config(&cors_cfg));
            }
        }

        if let Some(static_cfg) = domain_cfg.sub("static") {
            for route in parse_static_section(&static_cfg, &doc)? {
                domain.add_route(route)?;
            }
        }

        if let Some(routes_cfg) = domain_cfg.sub("routes") {
            let parent = ParentRouteInfo {
                parent_name: String::new(),
                prefix_path: String::new(),
                target: String::new(),
                auth: domain.default_auth.clone(),
                cors: domain.cors.clone(),
                cors_enabled: domain.cors_enabled,
            };

            for route in parse_routes_section(&routes_cfg, &parent, app)? {
                domain.add_route(route)?;
            }
        }

        debug!("domain: {}, routes found: {}", domain.key, domain.routes().len());
        domains.insert(domain.key.clone(), domain);
    }

    config.clear_profile();
    Ok(domains)
}

/// Parse the `static.*` entries of one domain.
fn parse_static_section(config: &Config, doc: &Config) -> Result<Vec<Route>, Error> {
    let mut routes = Vec::new();

    for name in config.keys() {
        let path = config
            .string(&format!("{}.path", name))
            .ok_or_else(|| Error::Config(format!("'static.{}.path' key is missing", name)))?;

        if !path.starts_with('/') {
            return Err(Error::Config(format!(
                "'static.{}.path' [{}], path must begin with '/'",
                name, path
            )));
        }

        if path.contains(':') || path.contains('*') {
            return Err(Error::Config(format!(
                "'static.{}.path' parameters can not be used with static",
                name
            )));
        }

        let mut path = clean_path(&path);
        let dir = config.string(&format!("{}.dir", name));
        let file = config.string(&format!("{}.file", name));

        match (&dir, &file) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(format!(
                    "'static.{}.dir' & 'static.{}.file' key(s) cannot be used together",
                    name, name
                )));
            }
            (None, None) => {
                return Err(Error::Config(format!(
                    "either 'static.{}.dir' or 'static.{}.file' key have to be present",
                    name, name
                )));
            }
            _ => {}
        }

        let mut dir = dir.unwrap_or_default();
        let file = file.unwrap_or_default();

        if file.is_empty() {
            // directory serving joins the tree through a catch-all
            path = format!("{}/*filepath", path);
        } else if let Some(base_dir) = config.string(&format!("{}.base_dir", name)) {
            dir = base_dir;
        } else if !file.starts_with('/') {
            // a relative file mapping falls back to the application's
            // public assets directory
            dir = doc
                .string("public_assets.dir")
                .ok_or_else(|| Error::Config(format!("'static.{}.base_dir' value is missing", name)))?;
        }

        routes.push(Route {
            name: name.clone(),
            path,
            method: Method::Get,
            auth: ANONYMOUS_AUTH.to_string(),
            is_static: true,
            dir,
            file,
            list_dir: config.bool_default(&format!("{}.list", name), false),
            ..Default::default()
        });
    }

    Ok(routes)
}

/// Parse one `routes.*` section, recursing into nested groups.
fn parse_routes_section(
    config: &Config,
    parent: &ParentRouteInfo,
    app: &App,
) -> Result<Vec<Route>, Error> {
    let mut routes = Vec::new();

    for name in config.keys() {
        let path = config.string(&format!("{}.path", name));
        if path.is_none() && parent.prefix_path.is_empty() {
            return Err(Error::Config(format!("'{}.path' key is missing", name)));
        }

        let path = path.unwrap_or_default();
        if !path.is_empty() && !path.starts_with('/') {
            return Err(Error::Config(format!(
                "'{}.path' [{}], path must begin with '/'",
                name, path
            )));
        }

        let full_path = join_paths(&parent.prefix_path, &path);
        let (route_path, constraints) = parse_route_constraints(&full_path)?;

        // a level with child routes and no handler of its own only groups
        let has_children = config.is_exists(&format!("{}.routes", name));
        let registers = !(has_children
            && (!config.is_exists(&format!("{}.action", name))
                || !(config.is_exists(&format!("{}.controller", name))
                    || config.is_exists(&format!("{}.websocket", name)))));

        let mut method_value = config
            .string_default(&format!("{}.method", name), "GET")
            .to_uppercase();

        let mut target = config.string_default(&format!("{}.controller", name), &parent.target);
        if let Some(websocket) = config.string(&format!("{}.websocket", name)) {
            target = websocket;
            method_value = "WS".to_string();
        }
        if target.is_empty() && registers {
            return Err(Error::Config(format!(
                "'{}.controller' or '{}.websocket' key is missing",
                name, name
            )));
        }

        let methods = method_value
            .split(',')
            .map(|m| Method::from(m.trim()))
            .collect::<Vec<_>>();

        let action = match config.string(&format!("{}.action", name)) {
            Some(action) => action,
            None => {
                let default = match methods.as_slice() {
                    [method] => method.default_action(),
                    _ => None,
                };

                match default {
                    Some(action) => action.to_string(),
                    None if registers => {
                        return Err(Error::Config(format!(
                            "'{}.action' key is missing or it seems to be multiple HTTP methods",
                            name
                        )));
                    }
                    None => String::new(),
                }
            }
        };

        let auth = config.string_default(&format!("{}.auth", name), &parent.auth);
        if !auth.is_empty()
            && auth != ANONYMOUS_AUTH
            && !app.auth_schemes().is_empty()
            && !app.auth_schemes().iter().any(|s| s == &auth)
        {
            warn!("'{}.auth' scheme '{}' is not declared by the application", name, auth);
        }

        let size_value = config.string_default(&format!("{}.max_body_size", name), "0kb");
        let max_body_size = match parse_size(&size_value) {
            Ok(size) => size,
            Err(()) => {
                warn!(
                    "'{}.max_body_size' value is not a valid size unit, fallback to global limit",
                    name
                );
                0
            }
        };

        let anti_csrf_check = config.bool_default(&format!("{}.anti_csrf_check", name), true);

        let cors = if parent.cors_enabled {
            match config.sub(&format!("{}.cors", name)) {
                Some(cors_cfg) if cors_cfg.bool_default("enable", true) => {
                    Some(Cors::from_config_with(&cors_cfg, parent.cors.as_ref()))
                }
                Some(_) => None,
                None => parent.cors.clone(),
            }
        } else {
            None
        };

        if registers {
            for method in &methods {
                routes.push(Route {
                    name: name.clone(),
                    path: route_path.clone(),
                    method: method.clone(),
                    target: target.clone(),
                    action: action.clone(),
                    parent_name: parent.parent_name.clone(),
                    auth: if auth.is_empty() {
                        ANONYMOUS_AUTH.to_string()
                    } else {
                        auth.clone()
                    },
                    max_body_size,
                    anti_csrf_check,
                    cors: cors.clone(),
                    constraints: constraints.clone(),
                    ..Default::default()
                });
            }
        }

        if let Some(children) = config.sub(&format!("{}.routes", name)) {
            let child_parent = ParentRouteInfo {
                parent_name: name.clone(),
                // children build on the constraint-stripped prefix
                prefix_path: route_path.clone(),
                target: target.clone(),
                auth: auth.clone(),
                cors: cors.clone(),
                cors_enabled: parent.cors_enabled,
            };

            routes.extend(parse_routes_section(&children, &child_parent, app)?);
        }
    }

    Ok(routes)
}

/// Strip inline `[constraint]` syntax from every wildcard segment of a
/// pattern, yielding the clean pattern and the extracted constraints.
pub(crate) fn parse_route_constraints(
    full_path: &str,
) -> Result<(String, HashMap<String, String>), Error> {
    let mut constraints = HashMap::new();
    let mut segments = Vec::new();

    for segment in full_path.split('/').filter(|s| !s.is_empty()) {
        if segment.starts_with(':') || segment.starts_with('*') {
            let (clean, constraint) = split_constraint(segment).ok_or_else(|| {
                Error::Config(format!(
                    "'routes.path' has invalid constraint in path => '{}' (param => '{}')",
                    full_path, segment
                ))
            })?;

            if let Some(expr) = constraint {
                constraints.insert(clean[1..].to_string(), expr.to_string());
            }
            segments.push(clean);
        } else {
            segments.push(segment);
        }
    }

    let path = if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    };

    Ok((path, constraints))
}

/// Split `:id[gt=1]` into (`:id`, `gt=1`). A bare segment has no
/// constraint; anything else malformed is rejected.
fn split_constraint(segment: &str) -> Option<(&str, Option<&str>)> {
    match segment.find('[') {
        None => {
            if segment.contains(']') || segment.contains(char::is_whitespace) {
                None
            } else {
                Some((segment, None))
            }
        }
        Some(open) => {
            if !segment.ends_with(']') || open == segment.len() - 1 {
                return None;
            }

            let name = &segment[..open];
            if name.len() < 2 || name[1..].contains(char::is_whitespace) {
                return None;
            }

            let expr = &segment[open + 1..segment.len() - 1];
            if expr.contains('[') || expr.contains(']') {
                return None;
            }

            Some((name, Some(expr)))
        }
    }
}

/// Join two URL path fragments, collapsing duplicate slashes.
fn join_paths(prefix: &str, path: &str) -> String {
    let joined = format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let joined = clean_path(&joined);

    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

fn clean_path(path: &str) -> String {
    let mut cleaned = String::with_capacity(path.len());
    let mut last_slash = false;

    for c in path.chars() {
        if c == '/' {
            if last_slash {
                continue;
            }
            last_slash = true;
        } else {
            last_slash = false;
        }
        cleaned.push(c);
    }

    if cleaned.len() > 1 && cleaned.ends_with('/') {
        cleaned.pop();
    }

    cleaned
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("", "/v1"), "/v1");
        assert_eq!(join_paths("/v1", "/users"), "/v1/users");
        assert_eq!(join_paths("/v1", ""), "/v1");
        assert_eq!(join_paths("/", "/login"), "/login");
        assert_eq!(join_paths("/v1/", "//users"), "/v1/users");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/static/"), "/static");
        assert_eq!(clean_path("//a//b/"), "/a/b");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_constraints_absent() {
        let (path, constraints) = parse_route_constraints("/api/v1/products").unwrap();
        assert_eq!(path, "/api/v1/products");
        assert!(constraints.is_empty());

        let (path, constraints) = parse_route_constraints("/api/v1/products/:id").unwrap();
        assert_eq!(path, "/api/v1/products/:id");
        assert!(constraints.is_empty());
    }

    #[test]
    fn test_constraints_extracted() {
        let (path, constraints) =
            parse_route_constraints("/api/v1/products/:id[uuid]/colors/:color[oneof=blue green red,alpha]")
                .unwrap();

        assert_eq!(path, "/api/v1/products/:id/colors/:color");
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints.get("id").unwrap(), "uuid");
        assert_eq!(constraints.get("color").unwrap(), "oneof=blue green red,alpha");
    }

    #[test]
    fn test_constraints_on_catch_all() {
        let (path, constraints) = parse_route_constraints("/files/*filepath[max=255]").unwrap();

        assert_eq!(path, "/files/*filepath");
        assert_eq!(constraints.get("filepath").unwrap(), "max=255");
    }

    #[test]
    fn test_malformed_constraints_rejected() {
        let err = parse_route_constraints("/v1/users/:id  gt=1,lt=10]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'routes.path' has invalid constraint in path => '/v1/users/:id  gt=1,lt=10]' (param => ':id  gt=1,lt=10]')"
        );

        assert!(parse_route_constraints("/v1/users/:id[gt=1").is_err());
        assert!(parse_route_constraints("/v1/users/:id[a[b]]").is_err());
        assert!(parse_route_constraints("/v1/users/:[uuid]").is_err());
    }
}
