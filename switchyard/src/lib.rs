//! Switchyard is a domain-aware HTTP request router for web
//! frameworks. It loads a declarative routing configuration — domains,
//! nested route groups, static-asset mounts — once at startup, and
//! answers for every incoming request: which named route handles this
//! URL, what are its path parameters, and is a trailing-slash redirect
//! warranted?
//!
//! Matching runs on a compressed radix tree per HTTP method, with
//! named parameters (`:id`), trailing catch-alls (`*filepath`) and
//! RFC-compliant trailing-slash detection. Hosts resolve exactly or
//! through wildcard subdomains (`*.example.com`). The router also
//! answers the inverse question — reverse URL construction from a
//! route name — and the auxiliary ones HTTP plumbing needs:
//! allowed methods for `OPTIONS`/405, per-route auth scheme, CORS
//! policy.
//!
//! The routing graph is built once and read-only afterwards, so every
//! request-time operation is lock-free and safe to call concurrently.
//!
//! # Example
//!
//! ```rust
//! use switchyard::prelude::*;
//!
//! let mut domain = Domain::new("localhost", "8080");
//! domain.add_route(Route {
//!     name: "cancel_booking".to_string(),
//!     path: "/hotels/:id/cancel".to_string(),
//!     method: Method::Post,
//!     target: "Hotel".to_string(),
//!     action: "Cancel".to_string(),
//!     ..Default::default()
//! }).unwrap();
//!
//! let req = Request::new(Method::Post, "/hotels/12345/cancel")
//!     .with_host("localhost:8080");
//! let (route, params, rts) = domain.lookup(&req);
//!
//! assert_eq!(route.unwrap().name, "cancel_booking");
//! assert_eq!(params.get("id"), "12345");
//! assert!(!rts);
//! ```
//!
//! In a host framework the router is built from configuration instead:
//!
//! ```rust,no_run
//! use switchyard::prelude::*;
//!
//! let app = App::new(Config::parse(r#"server = { port = "8080" }"#).unwrap());
//! let router = Router::load(Some(&app), "config/routes.toml").unwrap();
//! ```

pub mod config;
pub mod cors;
pub mod domain;
pub mod error;
pub mod logging;
pub mod method;
pub mod params;
pub mod request;
pub mod route;
pub mod router;
pub mod url;

mod load;
mod trie;

pub use config::Config;
pub use cors::Cors;
pub use domain::Domain;
pub use error::Error;
pub use logging::Logger;
pub use method::{is_default_action, Method};
pub use params::{PathParam, PathParams};
pub use request::{Headers, Request};
pub use route::Route;
pub use router::{App, Router};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::cors::Cors;
    pub use crate::domain::Domain;
    pub use crate::error::Error;
    pub use crate::logging::Logger;
    pub use crate::method::Method;
    pub use crate::params::{PathParam, PathParams};
    pub use crate::request::{Headers, Request};
    pub use crate::route::Route;
    pub use crate::router::{App, Router};
}
