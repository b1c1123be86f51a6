use thiserror::Error;

/// Everything that can go wrong while loading a routing configuration.
///
/// Loading is all-or-nothing: the first error aborts the load and no
/// partial routing state is exposed. Request-time lookups never return
/// an error; a miss is encoded in the lookup result itself.
#[derive(Error, Debug)]
pub enum Error {
    #[error("router: configuration does not exists: {0}")]
    ConfigurationNotFound(String),

    #[error("router: no domain routes config found")]
    NoDomainRoutes,

    #[error("router: not a valid switchyard application instance")]
    InvalidApp,

    #[error("router: method value is empty")]
    MethodEmpty,

    #[error("router: route already exists")]
    RouteExists,

    /// Structural conflict in the routing tree, e.g. two parameter
    /// edges with different names at the same position.
    #[error("{0}")]
    Registration(String),

    /// Semantic error in the routes document, e.g. a missing `host`
    /// key. The message text is part of the public contract.
    #[error("{0}")]
    Config(String),

    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
