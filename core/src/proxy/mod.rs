//! Proxy module - game server forwarding gateway

pub mod backend;
pub mod config;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod upstream;

pub use backend::{Backend, FixtureBackend, Reply};
pub use config::{ProxySettings, TimeoutClass};
pub use routes::{RouteGroup, RouteSpec, Target, ROUTES};
pub use server::{build_router, AppState, ProxyServer};
