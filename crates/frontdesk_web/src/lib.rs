//! Server-rendered front-desk web application.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::WebError;
pub use routes::router;
pub use state::AppState;
