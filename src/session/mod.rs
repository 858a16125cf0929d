// Public API - what other modules can use
pub use cookies::{cookie_name, signing_key};
pub use handle::Session;
pub use middleware::session_layer;
pub use service::{SessionService, SessionSettings};

// Internal modules
pub mod cleanup_task;
mod cookies;
mod handle;
mod middleware;
pub mod models;
pub mod repository;
mod service;
