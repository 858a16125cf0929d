// Library crate for the authorization code login site
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod error_page;
pub mod flow;
pub mod identity;
pub mod session;
pub mod shared;
pub mod views;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, Environment};
pub use flow::routes;
pub use identity::{HttpIdentityClient, IdentityConfig, IdentityProvider};
pub use session::{repository::InMemorySessionRepository, Session};
pub use shared::{AppError, AppState, StartupError};
