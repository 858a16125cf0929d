use std::sync::Arc;

use authcode_site::{
    config::AppConfig,
    routes,
    session::cleanup_task::{start_cleanup_task, CleanupConfig},
    AppState, HttpIdentityClient, IdentityConfig, InMemorySessionRepository, StartupError,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authcode_site=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        environment = config.environment.as_str(),
        hostname = %config.hostname,
        port = config.port,
        "Starting login site"
    );

    // Collaborators are built here once and injected through the state
    let identity = HttpIdentityClient::new(
        IdentityConfig::from_app_config(&config)?,
        config.exchange_timeout,
    )?;
    let session_repository = Arc::new(InMemorySessionRepository::new());
    let app_state = AppState::new(&config, session_repository, Arc::new(identity))?;

    tokio::spawn(start_cleanup_task(
        app_state.session_service.clone(),
        CleanupConfig {
            cleanup_interval: config.cleanup_interval,
        },
    ));

    let app = routes(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on {}", config.public_url("/")?);
    axum::serve(listener, app).await?;

    Ok(())
}
