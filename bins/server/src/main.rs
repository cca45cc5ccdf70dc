//! Faktura API Server
//!
//! Main entry point for the Faktura backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faktura_api::{AppState, create_router, sweep};
use faktura_core::storage::{StorageConfig, StorageProvider, StorageService};
use faktura_db::connect;
use faktura_shared::config::StorageSettings;
use faktura_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faktura=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
        #[allow(clippy::cast_possible_wrap)]
        refresh_token_expires_days: (config.jwt.refresh_token_expiry_secs / 86400) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create email service
    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    // Create storage service
    let storage = match build_storage(&config.storage) {
        Ok(service) => {
            info!(provider = service.provider_name(), "Storage service configured");
            Some(Arc::new(service))
        }
        Err(e) => {
            warn!(error = %e, "Storage not configured; branding routes disabled");
            None
        }
    };

    // Create application state
    let db = Arc::new(db);
    let state = AppState {
        db: Arc::clone(&db),
        jwt_service: Arc::new(jwt_service),
        email_service: Arc::new(email_service),
        storage,
    };

    // Start the daily overdue sweep
    sweep::spawn_overdue_sweeper(Arc::clone(&db));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the typed storage service from the raw config section.
fn build_storage(settings: &StorageSettings) -> anyhow::Result<StorageService> {
    let provider = match settings.provider.as_str() {
        "s3" => StorageProvider::s3(
            settings.endpoint.clone().context("storage.endpoint")?,
            settings.bucket.clone().context("storage.bucket")?,
            settings
                .access_key_id
                .clone()
                .context("storage.access_key_id")?,
            settings
                .secret_access_key
                .clone()
                .context("storage.secret_access_key")?,
            settings.region.clone().unwrap_or_else(|| "auto".to_string()),
        ),
        "azblob" => StorageProvider::azure_blob(
            settings.account.clone().context("storage.account")?,
            settings.access_key.clone().context("storage.access_key")?,
            settings.container.clone().context("storage.container")?,
        ),
        _ => StorageProvider::local_fs(settings.root.clone()),
    };

    StorageService::from_config(StorageConfig::new(provider)).context("storage init")
}
