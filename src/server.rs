//! HTTP server bootstrap for the registration service.
//!
//! This module wires together:
//! - configuration
//! - the record store (PostgreSQL or SQLite, picked from `DATABASE_URL`)
//! - the upload directory
//! - the Axum router

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::api::handlers::{health_check, readiness_check};
use crate::infra::{
    shutdown_signal, BlobStore, LocalBlobStore, PgRegistrationStore, RegistrationStore,
    SqliteRegistrationStore, UPLOADS_PREFIX,
};

/// Record store backends, chosen by connection string scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseBackend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else {
            anyhow::bail!("Unsupported DATABASE_URL scheme; expected postgres:// or sqlite:")
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Record store connection URL.
    pub database_url: String,
    /// Backend implied by `database_url`.
    pub database_backend: DatabaseBackend,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum database connections.
    pub max_connections: u32,
    /// Directory uploaded payment proofs are written to and served from.
    pub upload_dir: PathBuf,
    /// Largest accepted submission body, in bytes.
    pub max_upload_bytes: usize,
    /// Run embedded migrations before serving.
    pub migrate_on_startup: bool,
    /// `*`, a comma-separated origin list, or empty to disable CORS.
    pub cors_allow_origins: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://registrations.db?mode=rwc".to_string());
        let database_backend = DatabaseBackend::from_url(&database_url)?;

        let port: u16 = parse_or(&lookup, "PORT", 5000)?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("Invalid listen address {host}:{port}"))?;

        let max_connections: u32 = parse_or(&lookup, "MAX_DB_CONNECTIONS", 10)?;
        if max_connections == 0 {
            anyhow::bail!("MAX_DB_CONNECTIONS must be at least 1");
        }

        let upload_dir = PathBuf::from(
            lookup("UPLOAD_DIR").unwrap_or_else(|| UPLOADS_PREFIX.to_string()),
        );
        let max_upload_bytes: usize = parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        let migrate_on_startup = lookup("DB_MIGRATE_ON_STARTUP")
            .map(|v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "0" | "false" | "off"
                )
            })
            .unwrap_or(true);

        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS").unwrap_or_else(|| "*".to_string());

        Ok(Self {
            database_url,
            database_backend,
            listen_addr,
            max_connections,
            upload_dir,
            max_upload_bytes,
            migrate_on_startup,
            cors_allow_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")),
        None => Ok(default),
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registrations: Arc<dyn RegistrationStore>,
    pub blobs: Arc<dyn BlobStore>,
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine; real environments set variables directly.
    let _ = dotenvy::dotenv();
    init_tracing();

    info!("Starting event registration service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Database backend: {:?}", config.database_backend);
    info!("  Max connections: {}", config.max_connections);
    info!("  Upload directory: {}", config.upload_dir.display());

    // The service is useless without its record store: fail fast.
    let registrations = match connect_registration_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Could not open record store");
            return Err(e);
        }
    };

    let blobs = LocalBlobStore::open(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot open upload directory {}", config.upload_dir.display()))?;

    let state = AppState {
        registrations,
        blobs: Arc::new(blobs),
    };

    // Build router
    let app = build_router(&config)?.with_state(state);

    // Start server
    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("Server running on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("In-flight requests drained; server stopped");
    Ok(())
}

/// Connect to the configured record store and apply migrations if enabled.
pub async fn connect_registration_store(
    config: &Config,
) -> anyhow::Result<Arc<dyn RegistrationStore>> {
    match config.database_backend {
        DatabaseBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            info!("Connected to PostgreSQL");

            let store = PgRegistrationStore::new(pool);
            if config.migrate_on_startup {
                info!("Running database migrations...");
                store.initialize().await?;
                info!("Database migrations applied");
            } else {
                info!("DB migrations skipped (DB_MIGRATE_ON_STARTUP=0)");
            }
            Ok(Arc::new(store))
        }
        DatabaseBackend::Sqlite => {
            info!("Opening SQLite database...");
            let options = SqliteConnectOptions::from_str(&config.database_url)
                .context("Invalid SQLite DATABASE_URL")?
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await
                .context("Failed to open SQLite database")?;
            info!("Opened SQLite database");

            let store = SqliteRegistrationStore::new(pool);
            if config.migrate_on_startup {
                info!("Running database migrations...");
                store.initialize().await?;
                info!("Database migrations applied");
            } else {
                info!("DB migrations skipped (DB_MIGRATE_ON_STARTUP=0)");
            }
            Ok(Arc::new(store))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Assemble every route: the registration API, uploaded files under
/// `/uploads`, and the health probes.
pub fn build_router(config: &Config) -> anyhow::Result<Router<AppState>> {
    let mut router = Router::new()
        .merge(crate::api::router(config.max_upload_bytes))
        .nest_service(
            &format!("/{UPLOADS_PREFIX}"),
            ServeDir::new(&config.upload_dir),
        )
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer(&config.cors_allow_origins)? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer(origins: &str) -> anyhow::Result<Option<CorsLayer>> {
    let origins = origins.trim();
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
    ))
}
