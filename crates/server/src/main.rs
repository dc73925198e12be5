use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use darrlink_core::arr::SystemStatus;
use darrlink_core::config::AuditConfig;
use darrlink_core::{
    create_audit_system, create_authenticator, load_config, validate_config, ArrError,
    AuditBackend, AuditEvent, AuditHandle, AuditStore, Authenticator, JsonlAuditStore, LogFormat,
    MoviePolicy, MovieReconciler, RadarrClient, SeriesPolicy, SeriesReconciler, SonarrClient,
    SqliteAuditStore,
};
use darrlink_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::var("DARRLINK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // The log format lives in the config, so load before installing the subscriber
    let loaded = load_config(&config_path);
    init_tracing(
        loaded
            .as_ref()
            .map(|c| c.logging.format)
            .unwrap_or_default(),
    );

    info!("Loading configuration from {:?}", config_path);
    let config =
        loaded.with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    let audit_store = open_audit_store(&config.audit)?;

    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(audit_writer.run());

    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Engines only get a handle when auditing is on; the store still backs /audit
    let engine_audit: Option<AuditHandle> = config.audit.enabled.then(|| audit_handle.clone());
    if engine_audit.is_none() {
        info!("Audit events disabled for reconciliation engines");
    }

    let mut state = AppState::new(config.clone(), authenticator, audit_store);

    if let Some(radarr_config) = &config.radarr {
        let client = RadarrClient::new(radarr_config).context("Failed to create Radarr client")?;
        info!("Radarr configured at {}", client.base_url());
        check_connectivity("radarr", client.system_status().await)?;

        let mut engine =
            MovieReconciler::from_service(Arc::new(client), MoviePolicy::from(radarr_config))
                .with_dispatch(radarr_config.dispatch);
        if let Some(handle) = &engine_audit {
            engine = engine.with_audit(handle.clone());
        }
        state = state.with_movies(engine);
    } else {
        info!("Radarr not configured");
    }

    if let Some(sonarr_config) = &config.sonarr {
        let client = SonarrClient::new(sonarr_config).context("Failed to create Sonarr client")?;
        info!("Sonarr configured at {}", client.base_url());
        check_connectivity("sonarr", client.system_status().await)?;

        let mut engine =
            SeriesReconciler::from_service(Arc::new(client), SeriesPolicy::from(sonarr_config))
                .with_dispatch(sonarr_config.dispatch);
        if let Some(handle) = &engine_audit {
            engine = engine.with_audit(handle.clone());
        }
        state = state.with_series(engine);
    } else {
        info!("Sonarr not configured");
    }
    drop(engine_audit);

    let app = create_router(Arc::new(state));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The router (and every engine handle in it) is gone once serve returns,
    // so dropping the last handle closes the channel and lets the writer drain.
    drop(audit_handle);
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

fn open_audit_store(audit: &AuditConfig) -> Result<Arc<dyn AuditStore>> {
    let path = audit.resolved_path();
    let store: Arc<dyn AuditStore> = match audit.backend {
        AuditBackend::Jsonl => Arc::new(
            JsonlAuditStore::new(&path)
                .with_context(|| format!("Failed to open audit log {:?}", path))?,
        ),
        AuditBackend::Sqlite => Arc::new(
            SqliteAuditStore::new(&path)
                .with_context(|| format!("Failed to open audit database {:?}", path))?,
        ),
    };
    info!("Audit store initialized at {:?} ({:?})", path, audit.backend);
    Ok(store)
}

/// A rejected API key stops startup; any other failure is only logged.
fn check_connectivity(service: &str, status: Result<SystemStatus, ArrError>) -> Result<()> {
    match status {
        Ok(status) => {
            info!(
                "Connected to {} {}",
                status.app_name.as_deref().unwrap_or(service),
                status.version
            );
            Ok(())
        }
        Err(ArrError::Unauthorized(_)) => {
            bail!("{} rejected the configured API key", service)
        }
        Err(e) => {
            warn!("Could not reach {} at startup: {}", service, e);
            Ok(())
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
