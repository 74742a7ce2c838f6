//! FileHub Identity: bootstrap for the identity and access-control subsystem.
//!
//! Loads configuration, connects to the database, initialises the signing
//! key pool exactly once, and keeps the components alive until shutdown.
//! `SIGHUP` reloads the key pool and the permission table. Failed login
//! counters of unknown usernames are pruned hourly.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use tracing_subscriber::{EnvFilter, fmt};

use filehub_auth::{AuthContext, PermissionTable};
use filehub_core::config::AppConfig;
use filehub_core::error::AppError;
use filehub_core::traits::SystemClock;
use filehub_database::DatabasePool;

/// How often counters of unknown usernames are pruned.
const PRUNE_INTERVAL: Duration = Duration::from_secs(3_600);

#[tokio::main]
async fn main() {
    let env = std::env::var("FILEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, &env).await {
        tracing::error!(error = %e, "Identity service failed");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig, env: &str) -> Result<(), AppError> {
    tracing::info!(env = %env, "Starting FileHub identity v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        return Err(AppError::database("Database health check failed"));
    }
    let store = Arc::new(db.identity_store());

    // ── Step 2: Key pool, lockout policy, permission table ───────
    let context = AuthContext::initialize(&config, store, Arc::new(SystemClock)).await?;

    tracing::info!(
        signing_keys = context.tokens.key_ids().len(),
        token_ttl_secs = context.tokens.ttl().num_seconds(),
        "Identity subsystem ready"
    );

    // ── Step 3: Serve reloads until shutdown ─────────────────────
    let mut signals = Signals::install()?;
    let mut prune = tokio::time::interval(PRUNE_INTERVAL);
    prune.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            event = signals.next() => match event {
                SignalEvent::Shutdown => break,
                SignalEvent::Reload => reload(&context, env).await,
            },
            _ = prune.tick() => {
                if let Err(e) = context.authenticator.lockout().prune_unknown_attempts().await {
                    tracing::error!(error = %e, "Pruning login attempts failed");
                }
            }
        }
    }

    tracing::info!("Shutdown signal received");
    db.close().await;
    Ok(())
}

/// Re-reads the key pool and the permission table. A failure keeps the
/// current state.
async fn reload(context: &AuthContext, env: &str) {
    if let Err(e) = context.tokens.reload().await {
        tracing::error!(error = %e, "Signing key reload failed");
    }

    let table = AppConfig::load(env).and_then(|c| PermissionTable::from_config(&c.permissions));
    match table {
        Ok(table) => context.permissions.reload(table),
        Err(e) => tracing::error!(error = %e, "Permission table reload failed"),
    }
}

/// What a received signal asks the service to do.
#[derive(Debug, PartialEq, Eq)]
enum SignalEvent {
    Shutdown,
    Reload,
}

/// Signal streams, installed once so a signal delivered while a reload is
/// running is still seen by the next `next()` call.
struct Signals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Signals {
    /// Install handlers for SIGINT, SIGTERM and SIGHUP.
    #[cfg(unix)]
    fn install() -> Result<Self, AppError> {
        use tokio::signal::unix::{SignalKind, signal};

        let install = |kind| {
            signal(kind).map_err(|e| {
                AppError::internal(format!("Failed to install signal handler: {e}"))
            })
        };

        Ok(Self {
            interrupt: install(SignalKind::interrupt())?,
            terminate: install(SignalKind::terminate())?,
            hangup: install(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    fn install() -> Result<Self, AppError> {
        Ok(Self {})
    }

    /// Wait for the next signal: Ctrl+C or SIGTERM shuts down, SIGHUP reloads.
    #[cfg(unix)]
    async fn next(&mut self) -> SignalEvent {
        tokio::select! {
            _ = self.interrupt.recv() => SignalEvent::Shutdown,
            _ = self.terminate.recv() => SignalEvent::Shutdown,
            _ = self.hangup.recv() => SignalEvent::Reload,
        }
    }

    #[cfg(not(unix))]
    async fn next(&mut self) -> SignalEvent {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        SignalEvent::Shutdown
    }
}
