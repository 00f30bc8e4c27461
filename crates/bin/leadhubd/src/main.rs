//! # leadhubd: leadhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`leadhub.toml` plus env overrides)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services and the rule engine
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use leadhub_adapter_http_axum::state::AppState;
use leadhub_adapter_storage_sqlite_sqlx as storage;
use leadhub_adapter_storage_sqlite_sqlx::{
    SqliteExecutionLogRepository, SqliteLeadStore, SqliteRuleRepository,
};
use leadhub_app::rule_engine::RuleEngine;
use leadhub_app::services::execution_log_service::ExecutionLogService;
use leadhub_app::services::lead_service::LeadService;
use leadhub_app::services::rule_service::RuleService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = storage::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories, shared between the services and the engine
    let rule_repo = Arc::new(SqliteRuleRepository::new(pool.clone()));
    let lead_store = Arc::new(SqliteLeadStore::new(pool.clone()));
    let log_repo = Arc::new(SqliteExecutionLogRepository::new(pool));

    // Services
    let rule_service =
        RuleService::new(Arc::clone(&rule_repo)).with_max_rules_per_user(config.rules.max_per_user);
    let lead_service = LeadService::new(Arc::clone(&lead_store));
    let log_service = ExecutionLogService::new(Arc::clone(&log_repo))
        .with_limits(config.audit.default_limit, config.audit.max_limit);
    let engine = RuleEngine::new(rule_repo, lead_store, log_repo);

    // HTTP
    let state = AppState::new(rule_service, lead_service, log_service, engine);
    let app = leadhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "leadhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("leadhubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
