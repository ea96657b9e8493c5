//! corebank service entrypoint
//!
//! Startup order: config, logging, store pool, schema bootstrap, gateway.

use std::sync::Arc;

use anyhow::{Context, Result};

use corebank::account::Database;
use corebank::config::AppConfig;
use corebank::gateway::{self, state::AppState};
use corebank::logging::init_logging;
use corebank::notify::{NoopNotifier, NotificationSender, WebhookNotifier};
use corebank::transfer::TransferService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    let database_url = config
        .database_url()
        .context("No store DSN: set postgres_url in config or the DATABASE_URL env var")?;

    let db = Arc::new(
        Database::connect(&database_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    db.ensure_schema().await.context("Schema bootstrap failed")?;

    let notifier: Arc<dyn NotificationSender> = match &config.notification.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.notification.sender_name.clone(),
        )),
        None => {
            tracing::warn!("No notification webhook configured; notices will be dropped");
            Arc::new(NoopNotifier)
        }
    };

    let transfers = TransferService::new(db.clone(), notifier);
    let state = Arc::new(AppState::new(
        db,
        transfers,
        config.settlement.internal_secret.clone(),
    ));

    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::serve(state, &config.gateway.host, port)
        .await
        .context("Gateway server failed")?;

    Ok(())
}
