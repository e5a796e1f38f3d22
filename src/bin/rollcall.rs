//! Discord availability bot.
//!
//! Usage: `rollcall [CONFIG_PATH]`. Without a path the platform config file
//! is used when present, otherwise built-in defaults. Diagnostics go to
//! stderr.

use rollcall::channels::ChatGateway;
use rollcall::channels::discord::DiscordAdapter;
use rollcall::config::{ConfigIssueSeverity, RollcallConfig};
use rollcall::runtime::{self, RuntimeContext};
use std::path::PathBuf;
use std::sync::Arc;

fn load_config() -> anyhow::Result<RollcallConfig> {
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        return Ok(RollcallConfig::from_file(&path)?);
    }
    let path = RollcallConfig::default_config_path();
    if path.is_file() {
        Ok(RollcallConfig::from_file(&path)?)
    } else {
        Ok(RollcallConfig::default())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = rollcall::logging::init(&config.logging)?;

    tracing::info!("rollcall v{} starting", env!("CARGO_PKG_VERSION"));

    let issues = config.validate();
    let has_error = issues
        .iter()
        .any(|issue| issue.severity == ConfigIssueSeverity::Error);
    for issue in &issues {
        match issue.severity {
            ConfigIssueSeverity::Warning => tracing::warn!("{}: {}", issue.id, issue.summary),
            ConfigIssueSeverity::Error => tracing::error!("{}: {}", issue.id, issue.summary),
        }
    }
    if has_error {
        anyhow::bail!("configuration has blocking errors");
    }

    let adapter = Arc::new(DiscordAdapter::new(&config.discord));
    match adapter.health_check().await {
        Ok(true) => tracing::info!("{} token accepted", adapter.id()),
        Ok(false) => tracing::warn!("{} rejected the bot token", adapter.id()),
        Err(err) => tracing::warn!("{} health check failed: {err}", adapter.id()),
    }
    if config.discord.application_id.is_some()
        && let Err(err) = adapter.register_commands().await
    {
        tracing::warn!("slash command registration failed: {err}");
    }

    let ctx = Arc::new(RuntimeContext::from_config(config)?);
    tracing::info!(dir = %ctx.store.dir().display(), "availability store ready");

    tokio::select! {
        result = runtime::run(ctx, adapter) => {
            result.map_err(|e| {
                tracing::error!(error = %e, "rollcall exited with error");
                e
            })?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
        }
    }

    tracing::info!("rollcall shut down cleanly");
    Ok(())
}
