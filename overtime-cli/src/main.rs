use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use overtime_cli::app::App;
use overtime_cli::cli::Cli;
use overtime_cli::config::AppConfig;
use overtime_cli::logging::{init_logging, resolve_directive};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = resolve_directive(
        rust_log.as_deref(),
        cli.log_level.as_deref(),
        config.log_level.as_deref(),
    );
    init_logging(&directive, cli.log_file.as_deref())?;
    debug!(%directive, "logging initialized");

    let app = App::from_cli(&cli, config)?;
    debug!(
        years = ?app.rates.years(),
        backend = %app.db.backend,
        "configuration resolved"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    app.run(&cli.command, &mut out).await?;
    out.flush().context("Failed to flush stdout")?;

    Ok(())
}
