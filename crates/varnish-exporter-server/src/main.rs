//! varnish_exporter
//!
//! - `GET /metrics`: varnishstat counters of the active VCL, Prometheus text
//! - `--check`: one collection cycle to stdout, then exit

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use varnish_exporter_core::error::{ExporterError, Result};
use varnish_exporter_server::{app_state::AppState, cli::Cli, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is reserved for --check output
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "varnish_exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = cli.load_config()?;
    let listen = cfg.exporter.listen_addr()?;
    let state = AppState::new(cfg);

    if cli.check {
        let exp = state.scrape().await?;
        print!("{}", exp.text);
        return Ok(());
    }

    tracing::info!(%listen, no_admin = state.cfg().exporter.no_admin, "varnish_exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, router::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
