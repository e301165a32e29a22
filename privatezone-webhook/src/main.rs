//! external-dns webhook server for Volcengine private zones
//!
//! Serves the external-dns webhook protocol on top of the private zone
//! reconciler (`serve`, the default). `list` and `record add|delete|list` are
//! one-shot maintenance commands against the same API. Credentials and scope
//! come from `VOLCENGINE_*` environment variables, flags, or a TOML file (see
//! `--help`).

mod commands;
mod config;
mod error;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use actix_web::{App, HttpServer, middleware};
use anyhow::{Context, Result};
use clap::Parser;
use privatezone_core::{Reconciler, RecordStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Cli, Command, Settings};
use server::AppState;

#[actix_web::main]
async fn main() -> ExitCode {
    let settings = match Settings::load(Cli::parse()) {
        Ok(s) => s,
        Err(e) => {
            // 日志尚未初始化
            eprintln!("Configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&settings) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = match settings.command.clone() {
        Command::Serve => serve(settings).await,
        Command::List => list(settings).await,
        Command::Record(command) => record(settings, command).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr so
/// command output on stdout stays machine-readable.
fn init_tracing(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;

    let registry = tracing_subscriber::registry().with(filter);
    if settings.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

fn reconciler(settings: Settings) -> Result<Reconciler> {
    if let Some(path) = &settings.config_path {
        tracing::info!("Loaded config file {}", path.display());
    }
    tracing::debug!("Effective settings: {settings:?}");

    let provider = settings
        .api
        .build_provider()
        .context("failed to create Volcengine client")?;
    Ok(Reconciler::new(Arc::new(provider), settings.reconciler)?)
}

async fn list(settings: Settings) -> Result<()> {
    let reconciler = reconciler(settings)?;
    commands::list(&reconciler, &mut std::io::stdout().lock()).await
}

async fn record(settings: Settings, command: config::RecordCommand) -> Result<()> {
    let provider = settings
        .api
        .build_provider()
        .context("failed to create Volcengine client")?;
    let store = RecordStore::new(
        Arc::new(provider),
        settings.reconciler.page_size,
        settings.reconciler.batch_size,
    );
    commands::record(&store, command, &mut std::io::stdout().lock()).await
}

async fn serve(settings: Settings) -> Result<()> {
    let request_timeout = settings.request_timeout;
    let bind = (settings.host.clone(), settings.port);
    tracing::info!(
        "Managing private zones of {} in {} via {} (update strategy {})",
        settings.reconciler.vpc_id.as_deref().unwrap_or("<any>"),
        settings.api.region,
        settings.api.endpoint,
        settings.reconciler.update_strategy
    );

    let reconciler = reconciler(settings)?;
    let state = Arc::new(AppState::new(reconciler, request_timeout));

    tracing::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default().exclude("/healthz"))
            .configure(server::configure(state.clone()))
    })
    .bind((bind.0.as_str(), bind.1))
    .with_context(|| format!("failed to bind {}:{}", bind.0, bind.1))?
    .run()
    .await
    .context("HTTP server failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
