use std::process::ExitCode;

use clap::Parser;
use finsight::cli::{Cli, Command};
use finsight::config::Config;
use finsight::engine::HttpCategoryEngine;
use finsight::error::{AppError, AppResult};
use finsight::server;
use finsight::VERSION;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match run(&config, cli.command()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, command: Command) -> AppResult<()> {
    match command {
        Command::Serve => serve(config).await?,
        Command::Status => {
            let engine = open_engine(config)?;
            let status = json!({
                "bootstrap_completed": engine.bootstrap().completed_on_device(),
                "should_sync": engine.sync().should_sync(),
                "last_sync": engine.sync().last_sync_date(),
                "sync_ttl_secs": engine.sync().ttl().as_secs(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Start => {
            let engine = open_engine(config)?;
            let report = engine.start().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Bootstrap => {
            let engine = open_engine(config)?;
            let state = engine.bootstrap().run().await;
            let status = json!({
                "state": state,
                "total_categories": engine.bootstrap().total_categories(),
                "report": engine.bootstrap().last_report(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Sync { force } => {
            let engine = open_engine(config)?;
            let ok = engine.sync().sync_categories(force).await;
            let status = json!({
                "success": ok,
                "last_sync": engine.sync().last_sync_date(),
                "report": engine.sync().last_report(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !ok {
                return Err(AppError::Internal("category sync did not complete".into()));
            }
        }
        Command::List { kind } => {
            let engine = open_engine(config)?;
            let listing = engine.categories(kind).await;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Reset => {
            let engine = open_engine(config)?;
            engine.bootstrap().reset_initialization()?;
            engine.sync().force_clear_sync()?;
            println!("Local category state cleared");
        }
    }

    Ok(())
}

fn open_engine(config: &Config) -> AppResult<HttpCategoryEngine> {
    tracing::info!(version = VERSION, api = %config.api_url, "Starting Finsight category engine");
    HttpCategoryEngine::from_config(config)
}

async fn serve(config: &Config) -> AppResult<()> {
    let (_state, app) =
        server::build_app(config).map_err(|e| AppError::Internal(e.to_string()))?;

    let (port, handle) = server::serve(app, &config.host, config.port)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!("Development category API listening on http://{}:{}", config.host, port);

    handle
        .await
        .map_err(|e| AppError::Internal(format!("server task failed: {}", e)))
}
