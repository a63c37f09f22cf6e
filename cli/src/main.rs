//! CLI entrypoint for the council orchestrator
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use council_application::{
    CheckHealthUseCase, CouncilConfig, CouncilGateway, HeartbeatConfig, HeartbeatMonitor,
    NoEventLog, NoProgress, RunCouncilUseCase, RunEventLogger, RunStore, StageError,
    StageProgress,
};
use council_domain::Severity;
use council_infrastructure::{
    BackendClient, ConfigLoader, FileConfig, HttpCouncilGateway, JsonlRunEventLogger,
    SqliteRunRepository, UuidRequestIds,
};
use council_presentation::{
    AppState, Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, RunsCommand,
    ServerSettings, build_router,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    let _log_guard = init_logging(cli.verbose, file_config.logging.dir.as_deref());

    for issue in file_config
        .validate()
        .iter()
        .filter(|i| i.severity == Severity::Warning)
    {
        warn!("{}", issue);
    }
    let council_config = file_config.to_council_config()?;
    let wiring = Wiring::build(&file_config, council_config)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&file_config, wiring, port).await,
        Command::Ask {
            query,
            output,
            quiet,
        } => ask(wiring, &query, output, quiet).await,
        Command::Runs { command } => runs(wiring, command),
    }
}

/// Stderr logging plus an optional daily-rolling file.
///
/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8, dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let (file_layer, guard) = match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Adapters shared by every command
struct Wiring {
    config: CouncilConfig,
    heartbeat: HeartbeatConfig,
    gateway: Arc<dyn CouncilGateway>,
    store: Arc<RunStore>,
    events: Arc<dyn RunEventLogger>,
}

impl Wiring {
    fn build(file_config: &FileConfig, config: CouncilConfig) -> Result<Self> {
        let client = BackendClient::new(config.timeout())
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;
        let gateway: Arc<dyn CouncilGateway> = Arc::new(HttpCouncilGateway::new(client));

        let persistence = &file_config.persistence;
        let store = if persistence.enabled {
            match SqliteRunRepository::open(&persistence.path) {
                Ok(repository) => {
                    let store = RunStore::with_repository(Arc::new(repository));
                    let loaded = store.bootstrap(persistence.bootstrap_limit);
                    info!("Loaded {} recent runs", loaded);
                    store
                }
                Err(e) => {
                    warn!("Persistence disabled, keeping runs in memory only: {}", e);
                    RunStore::in_memory()
                }
            }
        } else {
            RunStore::in_memory()
        };

        let events: Arc<dyn RunEventLogger> = match &file_config.logging.event_log {
            Some(path) => match JsonlRunEventLogger::open(path) {
                Ok(logger) => Arc::new(logger),
                Err(e) => {
                    warn!("Run event log disabled ({}): {}", path.display(), e);
                    Arc::new(NoEventLog)
                }
            },
            None => Arc::new(NoEventLog),
        };

        Ok(Self {
            config,
            heartbeat: file_config.heartbeat_config(),
            gateway,
            store: Arc::new(store),
            events,
        })
    }

    fn council(&self, progress: Arc<dyn StageProgress>) -> RunCouncilUseCase {
        RunCouncilUseCase::new(
            self.gateway.clone(),
            self.store.clone(),
            Arc::new(UuidRequestIds),
            self.config.clone(),
        )
        .with_progress(progress)
        .with_events(self.events.clone())
    }
}

async fn serve(file_config: &FileConfig, wiring: Wiring, port: Option<u16>) -> Result<()> {
    let monitor = Arc::new(HeartbeatMonitor::new(
        wiring.gateway.clone(),
        wiring.config.members().to_vec(),
        wiring.config.chairman().clone(),
        wiring.heartbeat,
    ));
    let heartbeat_task = monitor.start();

    let council = Arc::new(wiring.council(Arc::new(NoProgress)));
    let health = Arc::new(CheckHealthUseCase::new(
        wiring.gateway.clone(),
        wiring.config.clone(),
        monitor.clone(),
    ));

    let server = &file_config.server;
    let settings = ServerSettings {
        cors_origins: server.cors_origins.clone(),
        body_limit_bytes: server.body_limit_bytes,
    };
    let router = build_router(AppState::new(council, health), &settings);

    let address = match port {
        Some(port) => format!("{}:{}", server.host, port),
        None => server.bind_address(),
    };
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(
        "Orchestrator listening on {} ({} members, chairman {})",
        address,
        wiring.config.members().len(),
        wiring.config.chairman()
    );

    let shutdown_monitor = monitor.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
            shutdown_monitor.stop();
        })
        .await
        .context("Server error")?;

    monitor.stop();
    let _ = heartbeat_task.await;
    Ok(())
}

async fn ask(wiring: Wiring, query: &str, output: OutputFormat, quiet: bool) -> Result<()> {
    let progress: Arc<dyn StageProgress> = if quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };
    let council = wiring.council(progress);

    if !quiet {
        println!();
        println!("+============================================================+");
        println!("|                  Council Orchestrator                      |");
        println!("+============================================================+");
        println!();
        println!("Query: {}", query);
        println!(
            "Members: {}",
            wiring
                .config
                .members()
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Chairman: {}", wiring.config.chairman());
        println!();
    }

    let stage1 = council.run_stage1(query, None).await?;
    let request_id = stage1.request_id;

    if let Some(skipped) = skip_on_precondition(council.run_stage2(&request_id, None).await)? {
        eprintln!("Skipping peer review: {}", skipped);
    }
    if let Some(skipped) = skip_on_precondition(council.run_stage3(&request_id, None).await)? {
        eprintln!("Skipping synthesis: {}", skipped);
    }

    let view = council.get_run(&request_id)?;
    println!("{}", ConsoleFormatter::render(&view, output.into()));
    Ok(())
}

/// `Ok(Some(reason))` when the stage could not run yet
fn skip_on_precondition<T>(result: Result<T, StageError>) -> Result<Option<StageError>> {
    match result {
        Ok(_) => Ok(None),
        Err(e) if e.is_precondition() => Ok(Some(e)),
        Err(e) => Err(e.into()),
    }
}

fn runs(wiring: Wiring, command: RunsCommand) -> Result<()> {
    let council = wiring.council(Arc::new(NoProgress));
    match command {
        RunsCommand::List { limit } => {
            print!("{}", ConsoleFormatter::format_run_list(&council.list_runs(limit)));
        }
        RunsCommand::Show { id, output } => {
            let view = council
                .get_run(&id)
                .with_context(|| format!("Run {}", id))?;
            println!("{}", ConsoleFormatter::render(&view, output.into()));
        }
        RunsCommand::Delete { id } => {
            council.delete_run(&id);
            println!("Deleted {}", id);
        }
    }
    Ok(())
}
