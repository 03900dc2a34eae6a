//! Application startup and the ingestion run
//!
//! Startup happens in stages:
//! 1. parse the command line (help and version exit here)
//! 2. load the configuration file and layer the command line over it
//! 3. resolve settings and start logging
//! 4. open the store and the input, then run the pipeline under the
//!    shutdown coordinator
//! 5. print the summary and any requested reports

use std::ffi::OsString;
use std::io::IsTerminal;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tokio::io::{AsyncBufRead, BufReader};

use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::{CancellationSignal, ShutdownCoordinator};
use crate::core::styles::{palette_to_clap, StyleRole};
use crate::core::version::version;
use crate::pipeline::{IngestPipeline, IngestReport, RunOutcome};
use crate::service::{AnalyticsCache, AnalyticsService, MemoryAnalyticsCache};
use crate::store::{AnalyticsStore, SqliteStore};

use super::cli::Args;
use super::error::StartupError;
use super::report;
use super::settings::Settings;

type InputReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Entry point for the binary; returns the process exit code
pub async fn startup() -> i32 {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too and go to stdout
            let _ = e.print();
            return if e.use_stderr() { 1 } else { 0 };
        }
    };
    run(cli).await
}

/// Parse command-line arguments with help styled by the colour palette
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let help_color =
        !args.iter().any(|a| a == "--no-color") && std::io::stdout().is_terminal();

    let matches = Args::command()
        .styles(palette_to_clap(help_color))
        .try_get_matches_from(args)?;
    Args::from_arg_matches(&matches)
}

/// Resolve configuration, start logging and run the ingestion
pub async fn run(cli: Args) -> i32 {
    let color_hint = cli.use_color();

    let settings = match resolve_settings(&cli).await {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is not running yet
            eprintln!("{} {}", StyleRole::Failure.paint("error:", color_hint), e);
            if matches!(e, StartupError::Validation(_)) && cli.file.is_none() {
                eprintln!("\n{}", Args::command().render_usage());
            }
            return 1;
        }
    };

    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        settings.log_file.as_ref().and_then(|p| p.to_str()),
        settings.color,
    ) {
        eprintln!(
            "{} failed to start logging: {}",
            StyleRole::Warning.paint("warning:", settings.color),
            e
        );
    }

    log::info!("orderstats {} starting", version());
    log::debug!("settings: {:?}", settings);

    let result = ShutdownCoordinator::guard(|signal| execute(&settings, signal)).await;
    match result {
        Ok(report) => {
            if let Some(e) = &report.error {
                log_error_with_context(e, "Ingesting orders");
            }
            if report.outcome() == RunOutcome::Interrupted {
                log::warn!("ingestion interrupted; committed batches are kept");
            }
            report.exit_code()
        }
        Err(e) => {
            log_error_with_context(&e, "Running ingestion");
            1
        }
    }
}

/// Configuration file first, command line over it, then defaults
pub async fn resolve_settings(cli: &Args) -> Result<Settings, StartupError> {
    let config = Args::from_config_file(cli.config_file.as_deref()).await?;
    let merged = config.override_with(cli);
    Ok(Settings::from_args(&merged)?)
}

/// Ingest the configured input into the configured store and print results
///
/// Read-side reports only follow a completed run.
pub async fn execute(
    settings: &Settings,
    shutdown: CancellationSignal,
) -> Result<IngestReport, StartupError> {
    let store: Arc<dyn AnalyticsStore> =
        Arc::new(SqliteStore::open(&settings.db_path, settings.store)?);
    let reader = open_input(settings).await?;

    let pipeline = IngestPipeline::new(settings.pipeline);
    let report = pipeline.run(reader, Arc::clone(&store), shutdown).await;

    report::print_table(&report::summary_table(&report.summary, settings.color), settings.color)?;

    if report.outcome() == RunOutcome::Completed && settings.wants_reports() {
        print_reports(settings, store).await?;
    }
    Ok(report)
}

async fn open_input(settings: &Settings) -> Result<InputReader, StartupError> {
    if settings.reads_stdin() {
        log::info!("reading orders from standard input");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(&settings.input)
        .await
        .map_err(|source| StartupError::Input {
            message: format!(
                "Cannot open input {}: {}",
                settings.input.display(),
                source
            ),
            source,
        })?;
    log::info!("reading orders from {}", settings.input.display());
    Ok(Box::new(BufReader::new(file)))
}

async fn print_reports(
    settings: &Settings,
    store: Arc<dyn AnalyticsStore>,
) -> Result<(), StartupError> {
    let cache: Option<Arc<dyn AnalyticsCache>> = if settings.cache_enabled {
        Some(Arc::new(MemoryAnalyticsCache::new(settings.cache_ttl)))
    } else {
        None
    };
    let service = AnalyticsService::new(store, cache);

    if let Some(limit) = settings.top {
        let users = service.top_users(limit).await?;
        println!();
        println!("{}", StyleRole::Header.paint("Top users", settings.color));
        report::print_table(&report::top_users_table(&users, settings.color), settings.color)?;
    }

    if settings.anomalies {
        let users = service.detect_anomalies().await?;
        println!();
        println!("{}", StyleRole::Header.paint("Anomalies", settings.color));
        if users.is_empty() {
            println!("none");
        } else {
            report::print_table(&report::anomalies_table(&users, settings.color), settings.color)?;
        }
    }
    Ok(())
}
