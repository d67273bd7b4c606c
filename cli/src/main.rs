//! CLI entrypoint for Persona Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use council_application::{
    AssembleCouncilInput, AssembleCouncilUseCase, CoordinationEngine, EventSink, NoProgress,
    ProgressNotifier,
};
use council_domain::{Session, SessionStatus};
use council_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, HttpPersonaLookup, JsonlEventSink,
    OpenAiCompatibleClient,
};
use council_presentation::{
    Cli, ConsoleFormatter, EventPrinter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs get written
    let _log_guard = init_logging(&cli);

    info!("Starting Persona Council");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        let config = load_config(&cli)?;
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    for issue in config.validate() {
        if issue.is_error() {
            bail!("Invalid configuration: {}", issue);
        }
        eprintln!("{} {}", "warning:".yellow().bold(), issue);
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(query) = cli.query.clone() else {
        bail!("A query is required");
    };

    // === Dependency Injection ===
    let client = Arc::new(OpenAiCompatibleClient::from_config(&config.completion)?);
    if !client.has_api_key() {
        warn!(
            "{} is not set; every completion will fail",
            config.completion.api_key_env
        );
    }
    let lookup = Arc::new(HttpPersonaLookup::from_config(&config.personas)?);

    let session_id = cli.session_id.clone().unwrap_or_else(generate_session_id);

    // Resolve personas into workers
    let mut assemble_input = AssembleCouncilInput::new(&session_id, query, cli.personas.clone());
    if cli.no_synthesis {
        assemble_input = assemble_input.without_synthesis();
    }
    let council = AssembleCouncilUseCase::new(lookup)
        .execute(assemble_input)
        .await?;
    for (id, error) in &council.skipped {
        eprintln!("{} skipping persona {}: {}", "warning:".yellow().bold(), id, error);
    }

    let mut engine = CoordinationEngine::with_config(client, config.engine.to_engine_config());
    if let Some(dir) = config.trace.resolved_dir() {
        match JsonlEventSink::for_session(&dir, &session_id) {
            Some(sink) => {
                info!("Writing trace to {}", sink.path().display());
                let sink: Arc<dyn EventSink> = Arc::new(sink);
                engine = engine.with_event_sink(sink);
            }
            None => warn!("Trace disabled: could not open a file in {}", dir.display()),
        }
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }
    let input = council.input.with_cancellation(cancel);

    let format = output_format(&cli, &config);
    let show_progress = !cli.quiet && format != OutputFormat::Json;

    let session = if cli.stream {
        let engine = Arc::new(engine);
        engine.open(&session_id);

        let runner = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.run_session(input).await })
        };

        let mut cursor = 0;
        while let Some(events) = engine.wait_for_events(&session_id, cursor).await {
            let Some(last) = events.last() else {
                break;
            };
            cursor = last.sequence + 1;
            for event in &events {
                eprintln!("{}", EventPrinter::format(event));
            }
        }

        runner.await?
    } else {
        let progress: Box<dyn ProgressNotifier> = if !show_progress {
            Box::new(NoProgress)
        } else if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        engine
            .run_session_with_progress(input, progress.as_ref())
            .await
    };

    println!("{}", render(&session, format));

    if session.status() == SessionStatus::Failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Console logging from the `-v` count, plus daily log files with `--log-dir`
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "persona-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
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

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Failed to load config: {}", e))
}

/// `--output`, then the config file, then the synthesis-only default
fn output_format(cli: &Cli, config: &FileConfig) -> OutputFormat {
    if let Some(format) = cli.output {
        return format;
    }
    match config.output.format.unwrap_or_default() {
        FileOutputFormat::Full => OutputFormat::Full,
        FileOutputFormat::Synthesis => OutputFormat::Synthesis,
        FileOutputFormat::Json => OutputFormat::Json,
    }
}

fn render(session: &Session, format: OutputFormat) -> String {
    match format {
        OutputFormat::Full => ConsoleFormatter::format(session),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(session),
        OutputFormat::Json => ConsoleFormatter::format_json(session),
    }
}

fn generate_session_id() -> String {
    format!("session-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S-%3f"))
}
