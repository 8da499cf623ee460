use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use batch_fetch::{BatchFetcher, Config, Error, ErrorReport, FetchMode};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Exit code after Ctrl+C, following the shell convention of 128 + SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "batch-fetch",
    version,
    about = "Fetch a batch of resources concurrently under one deadline"
)]
struct Cli {
    /// Path to a JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// URL template; `{id}` is replaced with each resource id.
    #[arg(long)]
    template: Option<String>,
    /// Deadline for the whole batch, in milliseconds.
    #[arg(long = "deadline-ms")]
    deadline_ms: Option<u64>,
    /// What to collect from each response.
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Print results and errors as JSON.
    #[arg(long)]
    json: bool,
    /// Resource ids to fetch (defaults to the configured ids).
    ids: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Download every body and print them in order.
    Bodies,
    /// Sum the declared content lengths.
    TotalLength,
}

impl From<Mode> for FetchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Bodies => FetchMode::Bodies,
            Mode::TotalLength => FetchMode::TotalLength,
        }
    }
}

/// Layer command line flags over the configuration file (or the defaults)
fn load_config(cli: &Cli) -> batch_fetch::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(template) = &cli.template {
        config.url_template = template.clone();
    }
    if let Some(ms) = cli.deadline_ms {
        config.deadline = Duration::from_millis(ms);
    }
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if !cli.ids.is_empty() {
        config.resource_ids = cli.ids.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(config: &Config, json: bool) -> batch_fetch::Result<()> {
    let fetcher = BatchFetcher::new(config)?;
    let ids = &config.resource_ids;

    match config.mode {
        FetchMode::Bodies => {
            let bodies = fetcher.fetch_bodies(ids, config.deadline).await?;
            if json {
                println!("{}", serde_json::json!({ "resources": bodies }));
            } else {
                for (n, body) in bodies.iter().enumerate() {
                    println!("Resource {}:\n{}\n", n + 1, body);
                }
            }
        }
        FetchMode::TotalLength => {
            let total = fetcher.fetch_total_length(ids, config.deadline).await?;
            if json {
                println!("{}", serde_json::json!({ "total_content_length": total }));
            } else {
                println!("Total content length: {total}");
            }
        }
    }

    Ok(())
}

fn report(error: &Error, json: bool) {
    if json {
        match serde_json::to_string(&ErrorReport::from(error)) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: {error} (report serialization failed: {e})"),
        }
        return;
    }

    match error {
        Error::Timeout {
            operation,
            deadline,
            ..
        } => println!(
            "{operation} didn't complete within {} seconds and was cancelled.",
            deadline.as_secs_f64()
        ),
        other => eprintln!("error: {other}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report(&e, cli.json);
            return ExitCode::from(e.exit_code());
        }
    };

    // Dropping the batch future aborts every in-flight request
    let result = tokio::select! {
        result = run(&config, cli.json) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, abandoning batch");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, cli.json);
            ExitCode::from(e.exit_code())
        }
    }
}
