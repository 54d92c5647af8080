use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resume_checker::presentation::accepted_types_hint;
use resume_checker::session::{self, Session};
use resume_checker::{ClientConfig, ServiceClient};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "reschk")]
#[command(about = "Send a résumé to the analysis service and read the report")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to ./reschk.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one résumé and print the report
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Interactive session reading commands from stdin
    Session,
    /// Show accepted file types and the size limit
    Types,
}

fn init_logging(config: &ClientConfig, verbose: u8) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file: {}", config.log_file.display()))?;

    let default_directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(log_filter(default_directive)?)
        .init();

    Ok(())
}

/// Both the library and this binary log under their own targets.
fn log_filter(level: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for target in ["resume_checker", "reschk"] {
        let directive = format!("{}={}", target, level);
        filter = filter.add_directive(directive.parse().context("Invalid log directive")?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref())?.with_overrides(cli.url, cli.timeout);
    init_logging(&config, cli.verbose)?;

    info!("Analysis endpoint: {}", config.analysis_url());
    match config.timeout_seconds {
        Some(secs) => info!("Request timeout: {}s", secs),
        None => info!("Request timeout: none"),
    }

    let stdout = std::io::stdout();
    let ansi = stdout.is_terminal();

    match cli.command {
        Command::Types => {
            println!("{}", accepted_types_hint(config.max_file_bytes));
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { paths } => {
            let transport = Arc::new(ServiceClient::new(&config)?);
            let succeeded =
                session::check(transport, config.max_file_bytes, &paths, &mut stdout.lock(), ansi)
                    .await?;
            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Session => {
            let transport = Arc::new(ServiceClient::new(&config)?);
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            Session::new(transport, config.max_file_bytes, stdout, ansi)
                .run(input)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
