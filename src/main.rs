//! microcks-cli binary entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use console::style;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use microcks_cli::cli::{Cli, Commands};
use microcks_cli::client::MicrocksClient;
use microcks_cli::config::{ClientConfig, Config};
use microcks_cli::error::CliError;
use microcks_cli::import::ImportOrchestrator;
use microcks_cli::orchestrator::TestRunOrchestrator;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return exit_on_parse_error(e),
    };

    // The defaults file can turn on verbose output, so it is read before
    // logging is set up
    let file = match cli.connection() {
        Some(connection) => match connection.load_file() {
            Ok(file) => file,
            Err(e) => return report(e),
        },
        None => Config::default(),
    };
    let verbose = cli
        .connection()
        .is_some_and(|connection| connection.verbose(&file));

    if let Err(e) = init_logging(verbose) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, &file).await {
        Ok(code) => code,
        Err(e) => report(e),
    }
}

/// Help and version go to stdout with status 0; any other parse failure is
/// a usage error with status 1.
fn exit_on_parse_error(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        _ => {
            print!("{}", e.render());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}

async fn run(cli: Cli, file: &Config) -> Result<ExitCode, CliError> {
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Test(args) => {
            let settings = args.resolve(file)?;
            let client = connect(&settings.client).await?;

            let outcome = TestRunOrchestrator::new(&client, &settings.client)
                .run(&settings.request, &mut stdout)
                .await?;
            debug!(state = ?outcome.state, success = outcome.success, "test run finished");
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Commands::Import(args) => {
            let settings = args.resolve(file)?;
            let client = connect(&settings.client).await?;

            ImportOrchestrator::new(&client)
                .run(&settings.artifacts, &mut stdout)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            writeln!(stdout, "microcks-cli {}", env!("CARGO_PKG_VERSION"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn connect(config: &ClientConfig) -> Result<MicrocksClient, CliError> {
    MicrocksClient::connect(config)
        .await
        .map_err(CliError::client("retrieving OAuth token"))
}

fn report(e: CliError) -> ExitCode {
    println!("{}", style(&e).red());
    ExitCode::from(e.exit_code())
}
