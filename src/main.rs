use clap::{Parser, Subcommand};
use inspector_scan::config::Config;
use inspector_scan::wrapper::InspectorWrapper;
use inspector_scan::{demo, hello};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "inspector-scan",
    about = "Amazon Inspector scanning status, findings, and coverage"
)]
struct Cli {
    /// Path to the config file (default: ~/.config/inspector-scan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the account's Inspector status
    Hello,
    /// Walk through account status, critical findings, and coverage
    Demo,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(region = %config.region, endpoint = %config.effective_endpoint(), "Loaded config");

    let wrapper = InspectorWrapper::from_config(&config)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Hello => hello::run_hello(&wrapper, &mut stdout).await?,
        Commands::Demo => demo::run_demo(&wrapper, &mut stdout).await?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run(cli)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
