use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bidsift")]
#[command(
    version,
    about = "Relevance analysis for public-tender document bundles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Config file (defaults to ./bidsift.toml)")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one bundle directory against a target and volume threshold
    Analyze {
        #[arg(help = "Bundle directory with the edital files")]
        bundle: PathBuf,
        #[arg(long, short, help = "Product or service to look for")]
        target: String,
        #[arg(
            long,
            default_value = "0",
            help = "Minimum unit volume (0 disables the quantity check)"
        )]
        threshold: u64,
        #[arg(long, help = "Treat the bundle as target-relevant without asking the model")]
        force_match: bool,
        #[arg(long, short, help = "Write the JSON report here instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mbidsift encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze {
            bundle,
            target,
            threshold,
            force_match,
            output,
            model,
        } => {
            use bidsift::cli::commands::analyze::{self, AnalyzeOptions};

            let rt = Runtime::new()?;
            rt.block_on(analyze::run(AnalyzeOptions {
                bundle,
                target,
                threshold,
                force_match,
                output,
                config: cli.config,
                model,
            }))?;
        }
    }

    Ok(())
}
