use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod convert;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "stmtocr",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STMTOCR_BUILD_SHA"), ")"),
    about = "Extract bank statement transactions from images and PDFs into CSV"
)]
struct Cli {
    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from one or more statements and export CSV
    Convert {
        /// Statement images or PDFs
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory for <name>_converted.csv (default: export.out_dir or .)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print results without writing CSV files
        #[arg(long)]
        no_export: bool,

        /// Extraction API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Override llm.model
        #[arg(long)]
        model: Option<String>,
    },

    /// Manage ~/.stmtocr/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Print the effective config (API key masked)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Convert {
            files,
            out_dir,
            no_export,
            api_key,
            model,
        } => {
            let mut cfg = config::load_config()?;
            if let Some(m) = model {
                cfg.llm.model = m;
            }
            let key = config::resolve_api_key(api_key, &cfg);
            let out_dir = out_dir
                .or_else(|| cfg.export.out_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));

            convert::run_convert(
                convert::ConvertOptions {
                    files,
                    out_dir,
                    export: !no_export,
                },
                cfg.extraction(key),
            )
            .await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg.redacted())?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
