use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use spendwise_finance::insights::guidance;
use spendwise_finance::{DirectOracle, DirectOracleConfig, Ingestor, Oracle, ProxyOracle};
use spendwise_ingest::{PdfTextExtractor, StatementFile, parse_category_totals};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod report;

use config::{Config, Transport};

#[derive(Parser, Debug)]
#[command(name = "spendwise", version, about = "Turn card statements into spending buckets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a statement (CSV, text, JSON or PDF) and print bucket totals
    Import {
        file: PathBuf,

        /// Override the detected MIME type (e.g. application/pdf)
        #[arg(long)]
        mime: Option<String>,

        /// Skip the LLM oracle; heuristics and keyword rules only
        #[arg(long)]
        no_llm: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Also write the categorized transactions to this CSV
        #[arg(long)]
        export: Option<PathBuf>,

        /// Free-form notes considered by the guidance
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Import pre-summed category totals from a JSON file
    ImportTotals { file: PathBuf },

    /// List spending categories and their keywords
    Categories,

    /// Manage ~/.spendwise/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config, environment overrides applied
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config()?;
    cfg.apply_env(config::process_env);
    init_logging(&cfg);

    match cli.command {
        Command::Import {
            file,
            mime,
            no_llm,
            json,
            export,
            notes,
        } => {
            let mut statement =
                StatementFile::from_path(&file).with_context(|| format!("read {}", file.display()))?;
            if let Some(mime) = mime {
                statement = statement.with_mime(mime);
            }

            let pdf = PdfTextExtractor::new();
            let oracle = if no_llm { None } else { build_oracle(&cfg) };
            let mut ingestor = Ingestor::new(&pdf);
            if let Some(oracle) = oracle.as_deref() {
                ingestor = ingestor.with_oracle(oracle);
            }

            let summary = match ingestor.import(&statement).await {
                Ok(summary) => summary,
                Err(e) => bail!("{}", e.user_message()),
            };

            if let Some(path) = &export {
                export::export_to_path(path, &summary.transactions)?;
                info!(path = %path.display(), rows = summary.transactions.len(), "exported transactions");
            }

            if json {
                let doc = serde_json::json!({
                    "summary": summary,
                    "guidance": guidance(&summary.totals, &notes),
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                report::print_summary(&summary, &notes);
            }
        }

        Command::ImportTotals { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let totals = match parse_category_totals(&text) {
                Ok(totals) => totals,
                Err(e) => bail!("{e}"),
            };
            println!("Category totals imported from JSON.\n");
            report::print_totals(&totals, "");
        }

        Command::Categories => report::print_categories(),

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                let key = if cfg.api_key(config::process_env).is_some() { "set" } else { "missing" };
                println!("# api key ({}): {key}", cfg.oracle.api_key_env);
            }
        },
    }

    Ok(())
}

/// RUST_LOG wins over the config file's filter. Logs go to stderr.
fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn build_oracle(cfg: &Config) -> Option<Box<dyn Oracle>> {
    match cfg.oracle.transport {
        Transport::Disabled => {
            info!("LLM oracle disabled in config");
            None
        }
        Transport::Proxy => {
            let oracle = ProxyOracle::new(cfg.oracle.proxy_url.clone());
            info!(url = %oracle.url(), "using LLM proxy");
            Some(Box::new(oracle))
        }
        Transport::Direct => {
            let api_key = cfg.api_key(config::process_env);
            if api_key.is_none() {
                warn!(var = %cfg.oracle.api_key_env, "no API key set; PDF imports will use fallback rules");
            }
            Some(Box::new(DirectOracle::new(DirectOracleConfig {
                api_key,
                model: cfg.oracle.model.clone(),
                base_url: cfg.oracle.base_url.clone(),
            })))
        }
    }
}
