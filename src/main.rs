//! pinecone-rerank CLI entry point

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use pinecone_rerank::{
    commands::{
        cmd_compress, cmd_models, cmd_rerank, print_compressed, print_models,
        print_rerank_results, read_inputs, RerankCommandOptions,
    },
    config::Config,
    error::Result,
    inference::Truncate,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pinecone-rerank")]
#[command(version, about = "Rerank documents with Pinecone hosted inference", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Rerank candidates and print scored results
    Rerank {
        /// The query to rank against
        query: String,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Rerank documents and print them reordered with relevance scores
    Compress {
        /// The query to rank against
        query: String,

        #[command(flatten)]
        input: InputArgs,
    },

    /// List known rerank models
    Models,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// JSON file with an array of candidates (reads stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Rerank model (overrides config)
    #[arg(short, long, env = "PINECONE_RERANK_MODEL")]
    model: Option<String>,

    /// Number of results to keep
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Record field to rank on (repeatable)
    #[arg(long = "rank-field")]
    rank_fields: Vec<String>,

    /// Truncation strategy for over-long inputs
    #[arg(long, value_enum)]
    truncate: Option<TruncateArg>,

    /// Do not ask the service to echo documents back
    #[arg(long)]
    no_documents: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TruncateArg {
    End,
    None,
}

impl From<TruncateArg> for Truncate {
    fn from(arg: TruncateArg) -> Self {
        match arg {
            TruncateArg::End => Truncate::End,
            TruncateArg::None => Truncate::None,
        }
    }
}

impl InputArgs {
    fn options(&self) -> RerankCommandOptions {
        RerankCommandOptions {
            model: self.model.clone(),
            top_n: self.top_n,
            rank_fields: (!self.rank_fields.is_empty()).then(|| self.rank_fields.clone()),
            truncate: self.truncate.map(Truncate::from),
            no_documents: self.no_documents,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => handle_init(cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "pinecone-rerank", &mut std::io::stdout());
            Ok(())
        }

        Commands::Models => {
            let models = cmd_models();
            if cli.json {
                let names: Vec<_> = models
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "name": m.name,
                            "max_documents": m.max_documents,
                            "max_tokens_per_pair": m.max_tokens_per_pair,
                            "multiple_rank_fields": m.multiple_rank_fields,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                print_models(&models);
            }
            Ok(())
        }

        Commands::Rerank { query, input } => {
            let config = load_config(cli.config.as_deref())?;
            let inputs = read_inputs(input.file.as_deref())?;
            let output = cmd_rerank(&config, &query, inputs, input.options()).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_rerank_results(&output);
            }
            Ok(())
        }

        Commands::Compress { query, input } => {
            let config = load_config(cli.config.as_deref())?;
            let inputs = read_inputs(input.file.as_deref())?;
            let output = cmd_compress(&config, &query, inputs, input.options()).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_compressed(&output);
            }
            Ok(())
        }
    }
}

fn handle_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    // A .toml path names the file itself, anything else a directory
    let config = match path {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => {
            let base = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_base_dir);
            let mut config = Config::with_base_dir(base);
            config.paths.config_file = path;
            config
        }
        Some(dir) => Config::with_base_dir(dir),
        None => Config::with_base_dir(Config::default_base_dir()),
    };

    if config.paths.config_file.exists() && !force {
        eprintln!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            config.paths.config_file.display()
        );
        std::process::exit(1);
    }

    config.save()?;
    println!(
        "Wrote config to {}\nSet reranker.model and export {} before reranking.",
        config.paths.config_file.display(),
        config.reranker.api_key_env
    );
    Ok(())
}

/// Load the config file when present, defaults otherwise
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from(None),
    }
}
