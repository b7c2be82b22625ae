use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::commands;
use textsift_core::config::{self, AppConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut cfg = config::load(cli.config.as_deref())?;
    debug!(?cfg, "loaded configuration");

    match cli.command {
        Commands::Index {
            clean,
            index,
            documents,
            summary,
            json,
        } => {
            apply_overrides(&mut cfg, index, documents, summary);
            run_index(&cfg, clean, json)
        }
        Commands::Query {
            query,
            content,
            summary,
            keywords,
            field,
            limit,
            index,
            json,
        } => {
            apply_overrides(&mut cfg, index, None, None);
            let field = commands::resolve_field(content, summary, keywords, field.as_deref())?;
            let limit = limit.unwrap_or(cfg.search.limit);
            run_query(&cfg, field, &query, limit, json)
        }
    }
}

#[derive(Parser)]
#[command(name = "textsift")]
#[command(about = "Summarize, tag and search a directory of text documents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or update the index from the documents root
    Index {
        /// Drop the index and rebuild it from every document
        #[arg(long, default_value_t = false)]
        clean: bool,
        /// Index directory (overrides [index].path)
        #[arg(short, long)]
        index: Option<String>,
        /// Documents root (overrides [documents].root)
        #[arg(short, long)]
        documents: Option<String>,
        /// Sentences per summary (overrides [summary].sentences)
        #[arg(short, long)]
        summary: Option<usize>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Search one field of the index
    Query {
        /// Query in Tantivy syntax; quote keyphrases, e.g. '"cat sat"'
        query: String,
        /// Search document content
        #[arg(long, default_value_t = false)]
        content: bool,
        /// Search summaries
        #[arg(long, default_value_t = false)]
        summary: bool,
        /// Search keyphrases
        #[arg(long, default_value_t = false)]
        keywords: bool,
        /// Field by name: content|summary|keywords
        #[arg(long)]
        field: Option<String>,
        /// Number of results (overrides [search].limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Index directory (overrides [index].path)
        #[arg(short, long)]
        index: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(
    cfg: &mut AppConfig,
    index: Option<String>,
    documents: Option<String>,
    summary: Option<usize>,
) {
    if let Some(path) = index {
        cfg.index.path = path;
    }
    if let Some(root) = documents {
        cfg.documents.root = root;
    }
    if let Some(n) = summary {
        cfg.summary.sentences = n;
    }
}

fn run_index(cfg: &AppConfig, clean: bool, json: bool) -> Result<()> {
    let summary = commands::run_index(cfg, clean)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", commands::format_summary(&summary));
    }
    Ok(())
}

fn run_query(
    cfg: &AppConfig,
    field: storage::SearchField,
    query: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    let hits = commands::run_query(cfg, field, query, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        eprintln!("no matches in {field}");
    }
    for hit in &hits {
        println!("{}", commands::format_hit(hit));
    }
    Ok(())
}
