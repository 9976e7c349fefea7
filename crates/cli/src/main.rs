use anyhow::Result;
use clap::{Parser, Subcommand};
use feedback_core::config;
use feedback_core::config::AppConfig;
use feedback_core::indexer::MemoryIndex;
use feedback_core::pipeline;
use feedback_core::search;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Index {
            dry_run,
            repos,
            json,
        } => run_index(cfg, dry_run, repos, json).await,
        Commands::Search {
            query,
            topk,
            category,
            repo,
            json,
        } => run_search(cfg, query, topk, category, repo, json).await,
    }
}

#[derive(Parser)]
#[command(name = "feedback-indexer")]
#[command(about = "Indexes PR review feedback into a vector store", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, classify, embed, and index review comments
    Index {
        /// Collect records in memory instead of writing to the vector store
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Repository to index (owner/name); repeatable, overrides config
        #[arg(long = "repo")]
        repos: Vec<String>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Find indexed feedback similar to a query
    Search {
        /// Query text to embed and search
        query: String,
        /// Number of results
        #[arg(short, long, default_value_t = 5)]
        topk: u64,
        /// Filter by category (e.g. security)
        #[arg(long)]
        category: Option<String>,
        /// Filter by repository (owner/name)
        #[arg(long)]
        repo: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run_index(
    mut cfg: AppConfig,
    dry_run: bool,
    repos: Vec<String>,
    json: bool,
) -> Result<()> {
    if !repos.is_empty() {
        cfg.repos = repos;
    }

    let summary = if dry_run {
        let registry = pipeline::build_registry(&cfg);
        let source = pipeline::build_source(&cfg);
        let index = MemoryIndex::new();
        pipeline::run_with(&cfg, &source, &registry, &index).await?
    } else {
        pipeline::run(cfg).await?
    };

    if json {
        let summary_json = serde_json::json!({
            "status": "ok",
            "total_indexed": summary.total_indexed,
            "repos_processed": summary.repos_processed,
            "repos_failed": summary.repos_failed,
            "dry_run": dry_run,
        });
        println!("{}", serde_json::to_string_pretty(&summary_json)?);
    } else {
        println!(
            "indexed {} feedback records ({} repos processed, {} failed)",
            summary.total_indexed, summary.repos_processed, summary.repos_failed
        );
    }
    Ok(())
}

async fn run_search(
    cfg: AppConfig,
    query: String,
    topk: u64,
    category: Option<String>,
    repo: Option<String>,
    json: bool,
) -> Result<()> {
    let registry = pipeline::build_registry(&cfg);
    let client = pipeline::build_qdrant(&cfg);
    let hits = search::similar(
        &client,
        &registry,
        &query,
        topk,
        category.as_deref(),
        repo.as_deref(),
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    for hit in &hits {
        let payload = hit.payload.as_ref();
        let get = |key: &str| {
            payload
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string()
        };
        let body = get("body");
        let first_line = body.lines().next().unwrap_or("");
        println!(
            "{:.3}  [{}] {} PR#{}: {}",
            hit.score,
            get("category"),
            get("repo"),
            payload
                .and_then(|p| p.get("pr_number"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            first_line
        );
    }
    Ok(())
}
