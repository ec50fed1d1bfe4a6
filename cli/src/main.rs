use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use search_core::corpus::load_corpus;
use search_core::{
    paginate, process_queries, remove_duplicates, Document, DocumentFilter, DocumentStatus,
    EngineConfig, ExecutionPolicy, SearchServer,
};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Query an in-memory TF-IDF index built from JSON/JSONL documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Input path (file or directory of .json/.jsonl files)
    #[arg(long)]
    corpus: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Dedicated worker threads for parallel ranking (default: global pool)
    #[arg(long)]
    threads: Option<usize>,
    /// Accumulator shards (default: available parallelism)
    #[arg(long)]
    shards: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents for a query
    Search {
        #[command(flatten)]
        engine: EngineArgs,
        /// Query text; prefix a word with '-' to exclude it
        #[arg(long)]
        query: String,
        /// Only documents with this status (active, irrelevant, banned, removed)
        #[arg(long)]
        status: Option<DocumentStatus>,
        /// Rank on the worker pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Results per printed page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
    },
    /// Show which query words a document contains
    Match {
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: i32,
    },
    /// Run every query of a file (one per line) in parallel
    Batch {
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long)]
        queries: String,
    },
    /// Remove documents whose term sets repeat an earlier document
    Dedup {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Run the built-in pet shop example
    Demo,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { engine, query, status, parallel, page_size } => {
            let server = build_server(&engine)?;
            let filter = status.map(DocumentFilter::from).unwrap_or_default();
            let policy = if parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
            let start = Instant::now();
            let docs = server.find_top_documents_policy(policy, &query, &filter)?;
            tracing::info!(took_s = start.elapsed().as_secs_f64(), hits = docs.len(), "search complete");
            print_pages(&docs, page_size);
        }
        Commands::Match { engine, query, id } => {
            let server = build_server(&engine)?;
            let (words, status) = server.match_document(&query, id)?;
            println!("{}", serde_json::json!({ "id": id, "words": words, "status": status }));
        }
        Commands::Batch { engine, queries } => {
            let server = build_server(&engine)?;
            let text = fs::read_to_string(&queries)?;
            let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
            let results = process_queries(&server, &lines)?;
            for (query, docs) in lines.iter().zip(results) {
                println!("{query}: {} result(s)", docs.len());
                for doc in docs {
                    println!("  {doc}");
                }
            }
        }
        Commands::Dedup { engine } => {
            let mut server = build_server(&engine)?;
            let before = server.document_count();
            let removed = remove_duplicates(&mut server);
            println!("removed {} of {before} documents: {removed:?}", removed.len());
        }
        Commands::Demo => run_demo()?,
    }
    Ok(())
}

fn build_server(args: &EngineArgs) -> Result<SearchServer> {
    let mut config = EngineConfig::default();
    if let Some(shards) = args.shards {
        config = config.with_shard_count(shards);
    }
    if let Some(threads) = args.threads {
        config = config.with_worker_threads(threads);
    }
    let mut server = SearchServer::with_config(args.stop_words.split(' '), config)?;

    let files = corpus_files(Path::new(&args.corpus));
    if files.is_empty() {
        bail!("no .json or .jsonl files under {}", args.corpus);
    }
    let mut total = 0;
    for file in files {
        total += load_corpus(&mut server, &file)?;
    }
    tracing::info!(documents = total, "index ready");
    Ok(server)
}

fn corpus_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

fn print_pages(docs: &[Document], page_size: usize) {
    if docs.is_empty() {
        println!("no documents found");
        return;
    }
    for (n, page) in paginate(docs, page_size).into_iter().enumerate() {
        println!("-- page {} --", n + 1);
        for doc in page {
            println!("{doc}");
        }
    }
}

fn run_demo() -> Result<()> {
    let mut server = SearchServer::new("and in on")?;
    server.add_document(0, "white cat and fashionable collar", DocumentStatus::Active, &[8, -3])?;
    server.add_document(1, "fluffy cat fluffy tail", DocumentStatus::Active, &[7, 2, 7])?;
    server.add_document(2, "well groomed dog expressive eyes", DocumentStatus::Active, &[5, -12, 2, 1])?;
    server.add_document(3, "well groomed starling eugene", DocumentStatus::Banned, &[9])?;

    let query = "fluffy well groomed cat";
    println!("ACTIVE by default:");
    print_pages(&server.find_top_documents(query)?, 5);

    println!("BANNED:");
    print_pages(&server.find_top_documents_by_status(query, DocumentStatus::Banned)?, 5);

    println!("Even ids:");
    let even = DocumentFilter::custom(|id, _, _| id % 2 == 0);
    print_pages(&server.find_top_documents_with(query, &even)?, 5);

    if let Err(e) = server.find_top_documents("fluffy --dog") {
        println!("Error: {e}");
    }
    Ok(())
}
