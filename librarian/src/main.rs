use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use warp::Filter;

use librarian::agents::{ChromaIndex, RetrievalIndex};
use librarian::chroma_client::ChromaClient;
use librarian::config::Config;
use librarian::openai_client::OpenAiClient;
use librarian::{api, build_librarian, cli, error, middleware, seed, telemetry};

#[derive(Parser)]
#[command(name = "librarian", version, about = "Recommends one book for a free-text question")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive question loop.
    Ask {
        /// Number of candidates to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Answer a single question and exit.
    Query {
        /// The question.
        text: String,

        /// Number of candidates to retrieve.
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API.
    Serve,

    /// Index a Markdown corpus of short descriptions.
    Seed {
        /// Markdown file with `## Title: ...` blocks.
        #[arg(long)]
        md: PathBuf,

        /// Run a sample query after seeding.
        #[arg(long)]
        test_query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    telemetry::init_tracing(&config);
    info!("Configuration loaded");

    match cli.command {
        Commands::Ask { top_k } => {
            let top_k = config.top_k(top_k)?;
            let librarian = build_librarian(&config)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::run_repl(&librarian, top_k, stdin, tokio::io::stdout()).await?;
        }
        Commands::Query { text, top_k, json } => {
            let top_k = config.top_k(top_k)?;
            let query = text.trim();
            if query.is_empty() {
                bail!("query must not be empty");
            }
            let librarian = build_librarian(&config)?;
            let result = librarian.recommend(query, top_k).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", cli::render(&result));
            }
        }
        Commands::Serve => serve(config).await?,
        Commands::Seed { md, test_query } => seed_corpus(&config, &md, test_query).await?,
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Starting Smart Librarian API");

    let librarian = Arc::new(build_librarian(&config)?);
    let port = config.port;
    let config = Arc::new(config);

    let api_routes = api::routes(librarian, config)
        .recover(error::handle_rejection)
        .with(warp::log("api"))
        .with(middleware::cors());

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        let (buffer, content_type) = telemetry::render_metrics();
        warp::reply::with_header(buffer, "Content-Type", content_type)
    });

    let routes = health.or(metrics).or(api_routes);

    let addr = ([0, 0, 0, 0], port);
    info!("Server listening on {}", port);

    warp::serve(routes).run(addr).await;

    Ok(())
}

async fn seed_corpus(
    config: &Config,
    md: &Path,
    test_query: Option<String>,
) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(md)
        .await
        .with_context(|| format!("cannot read {}", md.display()))?;
    let entries = seed::parse_corpus(&text);
    if entries.is_empty() {
        bail!("No documents parsed from Markdown. Check the format (## Title: ...)");
    }

    let openai = Arc::new(OpenAiClient::new(config)?);
    let chroma = ChromaClient::new(&config.chroma_url, config.request_timeout())?;

    let count =
        seed::seed_collection(&chroma, openai.as_ref(), &config.collection_name, &entries).await?;
    println!(
        "Upserted {} documents into '{}' using {}.",
        count,
        config.collection_name,
        openai.embedding_model()
    );

    if let Some(query) = test_query {
        println!("\nTesting query: {:?}", query);
        let index = ChromaIndex::new(chroma, config.collection_name.clone(), openai);
        for (rank, candidate) in index.retrieve(&query, 5).await?.iter().enumerate() {
            println!("{}. {}", rank + 1, candidate.title);
        }
    }

    Ok(())
}
