//! search-digest CLI - search, summarize and serve aggregated results.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use search_digest::{server, ProviderKind, QueryTerms, Search, SearchConfig};

/// search-digest - aggregate and summarize search results
#[derive(Parser)]
#[command(name = "search-digest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "SEARCH_DIGEST_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print structured results
    Search(SearchArgs),

    /// Print a deduplicated text summary
    Summary(SummaryArgs),

    /// Print a prose digest of each term's result page
    Digest(SummaryArgs),

    /// Run the HTTP server
    Serve(ServeArgs),

    /// List available providers
    Providers,
}

#[derive(Parser)]
struct SearchArgs {
    /// Query terms, searched concurrently
    #[arg(required = true)]
    terms: Vec<String>,

    /// Provider to query: google, ddg, api
    #[arg(short, long, default_value = "ddg")]
    provider: ProviderKind,

    /// Output format
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Parser)]
struct SummaryArgs {
    /// Query terms, searched concurrently
    #[arg(required = true)]
    terms: Vec<String>,

    /// Provider to query: google, ddg, api
    #[arg(short, long, default_value = "google")]
    provider: ProviderKind,

    /// Leave URLs out of the output
    #[arg(long)]
    no_url: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON array of results
    Json,
    /// Text summary with URLs
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SearchConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SearchConfig::default(),
    };

    match cli.command {
        Commands::Search(args) => run_search(&config, args).await,
        Commands::Summary(args) => run_summary(&config, args, false).await,
        Commands::Digest(args) => run_summary(&config, args, true).await,
        Commands::Serve(args) => run_serve(&config, args).await,
        Commands::Providers => list_providers(&config),
    }
}

fn list_providers(config: &SearchConfig) -> Result<()> {
    println!("Available providers:\n");
    println!("  google   - Google result pages (structured, summary, digest)");
    println!("  ddg      - DuckDuckGo (structured, summary)");
    match &config.json_api {
        Some(api) => println!("  api      - {} ({})", api.name, api.endpoint),
        None => println!("  api      - JSON API (not configured, set [json_api] in the config file)"),
    }
    println!();
    println!("Usage: search-digest search \"query\" -p ddg");
    Ok(())
}

async fn run_search(config: &SearchConfig, args: SearchArgs) -> Result<()> {
    let search = Search::from_config(config)?;
    let terms = QueryTerms::new(args.terms)?;

    match args.format {
        OutputFormat::Json => {
            let results = search.search(args.provider, &terms).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Text => {
            println!("{}", search.summary(args.provider, true, &terms).await);
        }
    }
    Ok(())
}

async fn run_summary(config: &SearchConfig, args: SummaryArgs, digest: bool) -> Result<()> {
    let search = Search::from_config(config)?;
    let terms = QueryTerms::new(args.terms)?;
    let show_url = !args.no_url;

    let text = if digest {
        search.digest(args.provider, show_url, &terms).await
    } else {
        search.summary(args.provider, show_url, &terms).await
    };
    println!("{}", text);
    Ok(())
}

async fn run_serve(config: &SearchConfig, args: ServeArgs) -> Result<()> {
    let search = Arc::new(Search::from_config(config)?);
    server::serve(search, SocketAddr::new(args.host, args.port)).await
}
