//! Stock comparison MCP server over stdio

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use stock_analytics::{
    CacheBackend, MarketDataFetcher, StockAnalyzer, StockConfig, TwelveDataClient, cache,
    register_tools,
};
use stock_mcp::McpServer;
use stock_tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "stock-comparison-server")]
#[command(about = "MCP server comparing stocks and building HRP portfolios", long_about = None)]
struct Args {
    /// Directory for cached API responses (default: ~/.stock_mcp_cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Keep cached responses in memory only
    #[arg(long)]
    memory_cache: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build_config(args: &Args) -> anyhow::Result<StockConfig> {
    let mut builder = StockConfig::builder().with_env_api_key();
    if let Some(dir) = &args.cache_dir {
        builder = builder.cache_dir(dir.clone());
    }
    if args.memory_cache {
        builder = builder.cache_backend(CacheBackend::Memory);
    }
    builder.build().context("invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    stock_utils::init_tracing_with_level(&args.log_level);

    let config = Arc::new(build_config(&args)?);
    if config.api_key.is_none() {
        tracing::warn!("TWELVE_DATA_API_KEY is not set; data requests will fail");
    }

    let store = cache::from_config(&config).context("failed to open cache")?;
    let client = TwelveDataClient::new(Arc::clone(&config)).context("failed to build HTTP client")?;
    let fetcher = MarketDataFetcher::new(Arc::new(client), store, Arc::clone(&config));
    let analyzer = StockAnalyzer::new(fetcher);

    let registry = Arc::new(ToolRegistry::new());
    register_tools(&registry, &analyzer);

    info!(
        "Cache: {:?} at {}",
        config.cache_backend,
        config.cache_dir.display()
    );

    let server = McpServer::new(&stock_utils::Config::default(), registry);
    server.serve_stdio().await?;

    Ok(())
}
