use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use disaster_watch::catalog::PROVINCES;
use disaster_watch::config;
use disaster_watch::feed::FeedClient;
use disaster_watch::ingest::match_region;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch the disaster feed and print each entry with its matched province"
)]
struct Args {
    /// Path to YAML config file (reads only `feed`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the request URL and exit without fetching
    #[arg(long)]
    url_only: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load_or_default(args.config.as_deref())?;
    let client = FeedClient::from_config(&cfg.feed)?;

    println!("GET {}", client.url());
    if args.url_only {
        return Ok(());
    }

    let entries = client.fetch().await?;
    println!("{} entries", entries.len());
    for (i, e) in entries.iter().enumerate() {
        let province = match_region(&e.title, PROVINCES).unwrap_or("-");
        println!("[{i}] {province} | {} | {} | {}", e.published, e.source, e.title);
        println!("     {}", e.link);
    }
    Ok(())
}
