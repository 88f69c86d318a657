use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use disaster_watch::catalog::{KEYWORDS, PROVINCES};
use disaster_watch::config;
use disaster_watch::db;
use disaster_watch::feed::FeedClient;
use disaster_watch::ingest::{self, IngestOutcome};
use disaster_watch::report;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch disaster news, tag provinces, store new items and show the latest"
)]
struct Args {
    /// Path to YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
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

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.app.database_url.clone());

    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;
    let seeded = db::seed_regions(&pool, PROVINCES)
        .await
        .context("seeding regions")?;
    info!(database_url = %database_url, seeded, "store ready");

    let client = FeedClient::from_config(&cfg.feed)?;
    println!("🔄 กำลังดึงข่าว ({})...", KEYWORDS.join(", "));
    match ingest::run(&pool, &client, cfg.feed.on_fetch_error).await? {
        IngestOutcome::Ingested(summary) => {
            println!("✅ บันทึกข่าวใหม่สำเร็จ: {} ข่าว", summary.inserted);
        }
        IngestOutcome::NoEntries => {
            println!("⚠️ ไม่พบข่าว (กรุณาตรวจสอบการเชื่อมต่ออินเทอร์เน็ต)");
        }
        IngestOutcome::FetchFailed(reason) => {
            println!("⚠️ ดึงข่าวไม่สำเร็จ: {reason}");
        }
    }

    report::show(&pool, &cfg.report).await?;
    pool.close().await;
    Ok(())
}
