use super::model::{InsertError, InsertOutcome, RecentNews};
use crate::model::{NewNewsItem, NewsItem, Region};
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

pub type Pool = SqlitePool;

/// Open the store. A single connection serves the whole run, which also keeps
/// `sqlite::memory:` databases alive for the lifetime of the pool.
pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database url {normalized}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open store at {normalized}"))?;
    debug!(url = %normalized, "store opened");
    Ok(pool)
}

/// For file-backed URLs expand a leading `~/`, create the parent directory and
/// rewrite to the `sqlite://` form. In-memory and non-sqlite URLs pass through.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }

    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return url.to_string();
    }

    let path = match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path.to_string(),
    };

    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    match query {
        Some(q) => format!("sqlite://{path}?{q}"),
        None => format!("sqlite://{path}"),
    }
}

/// Create the `regions` and `news_items` tables if they are missing.
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to initialize store schema")?;
    Ok(())
}

/// Insert every name not yet present, in list order. Returns how many rows
/// were added; zero on every run after the first.
#[instrument(skip_all)]
pub async fn seed_regions(pool: &Pool, names: &[&str]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for name in names {
        let res = sqlx::query("INSERT OR IGNORE INTO regions (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *tx)
            .await?;
        inserted += res.rows_affected();
    }
    tx.commit().await?;
    debug!(inserted, total = names.len(), "regions seeded");
    Ok(inserted)
}

#[instrument(skip_all)]
pub async fn list_regions(pool: &Pool) -> Result<Vec<Region>> {
    let regions = sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(regions)
}

/// Region name to id lookup used while tagging feed entries.
#[instrument(skip_all)]
pub async fn region_ids(pool: &Pool) -> Result<HashMap<String, i64>> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM regions")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
}

#[instrument(skip_all)]
pub async fn insert_news_item(
    pool: &Pool,
    item: &NewNewsItem,
) -> Result<InsertOutcome, InsertError> {
    let mut tx = pool.begin().await.map_err(InsertError::Storage)?;
    let outcome = insert_news_item_tx(&mut tx, item).await?;
    tx.commit().await.map_err(InsertError::Storage)?;
    Ok(outcome)
}

/// Insert a news item unless its link is already stored.
pub async fn insert_news_item_tx(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NewNewsItem,
) -> Result<InsertOutcome, InsertError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO news_items (title, link, published_date, source, region_id) VALUES (?, ?, ?, ?, ?) ON CONFLICT(link) DO NOTHING RETURNING id",
    )
    .bind(&item.title)
    .bind(&item.link)
    .bind(&item.published_date)
    .bind(&item.source)
    .bind(item.region_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(InsertError::classify)?;

    Ok(match id {
        Some(id) => InsertOutcome::Inserted(id),
        None => InsertOutcome::Duplicate,
    })
}

pub async fn count_news(pool: &Pool) -> Result<i64> {
    let cnt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_items")
        .fetch_one(pool)
        .await?;
    Ok(cnt)
}

#[instrument(skip_all)]
pub async fn fetch_news_by_link(pool: &Pool, link: &str) -> Result<Option<NewsItem>> {
    let item = sqlx::query_as::<_, NewsItem>(
        "SELECT id, title, link, published_date, source, region_id, risk_level FROM news_items WHERE link = ?",
    )
    .bind(link)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Most recently inserted items first, joined with their region name.
#[instrument(skip_all)]
pub async fn recent_news(pool: &Pool, limit: u32) -> Result<Vec<RecentNews>> {
    let rows = sqlx::query_as::<_, RecentNews>(
        "SELECT n.id AS id, r.name AS region, n.title AS title, n.source AS source, n.published_date AS published_date
         FROM news_items n
         LEFT JOIN regions r ON n.region_id = r.id
         ORDER BY n.id DESC
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
