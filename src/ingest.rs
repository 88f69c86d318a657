//! Fetch, tag and store feed entries.
use crate::catalog::PROVINCES;
use crate::config::FetchFailurePolicy;
use crate::db::{self, InsertError, InsertOutcome, Pool};
use crate::feed::{FeedClient, FeedEntry};
use crate::model::NewNewsItem;
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Counters for one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Newly inserted rows that were tagged with a region.
    pub matched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested(IngestReport),
    /// The feed was reachable but held no entries.
    NoEntries,
    /// The feed could not be fetched or parsed and the policy said to carry on.
    FetchFailed(String),
}

/// First region in declared order whose name occurs in `title`.
pub fn match_region<'a>(title: &str, regions: &[&'a str]) -> Option<&'a str> {
    regions.iter().copied().find(|name| title.contains(*name))
}

fn to_new_item(entry: &FeedEntry, region_ids: &HashMap<String, i64>) -> NewNewsItem {
    let region_id =
        match_region(&entry.title, PROVINCES).and_then(|name| region_ids.get(name).copied());
    NewNewsItem {
        title: entry.title.clone(),
        link: entry.link.clone(),
        published_date: entry.published.clone(),
        source: entry.source.clone(),
        region_id,
    }
}

/// Store `entries` in one transaction. Duplicate links and rejected rows are
/// skipped; a storage failure aborts the batch.
#[instrument(skip_all, fields(entries = entries.len()))]
pub async fn ingest_entries(pool: &Pool, entries: &[FeedEntry]) -> Result<IngestReport> {
    let region_ids = db::region_ids(pool).await?;
    let mut report = IngestReport {
        fetched: entries.len(),
        ..Default::default()
    };

    let mut tx = pool.begin().await?;
    for entry in entries {
        let item = to_new_item(entry, &region_ids);
        match db::insert_news_item_tx(&mut tx, &item).await {
            Ok(InsertOutcome::Inserted(id)) => {
                report.inserted += 1;
                if item.region_id.is_some() {
                    report.matched += 1;
                }
                debug!(id, region_id = ?item.region_id, "news item stored");
            }
            Ok(InsertOutcome::Duplicate) => report.duplicates += 1,
            Err(InsertError::Rejected(err)) => {
                report.rejected += 1;
                warn!(%err, link = %item.link, "news item rejected; skipping");
            }
            Err(err @ InsertError::Storage(_)) => {
                return Err(err).context("storing news items");
            }
        }
    }
    tx.commit().await?;

    info!(
        fetched = report.fetched,
        inserted = report.inserted,
        duplicates = report.duplicates,
        rejected = report.rejected,
        matched = report.matched,
        "ingestion finished"
    );
    Ok(report)
}

/// Fetch the feed and ingest it. Under [`FetchFailurePolicy::Abort`] a failed
/// fetch is returned as an error; otherwise it becomes `FetchFailed`.
#[instrument(skip_all)]
pub async fn run(
    pool: &Pool,
    client: &FeedClient,
    policy: FetchFailurePolicy,
) -> Result<IngestOutcome> {
    let entries = match client.fetch().await {
        Ok(entries) => entries,
        Err(err) => match policy {
            FetchFailurePolicy::Abort => return Err(err),
            FetchFailurePolicy::Skip => {
                warn!(error = ?err, "feed fetch failed; keeping stored data");
                return Ok(IngestOutcome::FetchFailed(format!("{err:#}")));
            }
        },
    };

    if entries.is_empty() {
        warn!("feed returned no entries");
        return Ok(IngestOutcome::NoEntries);
    }

    let report = ingest_entries(pool, &entries).await?;
    Ok(IngestOutcome::Ingested(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_declared_region_wins() {
        let title = "น้ำท่วมที่เชียงใหม่และภูเก็ต";
        assert_eq!(match_region(title, PROVINCES), Some("เชียงใหม่"));

        let reversed = ["ภูเก็ต", "เชียงใหม่"];
        assert_eq!(match_region(title, &reversed), Some("ภูเก็ต"));
    }

    #[test]
    fn no_region_in_title() {
        assert_eq!(match_region("แผ่นดินไหวในเมียนมา", PROVINCES), None);
        assert_eq!(match_region("", PROVINCES), None);
    }

    #[test]
    fn matching_is_plain_substring() {
        // "ตาก" occurs inside a longer word; no tokenization is applied.
        assert_eq!(match_region("ไฟไหม้โกดังตากแห้ง", &["ตาก"]), Some("ตาก"));
        assert_eq!(match_region("Bangkok flood", &["bangkok"]), None);
    }

    #[test]
    fn unmatched_name_without_id_stays_untagged() {
        let entry = FeedEntry {
            title: "ไฟไหม้ที่ชลบุรี".into(),
            link: "L1".into(),
            published: "2024-01-01".into(),
            source: "X".into(),
        };
        let item = to_new_item(&entry, &HashMap::new());
        assert_eq!(item.region_id, None);

        let ids = HashMap::from([("ชลบุรี".to_string(), 9)]);
        assert_eq!(to_new_item(&entry, &ids).region_id, Some(9));
    }
}
