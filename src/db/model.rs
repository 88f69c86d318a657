//! Database view models and insert results used by repositories.
//!
//! Keep these structs focused on the data returned by queries. Business logic
//! should live in higher layers.

use thiserror::Error;

/// One line of the recent-news report: a news item joined with its region name.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecentNews {
    pub id: i64,
    pub region: Option<String>,
    pub title: String,
    pub source: String,
    pub published_date: String,
}

/// Result of inserting a news item keyed by its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// A row with the same link already exists; nothing was written.
    Duplicate,
}

/// Failure while inserting a news item.
#[derive(Debug, Error)]
pub enum InsertError {
    /// The row violated a constraint other than link uniqueness. Safe to skip.
    #[error("row rejected by store: {0}")]
    Rejected(#[source] sqlx::Error),
    /// The store itself failed; callers should stop.
    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),
}

impl InsertError {
    pub(crate) fn classify(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if !matches!(db.kind(), sqlx::error::ErrorKind::Other) => {
                InsertError::Rejected(err)
            }
            _ => InsertError::Storage(err),
        }
    }
}
