/// A province from the built-in list, stored once at seed time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

/// A stored feed entry. `link` is unique across the table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub published_date: String,
    pub source: String,
    pub region_id: Option<i64>,
    pub risk_level: i64,
}

/// Row payload for inserting a news item; the store assigns `id` and `risk_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNewsItem {
    pub title: String,
    pub link: String,
    pub published_date: String,
    pub source: String,
    pub region_id: Option<i64>,
}
