//! Feed search URL construction, HTTP fetch and RSS parsing.
use crate::catalog;
use crate::config;
use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// One parsed feed entry, ready for region matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Publication date exactly as the feed wrote it.
    pub published: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

/// Build the search URL for the fixed keyword set and the configured locale.
pub fn build_feed_url(cfg: &config::Feed) -> Result<Url> {
    let query = urlencoding::encode(&catalog::search_query()).into_owned();
    let raw = format!(
        "{}?q={}&hl={}&gl={}&ceid={}",
        cfg.endpoint.trim_end_matches('?'),
        query,
        cfg.hl,
        cfg.gl,
        cfg.ceid
    );
    Url::parse(&raw).with_context(|| format!("invalid feed url {raw}"))
}

/// Parse an RSS 2.0 document. Entries lacking a title or link are dropped;
/// a missing or blank `<source>` falls back to `source_fallback`.
pub fn parse_feed(xml: &str, source_fallback: &str) -> Result<Vec<FeedEntry>> {
    let rss: Rss = from_str(xml).context("parsing feed xml")?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let (Some(title), Some(link)) = (non_blank(it.title), non_blank(it.link)) else {
            debug!("skipping feed item without title or link");
            continue;
        };
        let source = it
            .source
            .and_then(|s| non_blank(s.name))
            .unwrap_or_else(|| source_fallback.to_string());
        out.push(FeedEntry {
            title,
            link,
            published: it.pub_date.unwrap_or_default(),
            source,
        });
    }
    Ok(out)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    url: Url,
    source_fallback: String,
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl FeedClient {
    pub fn from_config(cfg: &config::Feed) -> Result<Self> {
        let url = build_feed_url(cfg)?;
        Self::with_url(
            url,
            cfg.timeout_secs.map(Duration::from_secs),
            cfg.source_fallback.clone(),
        )
    }

    pub fn with_url(url: Url, timeout: Option<Duration>, source_fallback: String) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("disaster-watch/", env!("CARGO_PKG_VERSION")))
            .no_proxy();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self {
            http,
            url,
            source_fallback,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download and parse the feed. Transport errors, non-2xx statuses and
    /// unparsable bodies are all returned as errors.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        let res = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .context("failed to reach feed endpoint")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("feed endpoint returned {status}"));
        }

        let body = res.text().await.context("failed to read feed body")?;
        let entries = parse_feed(&body, &self.source_fallback)?;
        debug!(entries = entries.len(), "feed parsed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"น้ำท่วม ไฟไหม้" - Google News</title>
    <link>https://news.google.com/search?q=x</link>
    <language>th</language>
    <item>
      <title>เกิดไฟไหม้ที่กรุงเทพมหานคร - ไทยรัฐ</title>
      <link>https://news.google.com/rss/articles/A1</link>
      <guid isPermaLink="false">A1</guid>
      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
      <description>&lt;a href="https://example.com"&gt;x&lt;/a&gt;</description>
      <source url="https://www.thairath.co.th">ไทยรัฐ</source>
    </item>
    <item>
      <title>น้ำท่วมหนัก</title>
      <link>https://news.google.com/rss/articles/A2</link>
      <pubDate>Tue, 02 Jan 2024 08:30:00 GMT</pubDate>
    </item>
    <item>
      <title>   </title>
      <link>https://news.google.com/rss/articles/A3</link>
    </item>
    <item>
      <title>ดินถล่ม</title>
      <link>https://news.google.com/rss/articles/A4</link>
      <source url="https://example.com"></source>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_source_fallback() {
        let entries = parse_feed(SAMPLE, "Google News").unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "เกิดไฟไหม้ที่กรุงเทพมหานคร - ไทยรัฐ");
        assert_eq!(entries[0].link, "https://news.google.com/rss/articles/A1");
        assert_eq!(entries[0].published, "Mon, 01 Jan 2024 10:00:00 GMT");
        assert_eq!(entries[0].source, "ไทยรัฐ");

        assert_eq!(entries[1].source, "Google News");
        assert_eq!(entries[2].published, "");
        assert_eq!(entries[2].source, "Google News");
    }

    #[test]
    fn items_split_by_channel_elements_are_all_kept() {
        let xml = r#"<rss version="2.0"><channel>
  <item><title>ไฟไหม้</title><link>L1</link></item>
  <item><title>น้ำท่วม</title><link>L2</link></item>
  <lastBuildDate>Mon, 01 Jan 2024 12:00:00 GMT</lastBuildDate>
  <item><title>ดินถล่ม</title><link>L3</link></item>
</channel></rss>"#;
        let entries = parse_feed(xml, "Google News").unwrap();
        let links: Vec<&str> = entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, ["L1", "L2", "L3"]);
    }

    #[test]
    fn published_date_is_kept_verbatim() {
        let xml = r#"<rss version="2.0"><channel>
  <item><title>ไฟไหม้</title><link>L1</link><pubDate>เมื่อวาน 25:99 น.</pubDate></item>
</channel></rss>"#;
        let entries = parse_feed(xml, "Google News").unwrap();
        assert_eq!(entries[0].published, "เมื่อวาน 25:99 น.");
    }

    #[test]
    fn channel_without_items_is_empty() {
        let xml = "<rss version=\"2.0\"><channel><title>none</title></channel></rss>";
        assert!(parse_feed(xml, "Google News").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("<html><body>503</body>", "Google News").is_err());
    }

    #[test]
    fn default_url_encodes_query_and_keeps_locale() {
        let url = build_feed_url(&config::Feed::default()).unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://news.google.com/rss/search?q="));
        // "น" is U+0E19
        assert!(s.contains("q=%E0%B8%99"));
        assert!(s.contains("%20"));
        assert!(!s.contains(' '));
        assert!(s.ends_with("&hl=th-TH&gl=TH&ceid=TH:th"));
    }
}
