//! Console rendering of the most recent news items.
use crate::config;
use crate::db::{self, Pool, RecentNews};
use anyhow::Result;
use comfy_table::{presets::ASCII_FULL_CONDENSED, Table};

/// Printed instead of a table when the store holds no news.
pub const EMPTY_MESSAGE: &str = "❌ ยังไม่มีข้อมูลในฐานข้อมูล";

/// Province column value for items without a region.
pub const UNSPECIFIED_REGION: &str = "ไม่ระบุ";

/// Printed under the table: province tags come from title substrings only.
pub const TAGGING_NOTE: &str =
    "💡 Note: ข้อมูลจริงอาจระบุจังหวัดไม่ได้ครบถ้วน (จังหวัดจับคู่จากชื่อในหัวข่าวเท่านั้น)";

const ELLIPSIS: &str = "...";

/// Keep at most `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    match title.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &title[..idx], ELLIPSIS),
        None => title.to_string(),
    }
}

/// First `chars` characters of the feed's date string.
pub fn date_prefix(date: &str, chars: usize) -> &str {
    match date.char_indices().nth(chars) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}

/// Render rows as an aligned table followed by [`TAGGING_NOTE`], or
/// [`EMPTY_MESSAGE`] when there are none.
pub fn render(rows: &[RecentNews], cfg: &config::Report) -> String {
    if rows.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED);
    table.set_header(vec!["ID", "Province", "Title", "Source", "Date"]);
    for row in rows {
        table.add_row(vec![
            row.id.to_string(),
            row.region.as_deref().unwrap_or(UNSPECIFIED_REGION).to_string(),
            truncate_title(&row.title, cfg.title_max_chars),
            row.source.clone(),
            date_prefix(&row.published_date, cfg.date_prefix_chars).to_string(),
        ]);
    }
    format!("{table}\n\n{TAGGING_NOTE}")
}

/// Print the banner and the latest `cfg.limit` items to stdout.
pub async fn show(pool: &Pool, cfg: &config::Report) -> Result<()> {
    let rows = db::recent_news(pool, cfg.limit).await?;
    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!(" 📊 DIGITAL ANALYTICS: CRISIS DATA PIPELINE");
    println!("{rule}");
    println!("{}", render(&rows, cfg));
    Ok(())
}
