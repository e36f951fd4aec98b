// 文件名: news.rs

use reqwest::Client;
use anyhow::{Result, Context, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use super::structs::Headline;

/// Where the headlines come from.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// At most `limit` headlines, in feed order.
    async fn fetch(&self, feed_url: &str, limit: usize) -> Result<Vec<Headline>>;
}

pub struct RssHeadlineSource {
    client: Client,
}

impl RssHeadlineSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HeadlineSource for RssHeadlineSource {
    async fn fetch(&self, feed_url: &str, limit: usize) -> Result<Vec<Headline>> {
        let resp = self.client.get(feed_url)
            .timeout(Duration::from_secs(15))
            .send()
            .await
            .with_context(|| format!("RSS request to {} failed", feed_url))?;

        if !resp.status().is_success() {
            return Err(anyhow!("RSS feed {} returned {}", feed_url, resp.status()));
        }

        let body = resp.bytes().await.context("Failed to read RSS body")?;
        let headlines = parse_headlines(&body, limit)?;
        info!("📰 RSS: {} headline(s) from {}", headlines.len(), feed_url);
        Ok(headlines)
    }
}

/// RSS / Atom → (title, link)，保持原始顺序，只取前 `limit` 条
pub fn parse_headlines(raw: &[u8], limit: usize) -> Result<Vec<Headline>> {
    let feed = feed_rs::parser::parse(raw).context("Failed to parse RSS feed")?;

    let headlines = feed.entries.into_iter()
        .take(limit)
        .map(|entry| {
            let title = entry.title.map(|t| t.content.trim().to_string()).unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.trim().to_string()).unwrap_or_default();
            Headline { title, link }
        })
        .collect();

    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Top stories</title>
    <link>https://news.example.com</link>
    <description>Headlines</description>
    <item>
      <title>Storm hits coast - The Ledger</title>
      <link>https://x/1</link>
    </item>
    <item>
      <title><![CDATA[Election results in]]></title>
      <link>https://x/2</link>
    </item>
    <item>
      <title>Markets rally</title>
      <link>https://x/3</link>
    </item>
    <item>
      <title>Bridge reopens</title>
      <link>https://x/4</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn keeps_feed_order_and_truncates() {
        let headlines = parse_headlines(SAMPLE_RSS.as_bytes(), 3).unwrap();
        assert_eq!(headlines, vec![
            Headline::new("Storm hits coast - The Ledger", "https://x/1"),
            Headline::new("Election results in", "https://x/2"),
            Headline::new("Markets rally", "https://x/3"),
        ]);
    }

    #[test]
    fn short_feed_is_not_padded() {
        let headlines = parse_headlines(SAMPLE_RSS.as_bytes(), 10).unwrap();
        assert_eq!(headlines.len(), 4);
        assert_eq!(headlines[3].link, "https://x/4");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_headlines(b"definitely not xml", 3).is_err());
    }
}
