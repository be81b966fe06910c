use scraper::{Html, Selector};
use sift_http::{HttpClient, RequestOpts};
use std::time::{Duration, Instant};
use url::Url;

use crate::search::NO_LINK;

/// Text shown in place of page content when a fetch or parse fails.
pub const SCRAPE_FAILED: &str = "Failed to scrape content";
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CHARS: usize = 1000;

const TEXT_SELECTOR: &str = "p, h1, h2, h3";

/// Media types we hand to the HTML parser. A missing header is parsed too.
const PARSEABLE_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];

/// Extracted page text, or the failure placeholder with `scraped == false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedContent {
    pub text: String,
    pub scraped: bool,
}

impl ScrapedContent {
    pub fn failed() -> Self {
        Self {
            text: SCRAPE_FAILED.to_string(),
            scraped: false,
        }
    }

    fn ok(text: String) -> Self {
        Self {
            text,
            scraped: true,
        }
    }
}

/// Single-attempt page fetcher. `scrape` never returns an error.
#[derive(Clone)]
pub struct Scraper {
    http: HttpClient,
    timeout: Duration,
    max_chars: usize,
}

impl Scraper {
    pub fn new(timeout: Duration, max_chars: usize) -> sift_common::Result<Self> {
        let http = HttpClient::unanchored()
            .map_err(|e| sift_common::SiftError::Config(format!("scraper init failed: {e}")))?
            .with_timeout(timeout);
        Ok(Self {
            http,
            timeout,
            max_chars,
        })
    }

    pub fn with_defaults() -> sift_common::Result<Self> {
        Self::new(DEFAULT_SCRAPE_TIMEOUT, DEFAULT_MAX_CHARS)
    }

    pub async fn scrape(&self, link: &str) -> ScrapedContent {
        if link == NO_LINK {
            return ScrapedContent::failed();
        }
        let url = match Url::parse(link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                tracing::debug!(target: "web.scrape", link, "scrape.skip.bad_url");
                return ScrapedContent::failed();
            }
        };

        let started = Instant::now();
        let opts = RequestOpts {
            timeout: Some(self.timeout),
            ..Default::default()
        };
        let page = match self.http.get_text(url.as_str(), opts).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    target: "web.scrape",
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "scrape.fetch.error"
                );
                return ScrapedContent::failed();
            }
        };

        if let Some(media) = page.media_type() {
            if !PARSEABLE_TYPES.contains(&media.as_str()) {
                tracing::debug!(target: "web.scrape", url = %url, media = %media, "scrape.skip.media_type");
                return ScrapedContent::failed();
            }
        }

        let text = extract_text(&page.body, self.max_chars);
        tracing::debug!(
            target: "web.scrape",
            url = %url,
            status = page.status.as_u16(),
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scrape.done"
        );
        ScrapedContent::ok(text)
    }
}

/// Text of every `p`, `h1`, `h2`, `h3` in document order, space-joined and
/// cut to `max_chars` characters.
///
/// ```
/// let html = "<h1>Title</h1><div>skip</div><p>Body <b>bold</b></p>";
/// assert_eq!(sift_web::scrape::extract_text(html, 1000), "Title Body bold");
/// assert_eq!(sift_web::scrape::extract_text(html, 3), "Tit");
/// ```
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse(TEXT_SELECTOR) else {
        return String::new();
    };
    let joined = doc
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(joined, max_chars)
}

fn truncate_chars(mut s: String, max_chars: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(idx);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order_across_tag_kinds() {
        let html = r#"<html><body>
            <p>one</p><h2>two</h2><ul><li>nope</li></ul><h1>three</h1><h4>nope</h4><h3>four</h3>
        </body></html>"#;
        assert_eq!(extract_text(html, 1000), "one two three four");
    }

    #[test]
    fn truncates_by_characters_not_bytes() {
        let html = format!("<p>{}</p>", "é".repeat(1500));
        let text = extract_text(&html, 1000);
        assert_eq!(text.chars().count(), 1000);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn page_without_matching_elements_is_empty_text() {
        assert_eq!(extract_text("<div>only divs</div>", 1000), "");
    }

    #[tokio::test]
    async fn no_link_and_bad_urls_fail_without_fetching() {
        let scraper = Scraper::with_defaults().unwrap();
        for link in ["No link", "", "not a url", "ftp://example.com/file"] {
            let got = scraper.scrape(link).await;
            assert_eq!(got, ScrapedContent::failed(), "link {link:?}");
        }
    }
}
