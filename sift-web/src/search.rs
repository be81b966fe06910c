use async_trait::async_trait;
use serde::Deserialize;
use sift_common::{Result, SiftError};
use sift_http::{Auth, HttpClient, RequestOpts};
use std::borrow::Cow;
use std::time::Instant;

pub const GOOGLE_CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_RESULTS_PER_QUERY: u32 = 3;

const NO_TITLE: &str = "No title";
pub const NO_LINK: &str = "No link";

/// One ranked hit. Provider fields beyond these are dropped on decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResultItem {
    #[serde(default = "no_title")]
    pub title: String,
    #[serde(default = "no_link")]
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

fn no_title() -> String {
    NO_TITLE.to_string()
}

fn no_link() -> String {
    NO_LINK.to_string()
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return at most `count` items in provider rank order.
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchResultItem>>;

    fn provider_name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<SearchResultItem>,
}

/// Google Custom Search JSON API client.
#[derive(Clone)]
pub struct GoogleSearch {
    http: HttpClient,
    api_key: String,
    engine_id: String,
}

impl GoogleSearch {
    pub fn new(api_key: String, engine_id: String) -> Result<Self> {
        Self::with_endpoint(api_key, engine_id, GOOGLE_CSE_ENDPOINT)
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_endpoint(api_key: String, engine_id: String, endpoint: &str) -> Result<Self> {
        let http = HttpClient::new(endpoint)
            .map_err(|e| SiftError::Search(format!("HttpClient init failed: {e}")))?;
        Ok(Self {
            http,
            api_key,
            engine_id,
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchResultItem>> {
        let started = Instant::now();
        tracing::info!(target: "web.google", query, count, "google.search.start");

        let opts = RequestOpts {
            auth: Some(Auth::Query {
                name: "key",
                value: Cow::Borrowed(self.api_key.as_str()),
            }),
            query: Some(vec![
                ("cx", Cow::Borrowed(self.engine_id.as_str())),
                ("q", Cow::Borrowed(query)),
                ("num", Cow::Owned(count.to_string())),
            ]),
            ..Default::default()
        };

        // Empty path keeps the endpoint URL exactly as configured.
        let resp: CseResponse = match self.http.get_json("", opts).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    target: "web.google",
                    query,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "google.search.error"
                );
                return Err(SiftError::Search(e.to_string()));
            }
        };

        tracing::info!(
            target: "web.google",
            query,
            hit_count = resp.items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "google.search.success"
        );
        Ok(resp.items)
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_title_and_link_get_placeholders() {
        let item: SearchResultItem =
            serde_json::from_value(json!({"snippet": "s", "kind": "customsearch#result"}))
                .unwrap();
        assert_eq!(item.title, "No title");
        assert_eq!(item.link, "No link");
    }

    #[test]
    fn absent_items_is_an_empty_page() {
        let resp: CseResponse =
            serde_json::from_value(json!({"kind": "customsearch#search"})).unwrap();
        assert!(resp.items.is_empty());
    }
}
