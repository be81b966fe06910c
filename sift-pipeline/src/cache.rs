use sift_web::{ScrapedContent, Scraper};
use std::collections::HashMap;

/// Scrape results for one pipeline run, keyed by link.
///
/// The synthesizer's context and the result panels read the same entry, so a
/// page is fetched at most once per run and both views agree on its text.
#[derive(Debug, Default)]
pub struct ScrapeCache {
    entries: HashMap<String, ScrapedContent>,
    hits: usize,
}

impl ScrapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_scrape(&mut self, scraper: &Scraper, link: &str) -> ScrapedContent {
        if let Some(hit) = self.entries.get(link) {
            self.hits += 1;
            return hit.clone();
        }
        let content = scraper.scrape(link).await;
        self.entries.insert(link.to_string(), content.clone());
        content
    }

    /// Links fetched so far, each counted once.
    pub fn distinct_links(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_links_are_served_from_the_cache() {
        let scraper = Scraper::with_defaults().unwrap();
        let mut cache = ScrapeCache::new();

        let first = cache.get_or_scrape(&scraper, "No link").await;
        let second = cache.get_or_scrape(&scraper, "No link").await;

        assert_eq!(first, second);
        assert!(!first.scraped);
        assert_eq!(cache.distinct_links(), 1);
        assert_eq!(cache.hits(), 1);
    }
}
