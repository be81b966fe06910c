//! Web discovery and acquisition utilities.
//!
//! - Google Custom Search client behind the [`search::SearchProvider`] seam
//! - Page fetcher with paragraph/heading text extraction (`scrape`)
//!
//! Both go through `sift_http::HttpClient`, which never retries; a search
//! failure is the caller's to handle, a scrape failure is folded into a
//! placeholder by [`scrape::Scraper`].

pub mod scrape;
pub mod search;

pub use scrape::{SCRAPE_FAILED, ScrapedContent, Scraper};
pub use search::{GoogleSearch, SearchProvider, SearchResultItem};
