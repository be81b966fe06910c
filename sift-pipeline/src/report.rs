use sift_web::{ScrapedContent, SearchResultItem};

use crate::format::{clean_text, format_url};

/// Everything a presenter needs after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub question: String,
    /// Paragraph-formatted answer text.
    pub answer: String,
    pub related_queries: Vec<String>,
    pub panels: Vec<ResultPanel>,
}

/// One search result as displayed: shortened URL, cleaned page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub title: String,
    pub link: String,
    pub display_url: String,
    pub content: String,
    /// `false` when `content` is the scrape failure placeholder.
    pub scraped: bool,
}

impl ResultPanel {
    pub fn new(item: &SearchResultItem, content: &ScrapedContent) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            display_url: format_url(&item.link),
            content: clean_text(&content.text),
            scraped: content.scraped,
        }
    }

    pub fn heading(&self) -> String {
        format!("Title: {}", self.title)
    }
}

impl Report {
    pub fn new(
        question: &str,
        answer: String,
        related_queries: Vec<String>,
        results: &[(SearchResultItem, ScrapedContent)],
    ) -> Self {
        Self {
            question: question.to_string(),
            answer,
            related_queries,
            panels: results
                .iter()
                .map(|(item, content)| ResultPanel::new(item, content))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_cleans_content_and_shortens_url() {
        let item = SearchResultItem {
            title: "Qubits".into(),
            link: format!("https://example.com/{}", "%20".repeat(80)),
            snippet: None,
        };
        let content = ScrapedContent {
            text: "  <em>two</em>\n states ".into(),
            scraped: true,
        };
        let panel = ResultPanel::new(&item, &content);
        assert_eq!(panel.heading(), "Title: Qubits");
        assert_eq!(panel.content, "two states");
        assert_eq!(panel.display_url.chars().count(), 73);
        assert_eq!(panel.link, item.link);
        assert!(panel.scraped);
    }
}
