use ratatui::style::Style;
use sift_pipeline::Report;

use crate::styles;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub text: String,
    pub style: Style,
}

impl TranscriptLine {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// The latest report plus which of its panels are open.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub report: Report,
    expanded: Vec<bool>,
    selected: Option<usize>,
}

impl ReportView {
    /// Panels start collapsed with nothing selected.
    pub fn new(report: Report) -> Self {
        let expanded = vec![false; report.panels.len()];
        Self {
            report,
            expanded,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_expanded(&self, idx: usize) -> bool {
        self.expanded.get(idx).copied().unwrap_or(false)
    }

    /// Move the selection forward (or back), wrapping around.
    pub fn cycle_selection(&mut self, forward: bool) {
        let n = self.expanded.len();
        if n == 0 {
            return;
        }
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        });
    }

    pub fn toggle_selected(&mut self) -> bool {
        match self.selected {
            Some(i) => {
                self.expanded[i] = !self.expanded[i];
                true
            }
            None => false,
        }
    }

    /// Returns false when `idx` is out of range.
    pub fn set_expanded(&mut self, idx: usize, open: bool) -> bool {
        match self.expanded.get_mut(idx) {
            Some(slot) => {
                *slot = open;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, open: bool) {
        self.expanded.iter_mut().for_each(|slot| *slot = open);
    }

    pub fn lines(&self) -> Vec<TranscriptLine> {
        let report = &self.report;
        let mut out = Vec::new();

        out.push(TranscriptLine::new("Answer", styles::section()));
        for paragraph in report.answer.split("\n\n") {
            out.push(TranscriptLine::new(format!("  {paragraph}"), styles::answer()));
            out.push(TranscriptLine::new("", styles::answer()));
        }

        out.push(TranscriptLine::new("Related Queries", styles::section()));
        if report.related_queries.is_empty() {
            out.push(TranscriptLine::new("  (none)", styles::dim()));
        }
        for query in &report.related_queries {
            out.push(TranscriptLine::new(format!("  - {query}"), styles::value()));
        }
        out.push(TranscriptLine::new("", styles::value()));

        out.push(TranscriptLine::new(
            "Search Results and Scraped Content",
            styles::section(),
        ));
        for (idx, panel) in report.panels.iter().enumerate() {
            let open = self.is_expanded(idx);
            let marker = if open { '▾' } else { '▸' };
            let header_style = if self.selected == Some(idx) {
                styles::selected()
            } else if panel.scraped {
                styles::panel_title()
            } else {
                styles::dim()
            };
            out.push(TranscriptLine::new(
                format!("{marker} {}. {}", idx + 1, panel.heading()),
                header_style,
            ));
            if open {
                let body = if panel.scraped {
                    styles::value()
                } else {
                    styles::dim()
                };
                out.push(TranscriptLine::new(
                    format!("    URL: {}", panel.display_url),
                    styles::label(),
                ));
                out.push(TranscriptLine::new(
                    format!("    Content: {}", panel.content),
                    body,
                ));
            }
        }
        out.push(TranscriptLine::new("", styles::value()));
        out
    }
}
