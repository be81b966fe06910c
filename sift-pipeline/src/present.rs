use std::error::Error;
use std::io::{self, Write};

use crate::report::Report;

/// Shown under every fatal error.
pub const ERROR_HINT: &str = "Please check your API keys and try again.";

/// Receives exactly one of a complete report or an error per run.
pub trait Presenter {
    fn render(&mut self, report: &Report) -> io::Result<()>;

    fn render_error(&mut self, error: &(dyn Error + 'static)) -> io::Result<()>;
}

/// Markdown-ish plain text for terminals and pipes.
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, report: &Report) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "## Answer\n")?;
        writeln!(out, "{}\n", report.answer)?;

        writeln!(out, "## Related Queries\n")?;
        for query in &report.related_queries {
            writeln!(out, "- {query}")?;
        }
        writeln!(out)?;

        writeln!(out, "## Search Results and Scraped Content")?;
        for panel in &report.panels {
            writeln!(out, "\n### {}", panel.heading())?;
            writeln!(out, "URL: {}", panel.display_url)?;
            writeln!(out, "Content: {}", panel.content)?;
        }
        out.flush()
    }

    fn render_error(&mut self, error: &(dyn Error + 'static)) -> io::Result<()> {
        writeln!(self.out, "An error occurred: {error}")?;
        let mut source = error.source();
        while let Some(cause) = source {
            writeln!(self.out, "  caused by: {cause}")?;
            source = cause.source();
        }
        writeln!(self.out, "{ERROR_HINT}")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::report::ResultPanel;
    use sift_common::SiftError;

    fn report() -> Report {
        Report {
            question: "q".into(),
            answer: "First.\n\nSecond.".into(),
            related_queries: vec!["r1".into(), "r2".into()],
            panels: vec![ResultPanel {
                title: "T".into(),
                link: "https://t.example".into(),
                display_url: "https://t.example".into(),
                content: "body".into(),
                scraped: true,
            }],
        }
    }

    #[test]
    fn renders_all_three_sections() {
        let mut p = TerminalPresenter::new(Vec::new());
        p.render(&report()).unwrap();
        let text = String::from_utf8(p.into_inner()).unwrap();

        assert!(text.starts_with("## Answer\n\nFirst.\n\nSecond.\n"));
        assert!(text.contains("## Related Queries\n\n- r1\n- r2\n"));
        assert!(text.contains("### Title: T\nURL: https://t.example\nContent: body\n"));
    }

    #[test]
    fn error_output_carries_the_hint_and_nothing_else() {
        let err = PipelineError::Search {
            query: "q".into(),
            source: SiftError::Search("API key not valid".into()),
        };
        let mut p = TerminalPresenter::new(Vec::new());
        p.render_error(&err).unwrap();
        let text = String::from_utf8(p.into_inner()).unwrap();

        assert!(text.contains("API key not valid"));
        assert!(text.trim_end().ends_with(ERROR_HINT));
        assert!(!text.contains("## Answer"));
    }
}
