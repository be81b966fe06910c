use std::fmt;

/// Pipeline phases, reported in this order on every successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Expanding,
    Searching,
    Scraping,
    Synthesizing,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Expanding => "Generating related queries...",
            Self::Searching => "Searching the web...",
            Self::Scraping => "Scraping result pages...",
            Self::Synthesizing => "Generating answer...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives stage changes while a run is in flight.
pub trait ProgressSink: Send + Sync {
    fn stage(&self, stage: Stage);
}

impl<F> ProgressSink for F
where
    F: Fn(Stage) + Send + Sync,
{
    fn stage(&self, stage: Stage) {
        self(stage)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage(&self, _stage: Stage) {}
}
