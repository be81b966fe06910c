use sift_common::SiftError;
use thiserror::Error;

/// Everything that can stop a pipeline run. Scrape failures never appear
/// here; they become placeholder content instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("question is empty")]
    EmptyQuestion,

    /// Credentials, client construction, provider readiness.
    #[error("setup failed: {0}")]
    Setup(#[source] SiftError),

    #[error("query expansion failed: {0}")]
    Expand(#[source] SiftError),

    #[error("search failed for {query:?}: {source}")]
    Search {
        query: String,
        #[source]
        source: SiftError,
    },

    #[error("answer generation failed: {0}")]
    Synthesize(#[source] SiftError),
}
