//! The question-answering pipeline: expand, search, scrape, synthesize.
//!
//! Every stage is awaited in order and nothing runs in the background. The
//! LLM and search provider sit behind traits so runs can be driven by fakes;
//! scraping always goes through [`sift_web::Scraper`] and never fails a run.
//!
//! ```no_run
//! # async fn demo() -> Result<(), sift_pipeline::PipelineError> {
//! use sift_config::{EnvCredentials, SiftConfigLoader};
//! use sift_pipeline::{NoProgress, Pipeline, Presenter, TerminalPresenter};
//!
//! let config = SiftConfigLoader::new().load().expect("config");
//! let pipeline = Pipeline::from_config(&config, &EnvCredentials::new()).await?;
//! let report = pipeline.run("What is quantum computing?", &NoProgress).await?;
//! TerminalPresenter::new(std::io::stdout()).render(&report).ok();
//! # Ok(()) }
//! ```
use sift_config::{CredentialProvider, SiftConfig};
use sift_llm::traits::LlmClient;
use sift_web::{GoogleSearch, Scraper, SearchProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod cache;
pub mod error;
pub mod expand;
pub mod fetch;
pub mod format;
pub mod present;
pub mod progress;
pub mod report;
pub mod synthesize;

pub use cache::ScrapeCache;
pub use error::PipelineError;
pub use present::{ERROR_HINT, Presenter, TerminalPresenter};
pub use progress::{NoProgress, ProgressSink, Stage};
pub use report::{Report, ResultPanel};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub results_per_query: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            results_per_query: sift_web::search::DEFAULT_RESULTS_PER_QUERY,
        }
    }
}

pub struct Pipeline {
    llm: Arc<dyn LlmClient + Send + Sync>,
    search: Arc<dyn SearchProvider>,
    scraper: Scraper,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        search: Arc<dyn SearchProvider>,
        scraper: Scraper,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            llm,
            search,
            scraper,
            settings,
        }
    }

    /// Resolve credentials, then build the configured clients.
    ///
    /// Credentials are checked before any client touches the network.
    pub async fn from_config(
        config: &SiftConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<Self, PipelineError> {
        let secrets = credentials
            .required_secrets()
            .map_err(PipelineError::Setup)?;
        tracing::info!(
            source = credentials.source_name(),
            provider = ?config.llm.provider,
            "pipeline.credentials.resolved"
        );

        let llm = sift_llm::ensure_llm_ready(&config.llm_config(&secrets))
            .await
            .map_err(PipelineError::Setup)?;
        let search = GoogleSearch::with_endpoint(
            secrets.search_api_key,
            secrets.search_engine_id,
            &config.search.endpoint,
        )
        .map_err(PipelineError::Setup)?;
        let scraper = Scraper::new(
            Duration::from_secs(config.scrape.timeout_secs),
            config.scrape.max_chars,
        )
        .map_err(PipelineError::Setup)?;

        Ok(Self::new(
            llm,
            Arc::new(search),
            scraper,
            PipelineSettings {
                results_per_query: config.search.results_per_query,
            },
        ))
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Answer one question. Either a complete report or the first fatal error.
    pub async fn run(
        &self,
        question: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Report, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }
        let started = Instant::now();
        tracing::info!(question, model = self.llm.model_name(), "pipeline.run.start");

        progress.stage(Stage::Expanding);
        let related = expand::expand_queries(self.llm.as_ref(), question).await?;

        progress.stage(Stage::Searching);
        let queries: Vec<String> = std::iter::once(question.to_string())
            .chain(related.iter().cloned())
            .collect();
        let items =
            fetch::fetch_results(self.search.as_ref(), &queries, self.settings.results_per_query)
                .await?;

        progress.stage(Stage::Scraping);
        let mut cache = ScrapeCache::new();
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let content = cache.get_or_scrape(&self.scraper, &item.link).await;
            results.push((item, content));
        }
        tracing::info!(
            results = results.len(),
            distinct_links = cache.distinct_links(),
            cache_hits = cache.hits(),
            failed = results.iter().filter(|(_, c)| !c.scraped).count(),
            "pipeline.scrape.done"
        );

        progress.stage(Stage::Synthesizing);
        let context = synthesize::build_context(&results);
        let answer = synthesize::synthesize(self.llm.as_ref(), question, &context, &related).await?;

        let report = Report::new(question, format::format_answer(&answer), related, &results);
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            panels = report.panels.len(),
            "pipeline.run.done"
        );
        Ok(report)
    }
}
