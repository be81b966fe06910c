use async_trait::async_trait;
use sift_common::{Result as SiftResult, SiftError};
use sift_llm::traits::{ContentBlock, LlmClient, LlmContent, LlmResponse};
use sift_pipeline::{
    ERROR_HINT, NoProgress, Pipeline, PipelineError, PipelineSettings, Presenter, Stage,
    TerminalPresenter,
};
use sift_web::{Scraper, SearchProvider, SearchResultItem};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays canned contents in order and records every prompt.
struct ScriptedLlm {
    replies: Mutex<Vec<LlmContent>>,
    prompts: Mutex<Vec<(String, Option<u32>)>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<LlmContent>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<(String, Option<u32>)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> SiftResult<LlmResponse> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| SiftError::Llm("no scripted reply left".into()))?;
        Ok(LlmResponse {
            content,
            model: Some("scripted".into()),
            tokens_used: None,
            stop_reason: None,
        })
    }

    async fn health_check(&self) -> SiftResult<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Three hits per query, all pointing at the page server.
struct PageSearch {
    base: String,
    queries: Mutex<Vec<(String, u32)>>,
    fail: bool,
}

impl PageSearch {
    fn new(base: String) -> Self {
        Self {
            base,
            queries: Mutex::new(Vec::new()),
            fail: false,
        }
    }
}

#[async_trait]
impl SearchProvider for PageSearch {
    async fn search(&self, query: &str, count: u32) -> SiftResult<Vec<SearchResultItem>> {
        self.queries.lock().unwrap().push((query.to_string(), count));
        if self.fail {
            return Err(SiftError::Search("API key not valid".into()));
        }
        let n = self.queries.lock().unwrap().len();
        Ok(vec![
            SearchResultItem {
                title: format!("Result {n}a"),
                link: format!("{}/page/{n}", self.base),
                snippet: None,
            },
            SearchResultItem {
                title: format!("Result {n}b"),
                link: format!("{}/shared", self.base),
                snippet: None,
            },
            SearchResultItem {
                title: "No title".into(),
                link: "No link".into(),
                snippet: None,
            },
        ])
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Pages `/page/1..=3` and `/shared`. With `fetched_once`, each must be
/// requested exactly once before the server is dropped.
async fn page_server(fetched_once: bool) -> MockServer {
    let server = MockServer::start().await;
    let expected = if fetched_once { 1..=1 } else { 0..=u64::MAX };
    for n in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/page/{n}")))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!("<h1>Page {n}</h1><p>Qubits hold <b>superposed</b> states.</p>"),
                "text/html",
            ))
            .expect(expected.clone())
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>Shared page</p>", "text/html"),
        )
        .expect(expected)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn answers_with_related_queries_and_one_panel_per_result() {
    let server = page_server(true).await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        LlmContent::Blocks(vec![ContentBlock::Text {
            text: "How do qubits work?\nWhat are quantum computing applications?".into(),
        }]),
        LlmContent::PlainText("Quantum computers use qubits.\n\n\n  They exploit superposition.  ".into()),
    ]));
    let search = Arc::new(PageSearch::new(server.uri()));
    let pipeline = Pipeline::new(
        llm.clone(),
        search.clone(),
        Scraper::with_defaults().unwrap(),
        PipelineSettings::default(),
    );

    let stages = Mutex::new(Vec::new());
    let progress = |stage: Stage| stages.lock().unwrap().push(stage);
    let report = pipeline
        .run("  What is quantum computing?  ", &progress)
        .await
        .expect("run");

    assert_eq!(
        *stages.lock().unwrap(),
        vec![Stage::Expanding, Stage::Searching, Stage::Scraping, Stage::Synthesizing]
    );

    let issued = search.queries.lock().unwrap().clone();
    assert_eq!(
        issued,
        vec![
            ("What is quantum computing?".to_string(), 3),
            ("How do qubits work?".to_string(), 3),
            ("What are quantum computing applications?".to_string(), 3),
        ]
    );

    assert_eq!(report.related_queries.len(), 2);
    assert_eq!(report.panels.len(), 9);
    assert_eq!(report.answer, "Quantum computers use qubits.\n\nThey exploit superposition.");
    assert_eq!(report.panels[0].content, "Page 1 Qubits hold superposed states.");
    assert!(report.panels[0].scraped);
    assert_eq!(report.panels[1].content, "Shared page");
    assert_eq!(report.panels[2].content, "Failed to scrape content");
    assert!(!report.panels[2].scraped);

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].1, Some(100));
    assert_eq!(prompts[1].1, Some(4000));
    let synthesis = &prompts[1].0;
    assert!(synthesis.contains("How do qubits work?, What are quantum computing applications?"));
    for n in 1..=3 {
        assert!(synthesis.contains(&format!(
            "Title: Result {n}a\nURL: {}/page/{n}\nContent: Page {n} Qubits hold superposed states.\n",
            server.uri()
        )));
    }

    let mut out = TerminalPresenter::new(Vec::new());
    out.render(&report).unwrap();
    let text = String::from_utf8(out.into_inner()).unwrap();
    assert_eq!(text.matches("\n- ").count(), 2);
    assert_eq!(text.matches("### Title: ").count(), 9);
    // `.expect(1)` on every page verifies each link was fetched once.
}

#[tokio::test]
async fn unreadable_expansion_still_searches_the_question() {
    let server = page_server(false).await;
    let llm = Arc::new(ScriptedLlm::new(vec![
        LlmContent::Blocks(vec![ContentBlock::Other]),
        LlmContent::Blocks(vec![]),
    ]));
    let search = Arc::new(PageSearch::new(server.uri()));
    let pipeline = Pipeline::new(
        llm,
        search.clone(),
        Scraper::with_defaults().unwrap(),
        PipelineSettings::default(),
    );

    let report = pipeline.run("q", &NoProgress).await.expect("run");

    assert!(report.related_queries.is_empty());
    assert_eq!(search.queries.lock().unwrap().len(), 1);
    assert_eq!(report.panels.len(), 3);
    assert_eq!(report.answer, sift_pipeline::synthesize::FALLBACK_ANSWER);
}

#[tokio::test]
async fn search_failure_yields_only_an_error() {
    let llm = Arc::new(ScriptedLlm::new(vec![LlmContent::PlainText("a\nb".into())]));
    let mut search = PageSearch::new("http://127.0.0.1:9".into());
    search.fail = true;
    let pipeline = Pipeline::new(
        llm.clone(),
        Arc::new(search),
        Scraper::with_defaults().unwrap(),
        PipelineSettings::default(),
    );

    let err = pipeline.run("q", &NoProgress).await.unwrap_err();
    assert!(matches!(&err, PipelineError::Search { query, .. } if query == "q"));
    assert_eq!(llm.prompts().len(), 1, "no synthesis after a failed search");

    let mut out = TerminalPresenter::new(Vec::new());
    out.render_error(&err).unwrap();
    let text = String::from_utf8(out.into_inner()).unwrap();
    assert!(text.contains("API key not valid"));
    assert!(text.contains(ERROR_HINT));
    assert!(!text.contains("## Answer"));
}

#[tokio::test]
async fn llm_failure_is_fatal_and_blank_questions_are_refused() {
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let pipeline = Pipeline::new(
        llm,
        Arc::new(PageSearch::new("http://127.0.0.1:9".into())),
        Scraper::with_defaults().unwrap(),
        PipelineSettings::default(),
    );

    assert!(matches!(
        pipeline.run("   ", &NoProgress).await,
        Err(PipelineError::EmptyQuestion)
    ));
    assert!(matches!(
        pipeline.run("q", &NoProgress).await,
        Err(PipelineError::Expand(SiftError::Llm(_)))
    ));
}
