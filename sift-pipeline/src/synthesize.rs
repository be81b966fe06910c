use sift_llm::traits::{LlmClient, LlmContent};
use sift_web::{ScrapedContent, SearchResultItem};

use crate::error::PipelineError;

pub const ANSWER_MAX_TOKENS: u32 = 4000;
pub const FALLBACK_ANSWER: &str =
    "I'm sorry, I couldn't generate an answer from the available information.";

/// Title/URL/Content blocks, one per result, in result order.
///
/// ```
/// use sift_pipeline::synthesize::build_context;
/// use sift_web::{ScrapedContent, SearchResultItem};
///
/// let item = SearchResultItem {
///     title: "Qubits".into(),
///     link: "https://example.com/q".into(),
///     snippet: None,
/// };
/// let content = ScrapedContent { text: "two states".into(), scraped: true };
/// assert_eq!(
///     build_context(&[(item, content)]),
///     "Title: Qubits\nURL: https://example.com/q\nContent: two states\n"
/// );
/// ```
pub fn build_context(results: &[(SearchResultItem, ScrapedContent)]) -> String {
    results
        .iter()
        .map(|(item, content)| {
            format!(
                "Title: {}\nURL: {}\nContent: {}\n",
                item.title, item.link, content.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(question: &str, context: &str, related: &[String]) -> String {
    format!(
        "You are an assistant answering questions from the most recent information available.\n\
         Use the search results and scraped page content below to answer the user's question.\n\
         If they do not contain the relevant details, answer from your own knowledge instead.\n\n\
         Original Question: {question}\n\n\
         Related Queries:\n{related}\n\n\
         Search Results and Scraped Content:\n{context}\n\n\
         Give a comprehensive and accurate answer and cite sources where available.\n\
         Also note how the related queries contributed to the answer, if they did.",
        related = related.join(", "),
    )
}

/// Ask the model for the final answer. The raw content is returned; use
/// [`answer_text`] or `format::format_answer` to read it.
pub async fn synthesize(
    llm: &dyn LlmClient,
    question: &str,
    context: &str,
    related: &[String],
) -> Result<LlmContent, PipelineError> {
    let prompt = build_prompt(question, context, related);
    let resp = llm
        .generate(&prompt, None, Some(ANSWER_MAX_TOKENS), None)
        .await
        .map_err(PipelineError::Synthesize)?;

    tracing::info!(
        prompt_chars = prompt.chars().count(),
        tokens_used = ?resp.tokens_used,
        stop_reason = ?resp.stop_reason,
        has_text = resp.text().is_some(),
        "pipeline.synthesize.done"
    );
    Ok(resp.content)
}

/// The answer's text, or [`FALLBACK_ANSWER`] when the model sent none.
pub fn answer_text(content: &LlmContent) -> &str {
    content.extract_text().unwrap_or(FALLBACK_ANSWER)
}
