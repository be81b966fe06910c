use sift_llm::traits::{LlmClient, LlmContent};

use crate::error::PipelineError;

/// Output budget for the expansion call; two short lines fit comfortably.
pub const EXPAND_MAX_TOKENS: u32 = 100;
pub const MAX_RELATED_QUERIES: usize = 2;

fn build_prompt(question: &str) -> String {
    format!(
        "Generate two related search queries for the following question.\n\
         The queries should differ from the original question but stay on its topic.\n\
         Reply with only the two queries, one per line, and nothing else.\n\n\
         Question: {question}\n\n\
         Related Queries:"
    )
}

/// Ask the model for up to two related queries.
///
/// A failed call is fatal; an answer we cannot read yields an empty list.
pub async fn expand_queries(
    llm: &dyn LlmClient,
    question: &str,
) -> Result<Vec<String>, PipelineError> {
    let resp = llm
        .generate(&build_prompt(question), None, Some(EXPAND_MAX_TOKENS), None)
        .await
        .map_err(PipelineError::Expand)?;

    let related = parse_related_queries(&resp.content);
    tracing::info!(
        count = related.len(),
        model = ?resp.model,
        "pipeline.expand.done"
    );
    Ok(related)
}

/// One query per non-empty line, list markers removed, first two kept.
///
/// ```
/// use sift_llm::traits::LlmContent;
/// use sift_pipeline::expand::parse_related_queries;
///
/// let content = LlmContent::PlainText("1. How do qubits work?\n\n- Quantum uses\nextra".into());
/// assert_eq!(
///     parse_related_queries(&content),
///     vec!["How do qubits work?".to_string(), "Quantum uses".to_string()]
/// );
/// ```
pub fn parse_related_queries(content: &LlmContent) -> Vec<String> {
    let Some(text) = content.extract_text() else {
        return Vec::new();
    };
    text.lines()
        .map(|line| strip_list_marker(line.trim()))
        .filter(|line| !line.is_empty())
        .take(MAX_RELATED_QUERIES)
        .map(str::to_string)
        .collect()
}

/// Drop a leading `-`, `*`, `•`, `3.` or `3)` when whitespace follows it.
fn strip_list_marker(line: &str) -> &str {
    let rest = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        rest
    } else {
        let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        match line[digits..].strip_prefix(['.', ')']) {
            Some(rest) if digits > 0 => rest,
            _ => return line,
        }
    };
    if rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        line
    }
}
