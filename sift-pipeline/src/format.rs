//! Display-only text shaping. Nothing here feeds back into prompts.
use percent_encoding::percent_decode_str;
use regex::Regex;
use sift_llm::traits::LlmContent;
use std::sync::LazyLock;

use crate::synthesize::answer_text;

pub const URL_DISPLAY_CHARS: usize = 70;
const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("valid regex"));

/// Remove tag-like substrings, collapse whitespace runs, trim.
///
/// ```
/// use sift_pipeline::format::clean_text;
///
/// assert_eq!(clean_text("  <b>Hello</b>\n\t world  "), "Hello world");
/// ```
pub fn clean_text(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Percent-decode, then cut to 70 characters plus `...` when longer.
///
/// ```
/// use sift_pipeline::format::format_url;
///
/// assert_eq!(format_url("https://ko.wikipedia.org/wiki/%EC%96%91%EC%9E%90"), "https://ko.wikipedia.org/wiki/양자");
/// ```
pub fn format_url(url: &str) -> String {
    let decoded = percent_decode_str(url).decode_utf8_lossy();
    match decoded.char_indices().nth(URL_DISPLAY_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &decoded[..cut]),
        None => decoded.into_owned(),
    }
}

/// Answer text as paragraphs: one per non-blank line, blank line between.
pub fn format_answer(content: &LlmContent) -> String {
    format_answer_text(answer_text(content))
}

pub fn format_answer_text(text: &str) -> String {
    let collapsed = NEWLINES_RE.replace_all(text, "\n");
    collapsed
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
