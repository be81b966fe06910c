use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_common::Result;

/// What a provider handed back as the message body.
///
/// Some providers answer with a bare string, others with a list of typed
/// content blocks where only `text` blocks carry prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LlmContent {
    PlainText(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// Tool calls, thinking, images: anything without prose we can show.
    #[serde(other)]
    Other,
}

impl LlmContent {
    /// The plain string, or the text of the first block when that block is text.
    ///
    /// ```
    /// use sift_llm::traits::{ContentBlock, LlmContent};
    ///
    /// let plain = LlmContent::PlainText("hi".into());
    /// assert_eq!(plain.extract_text(), Some("hi"));
    ///
    /// let blocks = LlmContent::Blocks(vec![ContentBlock::Other]);
    /// assert_eq!(blocks.extract_text(), None);
    /// ```
    pub fn extract_text(&self) -> Option<&str> {
        match self {
            Self::PlainText(text) => Some(text),
            Self::Blocks(blocks) => match blocks.first() {
                Some(ContentBlock::Text { text }) => Some(text),
                _ => None,
            },
        }
    }
}

impl From<String> for LlmContent {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: LlmContent,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub stop_reason: Option<String>,
}

impl LlmResponse {
    pub fn text(&self) -> Option<&str> {
        self.content.extract_text()
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
