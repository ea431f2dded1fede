//! Quiz Request Service
//!
//! This module builds the quiz prompt and hands it to the text-generation
//! collaborator. It performs exactly one call per request and does not look at
//! the shape of the reply; parsing and retry decisions belong to the session.

use crate::llm_client::TextGenerator;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Key under which the quiz prompt is looked up in a loaded prompt map.
pub const QUIZ_PROMPT_KEY: &str = "generate_quiz";

/// Prompt used when no `generate_quiz.md` template is provided.
pub const DEFAULT_QUIZ_PROMPT: &str = "나는 투자 관련 퀴즈를 만들고 싶다. 안전한 투자를 위한 경제지표관련 객관식문제를 한국어로 하나 만들어줘.
응답은 다음 형식으로 제공해줘:
Question: (문제 내용)
Options: A) 선택지1, B) 선택지2, C) 선택지3, D) 선택지4
Answer: 정답
Explanation: 설명";

/// Requests raw quiz text from a [`TextGenerator`].
#[derive(Clone)]
pub struct QuizRequester {
    generator: Arc<dyn TextGenerator>,
    prompt: String,
}

impl QuizRequester {
    /// Creates a requester that always sends `prompt`.
    pub fn new(generator: Arc<dyn TextGenerator>, prompt: impl Into<String>) -> Self {
        Self {
            generator,
            prompt: prompt.into(),
        }
    }

    /// Creates a requester from a prompt map, falling back to
    /// [`DEFAULT_QUIZ_PROMPT`] when the map has no `"generate_quiz"` entry.
    pub fn from_prompts(generator: Arc<dyn TextGenerator>, prompts: &HashMap<String, String>) -> Self {
        let prompt = prompts
            .get(QUIZ_PROMPT_KEY)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_QUIZ_PROMPT.to_string());
        Self::new(generator, prompt)
    }

    /// The prompt sent on every request.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Sends the prompt once and returns the unparsed reply.
    pub async fn request_raw(&self) -> Result<String> {
        info!("Requesting a new quiz question");
        self.generator.generate_text(&self.prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockTextGenerator;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn sends_configured_prompt_once() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate_text()
            .with(eq("custom prompt"))
            .times(1)
            .returning(|_| Ok("Question: Q".to_string()));

        let requester = QuizRequester::new(Arc::new(generator), "custom prompt");
        let raw = requester.request_raw().await.unwrap();

        assert_eq!(raw, "Question: Q");
    }

    #[tokio::test]
    async fn collaborator_errors_pass_through() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate_text()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("401 Unauthorized")));

        let requester = QuizRequester::new(Arc::new(generator), DEFAULT_QUIZ_PROMPT);
        let err = requester.request_raw().await.unwrap_err();

        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn prompt_map_overrides_default() {
        let generator = Arc::new(MockTextGenerator::new());
        let mut prompts = HashMap::new();
        prompts.insert(QUIZ_PROMPT_KEY.to_string(), "  from file \n".to_string());

        let requester = QuizRequester::from_prompts(generator, &prompts);
        assert_eq!(requester.prompt(), "from file");
    }

    #[test]
    fn missing_or_blank_prompt_falls_back_to_default() {
        let requester = QuizRequester::from_prompts(Arc::new(MockTextGenerator::new()), &HashMap::new());
        assert_eq!(requester.prompt(), DEFAULT_QUIZ_PROMPT);

        let mut prompts = HashMap::new();
        prompts.insert(QUIZ_PROMPT_KEY.to_string(), "   ".to_string());
        let requester = QuizRequester::from_prompts(Arc::new(MockTextGenerator::new()), &prompts);
        assert_eq!(requester.prompt(), DEFAULT_QUIZ_PROMPT);
    }

    #[test]
    fn default_prompt_describes_four_field_layout() {
        for prefix in ["Question:", "Options:", "Answer:", "Explanation:"] {
            assert!(DEFAULT_QUIZ_PROMPT.contains(prefix), "missing {prefix}");
        }
    }
}
