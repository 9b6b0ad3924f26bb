//! Scoring: arbitrate between the current best response and a challenger.
//!
//! When a plan ends with a proposed final answer, the supervisor does not
//! take it on faith. A [`Scorer`] grades both responses against the
//! original request and the challenger only wins on a strictly higher
//! grade.

use crate::completion::{CompletionError, CompletionModel};
use crate::planner::extract_json_fence;
use async_trait::async_trait;
use ensemble_core::ChatMessage;
use serde::{Deserialize, Serialize};

const SCORER_PROMPT: &str = "\
You grade two responses to the same request on relevance and completeness.
Score each from 0.0 to 10.0.
Respond with one JSON object and nothing else:
{\"incumbent\": <score>, \"candidate\": <score>}";

/// Grades for the held response and the challenger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseScores {
    /// Grade of the response currently held as best.
    pub incumbent: f64,
    /// Grade of the newly proposed response.
    pub candidate: f64,
}

impl ResponseScores {
    /// Whether the candidate strictly beats the incumbent. Ties keep the
    /// incumbent.
    pub fn prefers_candidate(&self) -> bool {
        self.candidate > self.incumbent
    }
}

/// Grades a candidate final response against the current best.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Grade both responses against the original request.
    async fn score(
        &self,
        request: &str,
        incumbent: &str,
        candidate: &str,
    ) -> Result<ResponseScores, CompletionError>;
}

/// Scorer backed by a completion model held to a JSON-only protocol.
#[derive(Debug)]
pub struct LlmScorer<M> {
    model: M,
    system_prompt: String,
}

impl<M: CompletionModel> LlmScorer<M> {
    /// Scorer with the stock grading instructions.
    pub fn new(model: M) -> Self {
        Self::with_system_prompt(model, SCORER_PROMPT)
    }

    /// Scorer with caller-supplied grading instructions.
    pub fn with_system_prompt(model: M, prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl<M: CompletionModel> Scorer for LlmScorer<M> {
    async fn score(
        &self,
        request: &str,
        incumbent: &str,
        candidate: &str,
    ) -> Result<ResponseScores, CompletionError> {
        let comparison = format!(
            "Request:\n{request}\n\nIncumbent response:\n{incumbent}\n\nCandidate response:\n{candidate}"
        );
        let messages = [
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(comparison),
        ];
        let raw = self.model.complete(&messages).await?;
        decode_scores(&raw)
    }
}

/// Decodes a pair of grades from raw model text, fenced or bare.
pub fn decode_scores(raw: &str) -> Result<ResponseScores, CompletionError> {
    if let Ok(scores) = serde_json::from_str::<ResponseScores>(raw.trim()) {
        return Ok(scores);
    }
    if let Some(body) = extract_json_fence(raw) {
        if let Ok(scores) = serde_json::from_str::<ResponseScores>(body) {
            return Ok(scores);
        }
    }
    Err(CompletionError::Malformed(format!(
        "scorer returned invalid grades: {raw}"
    )))
}
