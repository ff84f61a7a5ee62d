//! Interview question generation and answer evaluation.
//!
//! Gemini does both when an API key is configured. Without it generation is unavailable and
//! answers are scored locally by [`KeywordEvaluator`].

use serde::{Deserialize, Serialize};

mod error;
pub use error::{AiError, AiResult};

mod gemini;
pub use gemini::{GeminiClient, strip_code_fences};

mod keyword;
pub use keyword::KeywordEvaluator;

/// Score and feedback for one interview answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Evaluation {
    /// 0..=100
    pub score: i32,
    pub feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl Evaluation {
    pub fn clamped(mut self) -> Self {
        self.score = self.score.clamp(0, 100);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub question: &'a str,
    pub sample_answer: &'a str,
    pub key_points: &'a [String],
    pub answer: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct QuestionRequest<'a> {
    pub job_role: &'a str,
    pub difficulty: &'a str,
    pub count: usize,
    pub course_title: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(default, alias = "sampleAnswer")]
    pub sample_answer: String,
    #[serde(default, alias = "keyPoints")]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[async_trait::async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(&self, request: EvaluationRequest<'_>) -> AiResult<Evaluation>;
}

#[async_trait::async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, request: QuestionRequest<'_>) -> AiResult<Vec<GeneratedQuestion>>;
}

#[derive(Debug)]
pub struct AiService {
    gemini: Option<GeminiClient>,
    fallback: KeywordEvaluator,
}

impl AiService {
    pub fn from_config(config: &crate::config::Ai) -> AiResult<Self> {
        let gemini = match config.gemini_api_key() {
            Some(key) => Some(GeminiClient::new(key, config)?),
            None => {
                tracing::info!("gemini api key is not set, interview generation disabled");
                None
            }
        };

        Ok(Self {
            gemini,
            fallback: KeywordEvaluator,
        })
    }

    pub fn disabled() -> Self {
        Self {
            gemini: None,
            fallback: KeywordEvaluator,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.gemini.is_some()
    }

    pub async fn generate_questions(
        &self,
        request: QuestionRequest<'_>,
    ) -> AiResult<Vec<GeneratedQuestion>> {
        match &self.gemini {
            Some(gemini) => gemini.generate(request).await,
            None => Err(AiError::NotConfigured),
        }
    }

    /// Never fails: provider errors fall back to local keyword scoring.
    pub async fn evaluate_answer(&self, request: EvaluationRequest<'_>) -> Evaluation {
        if let Some(gemini) = &self.gemini {
            match gemini.evaluate(request).await {
                Ok(evaluation) => return evaluation.clamped(),
                Err(e) => crate::error::log_error(&e),
            }
        }

        self.fallback.score(request)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn disabled_service_refuses_generation() {
        let ai = AiService::disabled();
        assert!(!ai.is_enabled());

        let request = QuestionRequest {
            job_role: "Backend Engineer",
            difficulty: "MEDIUM",
            count: 3,
            course_title: "Rust",
        };
        assert!(matches!(
            ai.generate_questions(request).await,
            Err(AiError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn disabled_service_still_scores_answers() {
        let ai = AiService::disabled();
        let key_points = vec!["ownership".to_string(), "borrowing".to_string()];
        let evaluation = ai
            .evaluate_answer(EvaluationRequest {
                question: "Explain memory safety in Rust",
                sample_answer: "",
                key_points: &key_points,
                answer: "Ownership and borrowing rules are checked at compile time.",
            })
            .await;
        assert_eq!(evaluation.score, 100);
    }

    #[test]
    fn generated_question_accepts_camel_case() {
        let q: GeneratedQuestion = serde_json::from_str(
            r#"{"question":"Q?","sampleAnswer":"A","keyPoints":["k"],"difficulty":"HARD"}"#,
        )
        .unwrap();
        assert_eq!(q.sample_answer, "A");
        assert_eq!(q.key_points, vec!["k".to_string()]);
    }

    #[test]
    fn evaluation_score_is_clamped() {
        let e = Evaluation {
            score: 140,
            feedback: String::new(),
            strengths: vec![],
            improvements: vec![],
        };
        assert_eq!(e.clamped().score, 100);
    }
}
