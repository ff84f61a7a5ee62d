use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{
    AiError, AiResult, AnswerEvaluator, Evaluation, EvaluationRequest, GeneratedQuestion,
    QuestionGenerator, QuestionRequest,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Clone)]
pub struct GeminiClient {
    inner: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

/// Prompts ask for JSON only.
const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Removes a surrounding markdown code fence (```json ... ```) if the model added one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_output<T: DeserializeOwned>(text: &str) -> AiResult<T> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| AiError::InvalidOutput(e.to_string()))
}

fn question_prompt(request: &QuestionRequest<'_>) -> String {
    format!(
        "Generate {count} interview questions for a {role} position at {difficulty} difficulty.\n\
         The candidate has studied the course \"{course}\".\n\
         Respond with a JSON array only. Each element must be an object with the fields \
         \"question\" (string), \"sampleAnswer\" (string), \"keyPoints\" (array of strings) \
         and \"difficulty\" (one of EASY, MEDIUM, HARD).",
        count = request.count,
        role = request.job_role,
        difficulty = request.difficulty,
        course = request.course_title,
    )
}

fn evaluation_prompt(request: &EvaluationRequest<'_>) -> String {
    format!(
        "You are grading a job interview answer.\n\
         Question: {question}\n\
         Reference answer: {sample}\n\
         Key points: {key_points}\n\
         Candidate answer: {answer}\n\
         Respond with a JSON object only, with the fields \"score\" (integer 0-100), \
         \"feedback\" (string), \"strengths\" (array of strings) and \"improvements\" (array of strings).",
        question = request.question,
        sample = request.sample_answer,
        key_points = request.key_points.join("; "),
        answer = request.answer,
    )
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &crate::config::Ai) -> AiResult<Self> {
        let inner = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            inner,
            api_key: api_key.to_string(),
            model: config.gemini_model().to_string(),
            temperature: config.temperature(),
            max_output_tokens: config.max_output_tokens(),
        })
    }

    #[tracing::instrument(skip(self, prompt))]
    async fn complete(&self, prompt: &str) -> AiResult<String> {
        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: JSON_MIME_TYPE,
            },
        };

        let response = self
            .inner
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("gemini returned {status}");
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .into_text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl QuestionGenerator for GeminiClient {
    async fn generate(&self, request: QuestionRequest<'_>) -> AiResult<Vec<GeneratedQuestion>> {
        let text = self.complete(&question_prompt(&request)).await?;
        let mut questions: Vec<GeneratedQuestion> = parse_output(&text)?;

        questions.retain(|q| !q.question.trim().is_empty());
        questions.truncate(request.count);

        if questions.is_empty() {
            return Err(AiError::InvalidOutput(String::from("no questions generated")));
        }
        Ok(questions)
    }
}

#[async_trait::async_trait]
impl AnswerEvaluator for GeminiClient {
    async fn evaluate(&self, request: EvaluationRequest<'_>) -> AiResult<Evaluation> {
        let text = self.complete(&evaluation_prompt(&request)).await?;
        let evaluation: Evaluation = parse_output(&text)?;
        Ok(evaluation.clamped())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
    }

    #[test]
    fn parses_fenced_evaluation() {
        let text = "```json\n{\"score\": 85, \"feedback\": \"Good\", \"strengths\": [\"clear\"]}\n```";
        let e: Evaluation = parse_output(text).unwrap();
        assert_eq!(e.score, 85);
        assert!(e.improvements.is_empty());
    }

    #[test]
    fn rejects_prose() {
        let result: AiResult<Vec<GeneratedQuestion>> = parse_output("Sure! Here are questions:");
        assert!(matches!(result, Err(AiError::InvalidOutput(_))));
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("hello"));

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 10,
                response_mime_type: JSON_MIME_TYPE,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 10);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn debug_hides_key() {
        let client = GeminiClient::new("secret-key", &crate::config::Ai::default()).unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
