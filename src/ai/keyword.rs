use std::collections::BTreeSet;

use super::{AiResult, AnswerEvaluator, Evaluation, EvaluationRequest};

/// Offline scorer: measures how many of the expected key points an answer touches.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordEvaluator;

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// A key point counts as covered when at least half of its words show up in the answer.
fn covers(answer_terms: &BTreeSet<String>, key_point: &str) -> bool {
    let wanted = terms(key_point);
    if wanted.is_empty() {
        return false;
    }
    let hits = wanted.iter().filter(|t| answer_terms.contains(*t)).count();
    hits * 2 >= wanted.len()
}

impl KeywordEvaluator {
    pub fn score(&self, request: EvaluationRequest<'_>) -> Evaluation {
        let answer_terms = terms(request.answer);

        if answer_terms.is_empty() {
            return Evaluation {
                score: 0,
                feedback: String::from("No answer was given."),
                strengths: vec![],
                improvements: vec![String::from("Answer the question in your own words.")],
            };
        }

        let key_points: Vec<String> = if request.key_points.is_empty() {
            terms(request.sample_answer).into_iter().collect()
        } else {
            request.key_points.to_vec()
        };

        if key_points.is_empty() {
            let words = request.answer.split_whitespace().count();
            let score = match words {
                50.. => 70,
                20.. => 50,
                _ => 30,
            };
            return Evaluation {
                score,
                feedback: format!("Answer has {words} words; no reference points were available."),
                strengths: vec![],
                improvements: vec![],
            };
        }

        let (covered, missed): (Vec<&String>, Vec<&String>) = key_points
            .iter()
            .partition(|kp| covers(&answer_terms, kp));

        let score = (covered.len() * 100 / key_points.len()) as i32;
        Evaluation {
            score,
            feedback: format!(
                "Covered {} of {} expected points.",
                covered.len(),
                key_points.len()
            ),
            strengths: covered.iter().map(|kp| format!("Mentions {kp}")).collect(),
            improvements: missed.iter().map(|kp| format!("Expand on {kp}")).collect(),
        }
    }
}

#[async_trait::async_trait]
impl AnswerEvaluator for KeywordEvaluator {
    async fn evaluate(&self, request: EvaluationRequest<'_>) -> AiResult<Evaluation> {
        Ok(self.score(request))
    }
}
