use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PASSING_SCORE, QuestionOption, QuestionOptionCreate, QuestionType,
    Quiz, QuizAttempt, QuizCreateUpdate, QuizQuestion, QuizQuestionCreate, StudentAnswer,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuizBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to 70.
    pub passing_score: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    /// Defaults to 3.
    pub max_attempts: Option<i32>,
    pub show_results_immediately: Option<bool>,
}

impl QuizBody {
    pub fn into_create_update(self, module_content_id: Uuid) -> Result<QuizCreateUpdate, String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }

        let passing_score = self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE);
        if !(0..=100).contains(&passing_score) {
            return Err(String::from("passing_score must be between 0 and 100"));
        }

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts < 1 {
            return Err(String::from("max_attempts must be at least 1"));
        }

        if self.time_limit_minutes.is_some_and(|m| m < 1) {
            return Err(String::from("time_limit_minutes must be positive"));
        }

        Ok(QuizCreateUpdate {
            module_content_id,
            title: self.title.trim().to_string(),
            description: self.description,
            passing_score,
            time_limit_minutes: self.time_limit_minutes,
            max_attempts,
            show_results_immediately: self.show_results_immediately.unwrap_or(true),
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuestionBody {
    pub question_text: String,
    pub question_type: QuestionType,
    pub question_order: Option<i32>,
    /// Defaults to 1.
    pub points: Option<i32>,
    pub explanation: Option<String>,
}

impl QuestionBody {
    pub fn into_create(self, quiz_id: Uuid) -> Result<QuizQuestionCreate, String> {
        if self.question_text.trim().is_empty() {
            return Err(String::from("question_text is required"));
        }
        let points = self.points.unwrap_or(1);
        if points < 1 {
            return Err(String::from("points must be at least 1"));
        }

        Ok(QuizQuestionCreate {
            quiz_id,
            question_text: self.question_text,
            question_type: self.question_type,
            question_order: self.question_order,
            points,
            explanation: self.explanation,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OptionBody {
    pub option_text: String,
    pub option_order: Option<i32>,
    #[serde(default)]
    pub is_correct: bool,
}

impl OptionBody {
    pub fn into_create(self, question_id: Uuid) -> Result<QuestionOptionCreate, String> {
        if self.option_text.trim().is_empty() {
            return Err(String::from("option_text is required"));
        }

        Ok(QuestionOptionCreate {
            question_id,
            option_text: self.option_text,
            option_order: self.option_order,
            is_correct: self.is_correct,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerBody {
    pub question_id: Uuid,
    pub selected_option_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OptionView {
    pub id: Uuid,
    pub option_text: String,
    pub option_order: i32,
    /// Only shown to the quiz owner.
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub question_order: i32,
    pub points: i32,
    /// Only shown to the quiz owner.
    pub explanation: Option<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizView {
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
}

impl QuizView {
    /// Groups options under their questions. `reveal` keeps answers and explanations.
    pub fn assemble(
        quiz: Quiz,
        questions: Vec<QuizQuestion>,
        options: Vec<QuestionOption>,
        reveal: bool,
    ) -> Self {
        let mut by_question: HashMap<Uuid, Vec<OptionView>> = HashMap::new();
        for option in options {
            by_question
                .entry(option.question_id())
                .or_default()
                .push(OptionView {
                    id: option.id(),
                    option_text: option.option_text().to_string(),
                    option_order: option.option_order(),
                    is_correct: reveal.then_some(option.is_correct()),
                });
        }

        let questions = questions
            .into_iter()
            .map(|q| {
                let mut options = by_question.remove(&q.id()).unwrap_or_default();
                options.sort_by_key(|o| o.option_order);
                QuestionView {
                    id: q.id(),
                    question_text: q.question_text().to_string(),
                    question_type: q.question_type().to_string(),
                    question_order: q.question_order(),
                    points: q.points(),
                    explanation: if reveal {
                        q.explanation().map(str::to_string)
                    } else {
                        None
                    },
                    options,
                }
            })
            .collect();

        Self { quiz, questions }
    }
}

/// Graded attempt. Answers are included when the quiz shows results immediately.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AttemptResultView {
    pub attempt: QuizAttempt,
    pub answers: Option<Vec<StudentAnswer>>,
}
