use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ai::GeneratedQuestion,
    model::entity::{
        DEFAULT_TIME_LIMIT_MINUTES, Interview, InterviewAnswer, InterviewAttempt,
        InterviewCreateUpdate, InterviewQuestion, InterviewQuestionCreate,
    },
};

pub const MAX_GENERATED_QUESTIONS: usize = 20;

fn default_difficulty() -> String {
    String::from("MEDIUM")
}

fn default_question_count() -> usize {
    5
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GenerateInterviewBody {
    pub course_id: Uuid,
    pub job_role: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// 1..=20, defaults to 5.
    #[serde(default = "default_question_count")]
    pub number_of_questions: usize,
}

impl GenerateInterviewBody {
    pub fn validate(&self) -> Result<(), String> {
        if self.job_role.trim().is_empty() {
            return Err(String::from("job_role is required"));
        }
        if !(1..=MAX_GENERATED_QUESTIONS).contains(&self.number_of_questions) {
            return Err(format!(
                "number_of_questions must be between 1 and {MAX_GENERATED_QUESTIONS}"
            ));
        }
        Ok(())
    }

    pub fn to_create(&self) -> InterviewCreateUpdate {
        let role = self.job_role.trim();
        InterviewCreateUpdate {
            course_id: self.course_id,
            title: format!("{role} Interview Prep"),
            description: format!(
                "{} generated questions for a {role} position.",
                self.number_of_questions
            ),
            job_role: role.to_string(),
            difficulty: self.difficulty.to_ascii_uppercase(),
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            ai_generated: true,
        }
    }
}

impl From<GeneratedQuestion> for InterviewQuestionCreate {
    fn from(value: GeneratedQuestion) -> Self {
        Self {
            question: value.question,
            sample_answer: value.sample_answer,
            key_points: value.key_points,
            difficulty: value.difficulty.map(|d| d.to_ascii_uppercase()),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InterviewBody {
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub job_role: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    pub time_limit_minutes: Option<i32>,
    #[serde(default)]
    pub questions: Vec<InterviewQuestionCreate>,
}

impl InterviewBody {
    pub fn into_parts(
        self,
    ) -> Result<(InterviewCreateUpdate, Vec<InterviewQuestionCreate>), String> {
        if self.title.trim().is_empty() {
            return Err(String::from("title is required"));
        }
        if self.job_role.trim().is_empty() {
            return Err(String::from("job_role is required"));
        }
        if self.questions.iter().any(|q| q.question.trim().is_empty()) {
            return Err(String::from("every question needs a text"));
        }
        let time_limit = self.time_limit_minutes.unwrap_or(DEFAULT_TIME_LIMIT_MINUTES);
        if time_limit < 1 {
            return Err(String::from("time_limit_minutes must be positive"));
        }

        let interview = InterviewCreateUpdate {
            course_id: self.course_id,
            title: self.title.trim().to_string(),
            description: self.description,
            job_role: self.job_role.trim().to_string(),
            difficulty: self.difficulty.to_ascii_uppercase(),
            time_limit_minutes: time_limit,
            ai_generated: false,
        };
        Ok((interview, self.questions))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InterviewView {
    pub interview: Interview,
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InterviewAnswerBody {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InterviewAttemptView {
    pub attempt: InterviewAttempt,
    pub answers: Vec<InterviewAnswer>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StartedInterviewView {
    pub attempt: InterviewAttempt,
    /// Questions without sample answers or key points.
    pub questions: Vec<InterviewQuestion>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn generate(count: usize) -> GenerateInterviewBody {
        GenerateInterviewBody {
            course_id: Uuid::new_v4(),
            job_role: String::from(" Backend Engineer "),
            difficulty: String::from("hard"),
            number_of_questions: count,
        }
    }

    #[test]
    fn question_count_bounds() {
        assert!(generate(0).validate().is_err());
        assert!(generate(1).validate().is_ok());
        assert!(generate(20).validate().is_ok());
        assert!(generate(21).validate().is_err());
    }

    #[test]
    fn generated_interview_is_titled_after_role() {
        let create = generate(5).to_create();
        assert_eq!(create.title, "Backend Engineer Interview Prep");
        assert_eq!(create.difficulty, "HARD");
        assert!(create.ai_generated);
        assert_eq!(create.time_limit_minutes, 60);
    }
}
