pub mod auth;
pub mod content;
pub mod courses;
pub mod dashboard;
pub mod interviews;
pub mod progress;
pub mod quizzes;
pub mod videos;
