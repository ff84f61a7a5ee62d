mod user;
pub use user::{InstructorProfileRow, UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCatalogRow, CourseCreateUpdate, CourseStatus, DifficultyLevel};

mod course_module;
pub use course_module::{CourseModule, CourseModuleCreateUpdate};

mod module_content;
pub use module_content::{ContentType, ModuleContent, ModuleContentCreateUpdate};

mod enrollment;
pub use enrollment::{
    CourseEnrollmentRow, Enrollment, EnrollmentStats, StudentCourseRow, progress_percentage,
};

mod content_progress;
pub use content_progress::{
    ContentProgress, ProgressState, ProgressUpdate, average_progress, round2,
};

mod quiz;
pub use quiz::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PASSING_SCORE, Quiz, QuizCreateUpdate};

mod quiz_question;
pub use quiz_question::{QuestionType, QuizQuestion, QuizQuestionCreate};

mod question_option;
pub use question_option::{QuestionOption, QuestionOptionCreate};

mod quiz_attempt;
pub use quiz_attempt::{AttemptStatus, QuizAttempt, QuizAttemptStats, QuizScore};

mod student_answer;
pub use student_answer::{StudentAnswer, StudentAnswerCreate};

mod video;
pub use video::{Video, VideoCreateUpdate, VideoStatus, VideoType};

mod interview;
pub use interview::{DEFAULT_TIME_LIMIT_MINUTES, Interview, InterviewCreateUpdate};

mod interview_question;
pub use interview_question::{InterviewQuestion, InterviewQuestionCreate};

mod interview_attempt;
pub use interview_attempt::{InterviewAttempt, overall_score};

mod interview_answer;
pub use interview_answer::InterviewAnswer;
