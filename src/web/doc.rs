use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::routes;

pub struct AuthModifier;

impl Modify for AuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "SkillForge API"),
    paths(
        routes::auth::register_handler,
        routes::auth::login_handler,
        routes::auth::me_handler,
        routes::auth::logout_handler,
        routes::admin::dashboard_handler,
        routes::admin::users_page_handler,
        routes::admin::user_enabled_handler,
        routes::admin::user_delete_handler,
        routes::admin::courses_page_handler,
        routes::admin::analytics_handler,
        routes::courses::public_list_handler,
        routes::courses::public_by_instructor_handler,
        routes::courses::my_courses_handler,
        routes::courses::course_get_handler,
        routes::courses::course_create_handler,
        routes::courses::course_update_handler,
        routes::courses::course_delete_handler,
        routes::courses::course_publish_handler,
        routes::courses::course_enroll_handler,
        routes::courses::course_enrollments_handler,
        routes::modules::modules_list_handler,
        routes::modules::modules_manage_handler,
        routes::modules::module_create_handler,
        routes::modules::module_update_handler,
        routes::modules::module_delete_handler,
        routes::modules::module_publish_handler,
        routes::content::content_list_handler,
        routes::content::content_manage_handler,
        routes::content::content_create_handler,
        routes::content::content_update_handler,
        routes::content::content_delete_handler,
        routes::content::content_publish_handler,
        routes::quizzes::quiz_create_handler,
        routes::quizzes::quiz_get_handler,
        routes::quizzes::quiz_update_handler,
        routes::quizzes::quiz_publish_handler,
        routes::quizzes::question_create_handler,
        routes::quizzes::option_create_handler,
        routes::quizzes::attempt_start_handler,
        routes::quizzes::my_attempts_handler,
        routes::quizzes::attempt_answer_handler,
        routes::quizzes::attempt_complete_handler,
        routes::videos::video_create_handler,
        routes::videos::course_videos_handler,
        routes::videos::video_get_handler,
        routes::videos::video_update_handler,
        routes::videos::video_url_handler,
        routes::videos::video_preview_handler,
        routes::videos::video_delete_handler,
        routes::interviews::interview_generate_handler,
        routes::interviews::interview_create_handler,
        routes::interviews::course_interviews_handler,
        routes::interviews::interview_get_handler,
        routes::interviews::interview_update_handler,
        routes::interviews::interview_publish_handler,
        routes::interviews::interview_delete_handler,
        routes::interviews::interview_start_handler,
        routes::interviews::attempt_answer_handler,
        routes::interviews::attempt_complete_handler,
        routes::interviews::my_attempts_handler,
        routes::interviews::attempt_detail_handler,
        routes::progress::progress_start_handler,
        routes::progress::progress_update_handler,
        routes::progress::enrollment_progress_handler,
        routes::progress::course_summary_handler,
        routes::student::dashboard_handler,
        routes::student::courses_handler,
        routes::instructor::dashboard_handler,
        routes::instructor::analytics_handler,
        routes::instructors::public_list_handler,
        routes::instructors::public_profile_handler,
    ),
    modifiers(&AuthModifier),
    tags(
        (name = "auth", description = "Registration and sign in"),
        (name = "admin", description = "Platform administration"),
        (name = "courses", description = "Course catalogue and enrollment"),
        (name = "modules", description = "Course modules"),
        (name = "content", description = "Module content with paywall"),
        (name = "quizzes", description = "Quizzes and graded attempts"),
        (name = "videos", description = "Course videos"),
        (name = "interviews", description = "Interview practice"),
        (name = "progress", description = "Learning progress"),
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_lists_both_auth_schemes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.security_schemes.contains_key("cookie"));
        assert!(doc.paths.paths.contains_key("/api/quizzes/attempts/{attempt_id}/complete"));
    }
}
