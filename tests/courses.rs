mod common;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    ADMIN, Action, Flow, INSTRUCTOR, STUDENT, create_content_action, create_course_action, create_module_action,
    enroll_action, login_action, publish_content_action, publish_course_action, register_action,
    setup_server, setup_test_db,
};

fn get_course_action() -> Action {
    Action::new("get course", "GET", "").with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", "")))
}

fn content_list() -> Action {
    Action::new("module content", "GET", "")
        .with_dyn_path(|ctx| format!("/api/modules/{}/content", ctx.id("module", "")))
}

#[tokio::test]
async fn route_course_lifecycle_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(STUDENT))
        .step(create_course_action("Not allowed", 0).with_expect(StatusCode::FORBIDDEN))
        .step(login_action(INSTRUCTOR))
        .step(
            create_course_action("Rust from scratch", 4999).assert_body(|body| {
                assert_eq!(body["status"], "DRAFT");
                assert_eq!(body["price_cents"], 4999);
                assert_eq!(body["difficulty_level"], "BEGINNER");
            }),
        )
        .step(get_course_action())
        .step(
            Action::new("my courses", "GET", "/api/courses/instructor")
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)),
        )
        // drafts are hidden from everyone else
        .step(login_action(STUDENT))
        .step(get_course_action().with_expect(StatusCode::NOT_FOUND))
        .step(enroll_action().with_expect(StatusCode::NOT_FOUND))
        .step(
            Action::new("catalogue without drafts", "GET", "/api/courses/public")
                .assert_body(|body| assert!(body.as_array().unwrap().is_empty())),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("negative price", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", "")))
                .with_body(json!({ "price_cents": -1 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("rename", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", "")))
                .with_body(json!({ "title": "Rust in practice" }))
                .assert_body(|body| {
                    assert_eq!(body["title"], "Rust in practice");
                    assert_eq!(body["price_cents"], 4999);
                }),
        )
        .step(publish_course_action().assert_body(|body| assert_eq!(body["status"], "PUBLISHED")))
        .step(
            Action::new("catalogue", "GET", "/api/courses/public")
                .with_clear_cookies(true)
                .assert_body(|body| {
                    let courses = body.as_array().unwrap();
                    assert_eq!(courses.len(), 1);
                    assert_eq!(courses[0]["title"], "Rust in practice");
                    assert_eq!(courses[0]["instructor_first_name"], "John");
                }),
        )
        .step(get_course_action())
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Second draft", 0).with_save_as("draft"))
        .step(
            Action::new("moderation list as instructor", "GET", "/api/admin/courses")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_action(ADMIN))
        .step(
            Action::new("moderation list", "GET", "/api/admin/courses")
                .with_param("limit", "1")
                .assert_body(|body| {
                    assert_eq!(body["total"], 2);
                    assert_eq!(body["limit"], 1);
                    assert_eq!(body["items"][0]["title"], "Second draft");
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_course_ownership_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Owned course", 0))
        .step(register_action("other@example.com", "secret1", "INSTRUCTOR"))
        .step(
            Action::new("foreign update", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", "")))
                .with_body(json!({ "title": "Hijacked" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("foreign delete", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", "")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("delete", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}", ctx.id("course", ""))),
        )
        .step(get_course_action().with_expect(StatusCode::NOT_FOUND))
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_enroll_and_paywall_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Paid course", 1999))
        .step(create_module_action())
        // modules of a draft course are not listed
        .step(
            Action::new("modules of draft", "GET", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}/modules", ctx.id("course", "")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(publish_course_action())
        .step(create_content_action("free_item", "VIDEO", true))
        .step(create_content_action("paid_item", "PDF_NOTES", false))
        .step(create_content_action("draft_item", "PDF_QUESTIONS", false))
        .step(publish_content_action("free_item"))
        .step(publish_content_action("paid_item"))
        .step(
            Action::new("manage lists drafts", "GET", "")
                .with_dyn_path(|ctx| format!("/api/modules/{}/content/manage", ctx.id("module", "")))
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 3)),
        )
        // anonymous visitor
        .step(
            Action::new("modules", "GET", "")
                .with_clear_cookies(true)
                .with_dyn_path(|ctx| format!("/api/courses/{}/modules", ctx.id("course", "")))
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)),
        )
        .step(
            Action::new("locked content", "GET", "")
                .with_dyn_path(|ctx| format!("/api/modules/{}/content", ctx.id("module", "")))
                .assert_body(|body| {
                    let items = body.as_array().unwrap();
                    assert_eq!(items.len(), 2);
                    let free = items.iter().find(|i| i["is_free"] == true).unwrap();
                    let paid = items.iter().find(|i| i["is_free"] == false).unwrap();
                    assert_eq!(free["locked"], false);
                    assert!(free["video_url"].is_string());
                    assert_eq!(paid["locked"], true);
                    assert!(paid["pdf_url"].is_null());
                }),
        )
        .step(login_action(STUDENT))
        .step(enroll_action().assert_body(|body| {
            assert_eq!(body["payment_status"], "COMPLETED");
            assert_eq!(body["payment_amount_cents"], 1999);
            assert_eq!(body["progress_percentage"], 0);
        }))
        .step(enroll_action().with_expect(StatusCode::CONFLICT))
        .step(
            Action::new("unlocked content", "GET", "")
                .with_dyn_path(|ctx| format!("/api/modules/{}/content", ctx.id("module", "")))
                .assert_body(|body| {
                    let items = body.as_array().unwrap();
                    assert!(items.iter().all(|i| i["locked"] == false));
                    let paid = items.iter().find(|i| i["is_free"] == false).unwrap();
                    assert_eq!(paid["pdf_url"], "https://cdn.example.com/notes.pdf");
                }),
        )
        .step(
            Action::new("student courses", "GET", "/api/student/courses")
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("enrollments", "GET", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}/enrollments", ctx.id("course", "")))
                .assert_body(|body| {
                    let rows = body.as_array().unwrap();
                    assert_eq!(rows.len(), 1);
                    assert_eq!(rows[0]["email"], "student@skillforge.com");
                }),
        )
        .step(
            Action::new("instructor dashboard", "GET", "/api/instructor/dashboard")
                .assert_body(|body| {
                    assert_eq!(body["data"]["total_courses"], 1);
                    assert_eq!(body["data"]["total_students"], 1);
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_module_scope_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Second course", 0).with_save_as("other_course"))
        .step(create_course_action("First course", 0))
        .step(create_module_action())
        .step(create_content_action("free_item", "VIDEO", true))
        .step(publish_content_action("free_item"))
        // a draft course does not leak its content, free items included
        .step(content_list().with_clear_cookies(true).with_expect(StatusCode::NOT_FOUND))
        .step(login_action(INSTRUCTOR))
        .step(content_list().assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)))
        .step(publish_course_action())
        .step(content_list().with_clear_cookies(true).assert_body(|body| {
            assert_eq!(body[0]["video_url"], "https://youtu.be/dQw4w9WgXcQ");
        }))
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("module through the wrong course", "PUT", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/courses/{}/modules/{}",
                        ctx.id("other_course", ""),
                        ctx.id("module", "")
                    )
                })
                .with_body(json!({ "title": "Moved" }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("module order below one", "POST", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}/modules", ctx.id("course", "")))
                .with_body(json!({ "title": "Zero", "module_order": 0 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("hide module", "PUT", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/courses/{}/modules/{}/publish",
                        ctx.id("course", ""),
                        ctx.id("module", "")
                    )
                })
                .with_param("published", "false")
                .assert_body(|body| assert_eq!(body["is_published"], false)),
        )
        .step(content_list().with_clear_cookies(true).with_expect(StatusCode::NOT_FOUND))
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("video content needs a url", "POST", "")
                .with_dyn_path(|ctx| format!("/api/modules/{}/content", ctx.id("module", "")))
                .with_body(json!({ "title": "Intro", "content_type": "VIDEO" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, db)
        .await;
}
