mod common;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, INSTRUCTOR, STUDENT, create_content_action, create_course_action, create_module_action,
    enroll_action, login_action, publish_content_action, publish_course_action, register_action,
    setup_server, setup_test_db,
};

fn report(item: &'static str) -> Action {
    Action::new("report progress", "PUT", "").with_dyn_path(move |ctx| {
        format!(
            "/api/progress/enrollment/{}/content/{}",
            ctx.id("enrollment", ""),
            ctx.id(item, "")
        )
    })
}

fn summary() -> Action {
    Action::new("course summary", "GET", "").with_dyn_path(|ctx| {
        format!(
            "/api/progress/student/{}/course/{}",
            ctx.id("student_auth", "/user"),
            ctx.id("course", "")
        )
    })
}

#[tokio::test]
async fn route_progress_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Tracked course", 0))
        .step(publish_course_action())
        .step(create_module_action())
        .step(create_content_action("first", "VIDEO", false))
        .step(create_content_action("second", "PDF_NOTES", false))
        .step(publish_content_action("first"))
        .step(publish_content_action("second"))
        .step(login_action(STUDENT).with_save_as("student_auth"))
        .step(enroll_action())
        .step(
            Action::new("start item", "POST", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/progress/enrollment/{}/content/{}/start",
                        ctx.id("enrollment", ""),
                        ctx.id("first", "")
                    )
                })
                .assert_body(|body| {
                    assert_eq!(body["progress_percentage"], 0);
                    assert_eq!(body["completed"], false);
                }),
        )
        .step(
            report("first")
                .with_body(json!({ "progress_percentage": 140, "time_spent_seconds": 90 }))
                .assert_body(|body| {
                    assert_eq!(body["progress_percentage"], 100);
                    assert_eq!(body["completed"], true);
                    assert_eq!(body["time_spent_seconds"], 90);
                }),
        )
        // completion sticks even when a lower percentage arrives later
        .step(
            report("first")
                .with_body(json!({ "progress_percentage": 10, "time_spent_seconds": 30 }))
                .assert_body(|body| {
                    assert_eq!(body["completed"], true);
                    assert_eq!(body["time_spent_seconds"], 120);
                }),
        )
        .step(summary().assert_body(|body| {
            assert_eq!(body["total_items"], 2);
            assert_eq!(body["completed_items"], 1);
            assert_eq!(body["overall_progress"], 50.0);
            assert_eq!(body["total_time_spent_seconds"], 120);
        }))
        .step(
            Action::new("student courses", "GET", "/api/student/courses").assert_body(|body| {
                assert_eq!(body[0]["progress_percentage"], 50);
            }),
        )
        .step(report("second").with_body(json!({ "completed": true })))
        .step(
            Action::new("enrollment progress", "GET", "")
                .with_dyn_path(|ctx| format!("/api/progress/enrollment/{}", ctx.id("enrollment", "")))
                .assert_body(|body| {
                    assert_eq!(body["completed_items"], 2);
                    assert_eq!(body["average_progress"], 100.0);
                    assert_eq!(body["items"].as_array().unwrap().len(), 2);
                }),
        )
        .step(
            Action::new("student courses", "GET", "/api/student/courses").assert_body(|body| {
                assert_eq!(body[0]["progress_percentage"], 100);
                assert_eq!(body[0]["enrollment_status"], "COMPLETED");
            }),
        )
        // the course owner may look, other students may not
        .step(login_action(INSTRUCTOR))
        .step(summary().assert_body(|body| assert_eq!(body["completed_items"], 2)))
        .step(register_action("curious@example.com", "secret1", "STUDENT"))
        .step(summary().with_expect(StatusCode::FORBIDDEN))
        .step(
            report("first")
                .with_body(json!({ "progress_percentage": 5 }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_progress_foreign_content_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Other course", 0).with_save_as("other_course"))
        .step(
            Action::new("other module", "POST", "")
                .with_dyn_path(|ctx| format!("/api/courses/{}/modules", ctx.id("other_course", "")))
                .with_body(json!({ "title": "Elsewhere", "is_published": true }))
                .with_expect(StatusCode::CREATED)
                .with_save_as("module"),
        )
        .step(create_content_action("foreign", "PDF_NOTES", false))
        .step(create_course_action("Enrolled course", 0))
        .step(publish_course_action())
        .step(login_action(STUDENT))
        .step(enroll_action())
        .step(
            report("foreign")
                .with_body(json!({ "completed": true }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_progress_unpublished_content_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Half written", 0))
        .step(publish_course_action())
        .step(create_module_action())
        .step(create_content_action("ready", "VIDEO", false))
        .step(create_content_action("draft_item", "PDF_NOTES", false))
        .step(publish_content_action("ready"))
        .step(login_action(STUDENT).with_save_as("student_auth"))
        .step(enroll_action())
        .step(
            report("draft_item")
                .with_body(json!({ "completed": true }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("start draft item", "POST", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/progress/enrollment/{}/content/{}/start",
                        ctx.id("enrollment", ""),
                        ctx.id("draft_item", "")
                    )
                })
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(report("ready").with_body(json!({ "completed": true })))
        .step(summary().assert_body(|body| {
            assert_eq!(body["total_items"], 1);
            assert_eq!(body["completed_items"], 1);
            assert_eq!(body["overall_progress"], 100.0);
        }))
        // withdrawing the finished item drops it from both counts
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("unpublish content", "PATCH", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/modules/{}/content/{}/publish",
                        ctx.id("module", ""),
                        ctx.id("ready", "")
                    )
                })
                .with_param("published", "false"),
        )
        .step(summary().assert_body(|body| {
            assert_eq!(body["total_items"], 0);
            assert_eq!(body["completed_items"], 0);
            assert_eq!(body["overall_progress"], 0.0);
        }))
        .run(&mut server, db)
        .await;
}
