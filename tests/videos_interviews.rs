mod common;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, INSTRUCTOR, STUDENT, create_course_action, enroll_action, login_action,
    publish_course_action, setup_server, setup_test_db,
};

fn add_video(key: &'static str, title: &'static str, is_preview: bool) -> Action {
    Action::new("add video", "POST", "/api/videos")
        .with_dyn_body(move |ctx| {
            json!({
                "course_id": ctx.id("course", ""),
                "title": title,
                "video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "is_preview": is_preview,
            })
        })
        .with_expect(StatusCode::CREATED)
        .with_save_as(key)
}

fn video_url(key: &'static str) -> Action {
    Action::new("video url", "GET", "").with_dyn_path(move |ctx| format!("/api/videos/{}/url", ctx.id(key, "")))
}

fn course_videos() -> Action {
    Action::new("course videos", "GET", "")
        .with_dyn_path(|ctx| format!("/api/videos/course/{}", ctx.id("course", "")))
}

#[tokio::test]
async fn route_videos_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Video course", 990))
        .step(publish_course_action())
        .step(add_video("trailer", "Trailer", true).assert_body(|body| {
            assert_eq!(body["video_url"], "https://www.youtube.com/embed/dQw4w9WgXcQ");
            assert_eq!(body["video_type"], "PREVIEW");
            assert!(body["thumbnail_url"].as_str().unwrap().contains("dQw4w9WgXcQ"));
        }))
        .step(add_video("lesson", "Lesson one", false))
        .step(
            Action::new("empty url", "POST", "/api/videos")
                .with_dyn_body(|ctx| json!({ "course_id": ctx.id("course", ""), "title": "x", "video_url": " " }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("move to another course", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/videos/{}", ctx.id("lesson", "")))
                .with_body(json!({
                    "course_id": "00000000-0000-0000-0000-000000000000",
                    "title": "Lesson one",
                    "video_url": "https://example.com/v.mp4",
                }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(course_videos().assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 2)))
        .step(login_action(STUDENT))
        .step(course_videos().assert_body(|body| {
            let videos = body.as_array().unwrap();
            assert_eq!(videos.len(), 1);
            assert_eq!(videos[0]["title"], "Trailer");
        }))
        .step(video_url("trailer"))
        .step(video_url("lesson").with_expect(StatusCode::FORBIDDEN))
        .step(enroll_action())
        .step(video_url("lesson").assert_body(|body| {
            assert_eq!(body["video_url"], "https://www.youtube.com/embed/dQw4w9WgXcQ");
        }))
        .step(course_videos().assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 2)))
        .step(
            Action::new("students cannot delete", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/videos/{}", ctx.id("lesson", "")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("make lesson a preview", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/videos/{}/preview", ctx.id("lesson", "")))
                .with_param("is_preview", "true")
                .assert_body(|body| assert_eq!(body["is_preview"], true)),
        )
        .step(
            Action::new("delete", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/videos/{}", ctx.id("trailer", ""))),
        )
        .step(course_videos().assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)))
        .run(&mut server, db)
        .await;
}

fn answer(question_index: usize, text: &'static str) -> Action {
    Action::new("answer", "POST", "")
        .with_dyn_path(|ctx| format!("/api/interviews/attempts/{}/answer", ctx.id("started", "/attempt")))
        .with_dyn_body(move |ctx| {
            json!({
                "question_id": ctx.id("started", &format!("/questions/{question_index}")),
                "answer": text,
            })
        })
}

#[tokio::test]
async fn route_interviews_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Interview course", 0))
        .step(
            Action::new("generate without provider", "POST", "/api/interviews/generate")
                .with_dyn_body(|ctx| json!({ "course_id": ctx.id("course", ""), "job_role": "Backend Engineer" }))
                .with_expect(StatusCode::SERVICE_UNAVAILABLE),
        )
        .step(
            Action::new("generate too many", "POST", "/api/interviews/generate")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": ctx.id("course", ""),
                        "job_role": "Backend Engineer",
                        "number_of_questions": 50,
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("create interview", "POST", "/api/interviews")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": ctx.id("course", ""),
                        "title": "Rust backend screening",
                        "job_role": "Backend Engineer",
                        "difficulty": "hard",
                        "questions": [
                            {
                                "question": "How does ownership prevent data races?",
                                "sample_answer": "Only one mutable borrow may exist at a time.",
                                "key_points": ["mutable borrow", "compile time checks"],
                            },
                            {
                                "question": "When would you reach for Arc?",
                                "key_points": ["shared ownership across threads"],
                            }
                        ],
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("interview")
                .assert_body(|body| {
                    assert_eq!(body["interview"]["difficulty"], "HARD");
                    assert_eq!(body["interview"]["is_published"], false);
                    let questions = body["questions"].as_array().unwrap();
                    assert_eq!(questions.len(), 2);
                    assert_eq!(questions[0]["order_index"], 1);
                    assert_eq!(questions[1]["difficulty"], "HARD");
                }),
        )
        .step(login_action(STUDENT))
        .step(
            Action::new("hidden while unpublished", "GET", "")
                .with_dyn_path(|ctx| format!("/api/interviews/{}", ctx.id("interview", "/interview")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("publish", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/interviews/{}/publish", ctx.id("interview", "/interview")))
                .with_param("published", "true"),
        )
        .step(publish_course_action())
        .step(login_action(STUDENT))
        .step(
            Action::new("course interviews", "GET", "")
                .with_dyn_path(|ctx| format!("/api/interviews/course/{}", ctx.id("course", "")))
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)),
        )
        .step(
            Action::new("start", "POST", "")
                .with_dyn_path(|ctx| format!("/api/interviews/{}/start", ctx.id("interview", "/interview")))
                .with_expect(StatusCode::CREATED)
                .with_save_as("started")
                .assert_body(|body| {
                    assert_eq!(body["attempt"]["total_questions"], 2);
                    let questions = body["questions"].as_array().unwrap();
                    assert!(questions.iter().all(|q| q["sample_answer"] == ""));
                    assert!(questions.iter().all(|q| q["key_points"].as_array().unwrap().is_empty()));
                }),
        )
        .step(answer(0, "A mutable borrow is exclusive and the compiler enforces it with compile time checks.").assert_body(
            |body| {
                assert_eq!(body["ai_score"], 100);
                assert_eq!(body["strengths"].as_array().unwrap().len(), 2);
            },
        ))
        .step(answer(1, "").assert_body(|body| assert_eq!(body["ai_score"], 0)))
        .step(
            Action::new("complete", "POST", "")
                .with_dyn_path(|ctx| format!("/api/interviews/attempts/{}/complete", ctx.id("started", "/attempt")))
                .assert_body(|body| {
                    assert_eq!(body["attempt"]["overall_score"], 50);
                    assert!(body["attempt"]["completed_at"].is_string());
                    assert_eq!(body["answers"].as_array().unwrap().len(), 2);
                }),
        )
        .step(answer(0, "too late").with_expect(StatusCode::BAD_REQUEST))
        .step(
            Action::new("my attempts", "GET", "/api/interviews/my-attempts")
                .assert_body(|body| assert_eq!(body.as_array().unwrap().len(), 1)),
        )
        .step(login_action(INSTRUCTOR))
        .step(
            Action::new("owner reviews attempt", "GET", "")
                .with_dyn_path(|ctx| format!("/api/interviews/attempts/{}", ctx.id("started", "/attempt")))
                .assert_body(|body| assert_eq!(body["answers"].as_array().unwrap().len(), 2)),
        )
        .step(
            Action::new("owner starts", "POST", "")
                .with_dyn_path(|ctx| format!("/api/interviews/{}/start", ctx.id("interview", "/interview")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_interview_questions_rollback_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(login_action(INSTRUCTOR))
        .step(create_course_action("Interview course", 0))
        // postgres rejects NUL in text, so the second question insert fails
        .step(
            Action::new("create interview with unstorable question", "POST", "/api/interviews")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": ctx.id("course", ""),
                        "title": "Half stored",
                        "job_role": "Backend Engineer",
                        "difficulty": "easy",
                        "questions": [
                            { "question": "What is a lifetime?" },
                            { "question": "What is \u{0} for?" }
                        ],
                    })
                })
                .with_expect(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .step(
            Action::new("no interview left behind", "GET", "")
                .with_dyn_path(|ctx| format!("/api/interviews/course/{}", ctx.id("course", "")))
                .assert_body(|body| assert!(body.as_array().unwrap().is_empty())),
        )
        .run(&mut server, db)
        .await;
}
