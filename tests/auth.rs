mod common;
use reqwest::StatusCode;
use skillforge::web::middlewares::AUTH_TOKEN;
use tower_cookies::cookie::SameSite;

use crate::common::{ADMIN, Action, Flow, STUDENT, login_action, register_action, setup_server, setup_test_db};

#[tokio::test]
async fn route_register_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(
            register_action("New.Student@Example.com", "secret1", "STUDENT")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
                    assert_eq!(body["user"]["email"], "new.student@example.com");
                    assert_eq!(body["user"]["role"], "STUDENT");
                    assert!(body["user"].get("password_hash").is_none());
                }),
        )
        // same email in another case
        .step(
            register_action("new.student@example.com", "secret1", "STUDENT")
                .with_expect(StatusCode::CONFLICT),
        )
        .step(register_action("root@example.com", "secret1", "ADMIN").with_expect(StatusCode::BAD_REQUEST))
        .step(register_action("short@example.com", "123", "STUDENT").with_expect(StatusCode::BAD_REQUEST))
        .step(register_action("not-an-email", "secret1", "STUDENT").with_expect(StatusCode::BAD_REQUEST))
        .step(
            register_action("tutor@example.com", "secret1", "INSTRUCTOR")
                .assert_body(|body| assert_eq!(body["user"]["role"], "INSTRUCTOR")),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_login_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(
            login_action(STUDENT)
                .assert_cookie(AUTH_TOKEN, |cookie| assert_eq!(cookie.http_only(), Some(true)))
                .assert_body(|body| assert_eq!(body["user"]["role"], "STUDENT"))
                .with_save_as("student_auth"),
        )
        .step(
            login_action(("student@skillforge.com", "wrong-password"))
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| {
                    assert!(body["message"].as_str().unwrap().contains("Authentication error"));
                }),
        )
        .step(login_action(("nobody@skillforge.com", "whatever")).with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_me_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(Action::new("me anonymous", "GET", "/api/auth/me").with_expect(StatusCode::UNAUTHORIZED))
        .step(login_action(STUDENT).with_save_as("student_auth"))
        .step(
            Action::new("me with cookie", "GET", "/api/auth/me")
                .assert_body(|body| assert_eq!(body["email"], "student@skillforge.com")),
        )
        .step(Action::new("logout", "POST", "/api/auth/logout"))
        .step(
            Action::new("me with bearer", "GET", "/api/auth/me")
                .with_clear_cookies(true)
                .with_bearer_from("student_auth")
                .assert_body(|body| assert_eq!(body["role"], "STUDENT")),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn route_invalid_token_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    let resp = server
        .get("/api/auth/me")
        .authorization_bearer("not-a-jwt")
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    // token is checked before the route decides whether it needs a user
    let resp = server
        .get("/api/courses/public")
        .authorization_bearer("not-a-jwt")
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    drop(db);
}

#[tokio::test]
async fn route_admin_users_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(register_action("victim@example.com", "secret1", "STUDENT").with_save_as("victim"))
        .step(
            Action::new("users as student", "GET", "/api/admin/users")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(victim_me())
        .step(login_action(ADMIN).with_save_as("admin_auth"))
        .step(
            Action::new("users page", "GET", "/api/admin/users")
                .with_param("limit", "2")
                .assert_body(|body| {
                    assert_eq!(body["items"].as_array().unwrap().len(), 2);
                    assert_eq!(body["total"], 4);
                    assert_eq!(body["limit"], 2);
                }),
        )
        .step(
            Action::new("disable victim", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/admin/users/{}/enabled", ctx.id("victim", "/user")))
                .with_param("enabled", "false")
                .assert_body(|body| assert_eq!(body["is_enabled"], false)),
        )
        // a token issued before the account was disabled stops working at once
        .step(victim_me().with_expect(StatusCode::FORBIDDEN))
        .step(
            Action::new("disable self", "PUT", "")
                .with_dyn_path(|ctx| format!("/api/admin/users/{}/enabled", ctx.id("admin_auth", "/user")))
                .with_param("enabled", "false")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("delete self", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/admin/users/{}", ctx.id("admin_auth", "/user")))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("dashboard", "GET", "/api/admin/dashboard")
                .assert_body(|body| assert_eq!(body["data"]["total_users"], 4)),
        )
        .step(
            login_action(("victim@example.com", "secret1")).with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_action(ADMIN))
        .step(
            Action::new("delete victim", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/admin/users/{}", ctx.id("victim", "/user"))),
        )
        // the token of a deleted account authenticates nobody
        .step(victim_me().with_clear_cookies(true).with_expect(StatusCode::UNAUTHORIZED))
        .step(
            Action::new("catalogue with deleted account token", "GET", "/api/courses")
                .with_bearer_from("victim"),
        )
        .run(&mut server, db)
        .await;
}

fn victim_me() -> Action {
    Action::new("victim me", "GET", "/api/auth/me").with_bearer_from("victim")
}
