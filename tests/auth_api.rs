mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use flightplan::{
    models::account::Role, repositories::account::AccountRepository,
    services::auth as auth_service,
};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{assert_no_password_field, TestContext};

fn user_id(body: &Value) -> Uuid {
    body["user"]["id"].as_str().unwrap().parse().unwrap()
}

fn without_updated_at(mut user: Value) -> Value {
    user.as_object_mut().unwrap().remove("updatedAt");
    user
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_login_resolve_to_same_account() {
        let ctx = TestContext::new();

        let (status, registered) = ctx.register("Ada Lovelace", "ada@example.com", "secret1").await;
        assert_eq!(status, StatusCode::CREATED, "Registration failed: {registered}");
        assert!(registered["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(registered["user"]["email"], "ada@example.com");
        assert_eq!(registered["user"]["role"], "user");
        assert_eq!(registered["user"]["major"], "");
        assert_eq!(registered["user"]["completedCourses"], json!([]));

        let (status, logged_in) = ctx.login("ada@example.com", "secret1").await;
        assert_eq!(status, StatusCode::OK, "Login failed: {logged_in}");
        assert_eq!(user_id(&registered), user_id(&logged_in));
    }

    #[tokio::test]
    async fn test_email_is_trimmed_and_case_insensitive() {
        let ctx = TestContext::new();

        let (status, body) = ctx.register("Ada", "  Ada@Example.COM ", "secret1").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "ada@example.com");

        let (status, _) = ctx.login("ADA@example.com", "secret1").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_email_in_any_case_is_rejected() {
        let ctx = TestContext::new();

        let (status, _) = ctx.register("First", "A@x.com", "secret1").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = ctx.register("Second", "a@x.com", "secret2").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email already registered");
        assert_eq!(ctx.repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let ctx = TestContext::new();
        ctx.register("Ada", "ada@example.com", "secret1").await;

        let (wrong_status, wrong_password) = ctx.login("ada@example.com", "secret2").await;
        let (unknown_status, unknown_email) = ctx.login("nobody@example.com", "secret1").await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, json!({ "error": "Invalid email or password" }));
    }

    #[tokio::test]
    async fn test_fresh_token_verifies_and_expired_token_does_not() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        let (status, verified) = ctx
            .request(Method::GET, "/api/auth/verify", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["valid"], true);
        assert_eq!(user_id(&verified), user_id(&registered));

        let account = ctx
            .repo
            .find_by_id(user_id(&registered))
            .await
            .unwrap()
            .unwrap();
        let stale = ctx
            .state
            .tokens
            .issue_at(&account, Utc::now() - Duration::days(8))
            .unwrap();

        let (status, body) = ctx
            .request(Method::GET, "/api/auth/verify", Some(&stale), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_or_malformed_tokens() {
        let ctx = TestContext::new();

        for uri in ["/api/auth/profile", "/api/me", "/api/auth/verify"] {
            let (status, _) = ctx.request(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");

            let (status, _) = ctx
                .request(Method::GET, uri, Some("not-a-token"), None)
                .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with garbage token");
        }

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/auth/profile")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = ctx.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_caller_carries_its_token_claims() {
        let ctx = TestContext::new();
        let (_, body) = ctx.register("Claims", "claims@example.com", "secret1").await;
        let token = body["token"].as_str().unwrap();

        let caller = auth_service::authenticate_token(&ctx.state, token)
            .await
            .unwrap();

        assert_eq!(caller.claims.sub, caller.account.id);
        assert_eq!(caller.claims.sub, user_id(&body));
        assert_eq!(caller.claims.email, "claims@example.com");
        assert_eq!(caller.claims.role, Role::User);
        assert_eq!(caller.claims.exp - caller.claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_token_for_vanished_account_is_rejected() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        ctx.repo.remove(user_id(&registered)).await.unwrap();

        let (status, _) = ctx
            .request(Method::GET, "/api/auth/profile", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_and_me_return_the_caller() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        let (status, profile) = ctx
            .request(Method::GET, "/api/auth/profile", Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, me) = ctx.request(Method::GET, "/api/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(profile, me);
        assert_eq!(profile["user"], registered["user"]);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields_alone() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        let (status, seeded) = ctx
            .request(
                Method::PUT,
                "/api/auth/profile",
                Some(token),
                Some(json!({
                    "gradeLevel": "Junior",
                    "degreeType": "B.S.",
                    "completedCourses": ["CS101", "MATH120"],
                    "careerInterests": ["research"],
                    "availability": [{ "day": "Monday", "slot": "09:00-11:00" }]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{seeded}");

        let update = json!({ "major": "Biology" });
        let (_, once) = ctx
            .request(Method::PUT, "/api/auth/profile", Some(token), Some(update.clone()))
            .await;
        let (_, twice) = ctx
            .request(Method::PUT, "/api/auth/profile", Some(token), Some(update))
            .await;

        let user = &twice["user"];
        assert_eq!(user["major"], "Biology");
        assert_eq!(user["gradeLevel"], "Junior");
        assert_eq!(user["degreeType"], "B.S.");
        assert_eq!(user["completedCourses"], json!(["CS101", "MATH120"]));
        assert_eq!(user["careerInterests"], json!(["research"]));
        assert_eq!(user["availability"][0]["slot"], "09:00-11:00");
        assert_eq!(
            without_updated_at(once["user"].clone()),
            without_updated_at(twice["user"].clone())
        );

        let seeded_at = seeded["user"]["updatedAt"].as_str().unwrap();
        let updated_at = twice["user"]["updatedAt"].as_str().unwrap();
        assert!(
            chrono::DateTime::parse_from_rfc3339(updated_at).unwrap()
                >= chrono::DateTime::parse_from_rfc3339(seeded_at).unwrap()
        );
    }

    #[tokio::test]
    async fn test_profile_update_rejects_oversized_fields() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        let (status, _) = ctx
            .request(
                Method::PUT,
                "/api/auth/profile",
                Some(token),
                Some(json!({ "major": "x".repeat(500) })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_no_response_carries_a_password() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        assert_no_password_field(&registered["user"]);
        let token = registered["token"].as_str().unwrap();

        let (_, logged_in) = ctx.login("ada@example.com", "secret1").await;
        assert_no_password_field(&logged_in["user"]);

        let (_, profile) = ctx
            .request(Method::GET, "/api/auth/profile", Some(token), None)
            .await;
        assert_no_password_field(&profile);

        let (_, updated) = ctx
            .request(
                Method::PUT,
                "/api/auth/profile",
                Some(token),
                Some(json!({ "major": "Physics", "password": "sneaky1" })),
            )
            .await;
        assert_no_password_field(&updated);

        let (status, _) = ctx.login("ada@example.com", "secret1").await;
        assert_eq!(status, StatusCode::OK, "profile update must not touch the password");
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let ctx = TestContext::new();

        let cases = [
            json!({ "name": "Ada", "email": "ada@example.com", "password": "12345" }),
            json!({ "name": "Ada", "email": "not-an-email", "password": "secret1" }),
            json!({ "name": "   ", "email": "ada@example.com", "password": "secret1" }),
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1",
                "confirmPassword": "secret2"
            }),
            json!({ "email": "ada@example.com", "password": "secret1" }),
        ];

        for body in cases {
            let (status, response) = ctx
                .request(Method::POST, "/api/auth/register", None, Some(body.clone()))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
            assert!(response["error"].is_string());
        }
        assert!(ctx.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_validation_error() {
        let ctx = TestContext::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = ctx.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_self_registration_cannot_claim_admin() {
        let ctx = TestContext::new();
        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "name": "Mallory",
                    "email": "mallory@example.com",
                    "password": "secret1",
                    "role": "admin"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "user");
    }

    #[tokio::test]
    async fn test_concurrent_registrations_yield_one_account() {
        let ctx = TestContext::new();

        let attempts = (0..8).map(|i| {
            let email = if i % 2 == 0 { "race@example.com" } else { "RACE@example.com" };
            ctx.register("Racer", email, "secret1")
        });
        let results = futures::future::join_all(attempts).await;

        let created = results.iter().filter(|(s, _)| *s == StatusCode::CREATED).count();
        let conflicts = results.iter().filter(|(s, _)| *s == StatusCode::CONFLICT).count();
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(ctx.repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_change_password() {
        let ctx = TestContext::new();
        let (_, registered) = ctx.register("Ada", "ada@example.com", "secret1").await;
        let token = registered["token"].as_str().unwrap();

        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/auth/change-password",
                Some(token),
                Some(json!({ "oldPassword": "wrong1", "newPassword": "secret2" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Current password is incorrect");

        let (status, body) = ctx
            .request(
                Method::POST,
                "/api/auth/change-password",
                Some(token),
                Some(json!({ "oldPassword": "secret1", "newPassword": "secret2" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = ctx.login("ada@example.com", "secret1").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = ctx.login("ada@example.com", "secret2").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let ctx = TestContext::new();
        let (status, body) = ctx.request(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "flightplan");
    }
}
