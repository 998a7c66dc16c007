// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security tests for internal task routes.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn sweep_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/tasks/close-stale-sessions");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_sweep_without_secret_forbidden() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(sweep_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_with_wrong_secret_forbidden() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(sweep_request(Some("Bearer not-the-secret")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_rejects_user_jwt() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("admin-user");

    let response = app
        .oneshot(sweep_request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_with_secret_reaches_handler() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(sweep_request(Some(&format!(
            "Bearer {}",
            state.config.tasks_secret
        ))))
        .await
        .unwrap();

    // Past auth; the offline database then fails the query.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
