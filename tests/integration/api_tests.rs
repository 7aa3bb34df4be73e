// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::helpers::{
    build_engine, card_page, test_options, wait_until, InMemoryLeads, ScriptedFetcher, TestEngine,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use leadrs::domain::models::job::JobStatus;
use leadrs::domain::models::source::NewSource;
use leadrs::presentation::routes;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const URL: &str = "https://offices.example.com/relocations";

fn app(t: &TestEngine) -> Router {
    routes::app(
        t.engine.clone(),
        t.jobs.clone(),
        t.sources.clone(),
        t.leads.clone(),
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn selectors() -> Value {
    json!({
        "containerSelector": ".card",
        "fieldSelectors": { "companyName": ".name" }
    })
}

/// 健康检查测试
#[tokio::test]
async fn health_check_works() {
    let response = routes::routes()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_source_validates_input() {
    let t = build_engine(
        ScriptedFetcher::default(),
        InMemoryLeads::default(),
        test_options(),
    );
    let app = app(&t);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/sources",
        Some(json!({
            "name": "Office moves",
            "url": URL,
            "selectors": selectors(),
            "auth_credential": "Bearer secret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Office moves");
    assert_eq!(body["enabled"], true);
    assert!(body.get("auth_credential").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/sources",
        Some(json!({ "name": "Broken", "url": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/sources",
        Some(json!({
            "name": "Broken selectors",
            "url": URL,
            "selectors": { "containerSelector": ".card", "fieldSelectors": { "companyName": "[[" } }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("companyName"));

    let (status, body) = send(&app, Method::GET, "/v1/sources", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scrape_job_control_over_http() {
    let (leads, gate) = InMemoryLeads::gated();
    let page = card_page(&[(Some("Acme"), "1 George St"), (Some("Globex"), "2 Pitt St")]);
    let t = build_engine(ScriptedFetcher::default().page(URL, &page), leads, test_options());
    let source = t
        .add_source(NewSource::new("Office moves", URL, selectors()))
        .await;
    let app = app(&t);
    let scrape_uri = format!("/v1/sources/{}/scrape", source.id);

    let (status, body) = send(&app, Method::POST, &scrape_uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::POST, &scrape_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::GET, "/v1/jobs/active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["job_id"], job_id);
    assert_eq!(body[0]["source_id"], source.id);

    let (_, body) = send(&app, Method::POST, &format!("/v1/jobs/{}/pause", job_id), None).await;
    assert_eq!(body["success"], true);
    let (_, body) = send(&app, Method::POST, &format!("/v1/jobs/{}/resume", job_id), None).await;
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, Method::DELETE, &format!("/v1/jobs/{}", job_id), None).await;
    assert_eq!(body["success"], true);
    let (_, body) = send(&app, Method::DELETE, &format!("/v1/jobs/{}", job_id), None).await;
    assert_eq!(body["success"], false);

    gate.add_permits(10);
    let engine = t.engine.clone();
    let source_id = source.id;
    wait_until(|| !engine.is_running(source_id)).await;

    let (status, body) = send(&app, Method::GET, &format!("/v1/jobs/{}", job_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["status"], "cancelled");
    assert_eq!(t.jobs.get(job_id as i32).status, JobStatus::Cancelled);
}

#[tokio::test]
async fn test_completed_scrape_exposes_leads() {
    let page = card_page(&[(Some("Acme"), "1 George St"), (Some("Globex"), "2 Pitt St")]);
    let t = build_engine(
        ScriptedFetcher::default().page(URL, &page),
        InMemoryLeads::default(),
        test_options(),
    );
    let source = t
        .add_source(NewSource::new("Office moves", URL, selectors()))
        .await;
    let app = app(&t);

    let (status, body) = send(&app, Method::POST, &format!("/v1/sources/{}/scrape", source.id), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_id"].as_i64().unwrap() as i32;

    let jobs = t.jobs.clone();
    wait_until(|| jobs.get(job_id).status == JobStatus::Completed).await;

    let (status, body) = send(&app, Method::GET, &format!("/v1/sources/{}/leads", source.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["company_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acme", "Globex"]);
}

#[tokio::test]
async fn test_error_statuses() {
    let t = build_engine(
        ScriptedFetcher::default(),
        InMemoryLeads::default(),
        test_options(),
    );
    let mut disabled = NewSource::new("Disabled", URL, selectors());
    disabled.enabled = false;
    let disabled = t.add_source(disabled).await;
    let app = app(&t);

    let (status, _) = send(&app, Method::POST, "/v1/sources/999/scrape", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, &format!("/v1/sources/{}/scrape", disabled.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/v1/jobs/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/v1/sources/999/leads", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::POST, "/v1/jobs/999/pause", None).await;
    assert_eq!(body["success"], false);
}
