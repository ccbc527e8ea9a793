use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::workflows::careers::router::{apply_handler, careers_router, job_handler};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("encode body")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn open_session(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(empty_request("POST", "/api/v1/careers/sessions"))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::CREATED);
    let body = read_json_body(response).await;
    body["session_id"]
        .as_str()
        .expect("session id present")
        .to_string()
}

#[tokio::test]
async fn list_route_applies_query_filters() {
    let router = careers_router(build_service());

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/careers/jobs?search=React&department=All&type=All",
        ))
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["jobs"][0]["title"], "Senior React Developer");
    assert_eq!(body["jobs"][0]["type"], "Full-time");
    assert_eq!(body["jobs"][0]["postedDate"], "2024-03-15");
}

#[tokio::test]
async fn list_route_without_query_returns_full_board() {
    let router = careers_router(build_service());

    let response = router
        .oneshot(empty_request("GET", "/api/v1/careers/jobs"))
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert_eq!(body["total"], 10);
    assert_eq!(body["jobs"][0]["id"], "job1");
    assert_eq!(body["jobs"][9]["id"], "job10");
}

#[tokio::test]
async fn facets_route_lists_sentinel_first() {
    let router = careers_router(build_service());

    let response = router
        .oneshot(empty_request("GET", "/api/v1/careers/facets"))
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert_eq!(body["departments"][0], "All");
    assert_eq!(body["departments"][1], "Engineering");
    assert_eq!(
        body["job_types"],
        json!(["All", "Full-time", "Contract", "Remote", "Part-time"])
    );
}

#[tokio::test]
async fn job_handler_returns_not_found_for_unknown_id() {
    let response = job_handler(State(build_service()), Path("job404".to_string())).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn apply_handler_returns_conflict_while_browsing() {
    let service = build_service();
    let session_id = service.open_session().session_id;

    let response = apply_handler(State(service), Path(session_id.0)).await;

    assert_status(&response, StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "cannot begin applying while browsing");
}

#[tokio::test]
async fn submit_route_returns_structured_violations() {
    let service = build_service();
    let session_id = applying_session(&service, "job1");
    let router = careers_router(service);

    let response = router
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/careers/sessions/{}/submit", session_id),
        ))
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .expect("violations array")
        .iter()
        .filter_map(|violation| violation["field"].as_str())
        .collect();
    assert_eq!(fields, ["applicant_name", "email", "phone", "resume"]);
}

#[tokio::test(start_paused = true)]
async fn full_application_flow_over_http() {
    let router = careers_router(build_service());
    let session_id = open_session(&router).await;
    let base = format!("/api/v1/careers/sessions/{session_id}");

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{base}/select"),
            json!({ "job_id": "job3" }),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["mode"], "viewing_details");
    assert_eq!(body["selected_job"]["title"], "UI/UX Designer");

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("{base}/apply")))
        .await
        .expect("router responds");
    assert_eq!(read_json_body(response).await["mode"], "applying_form");

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("{base}/draft"),
            json!({
                "applicant_name": "Jane Doe",
                "email": "jane@x.com",
                "phone": "+1 555 0100",
                "resume": { "name": "jane-doe.pdf", "content_key": "upload-1" }
            }),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("{base}/submit")))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["mode"], "submitted");
    assert_eq!(body["receipt"]["job_id"], "job3");

    let response = router
        .clone()
        .oneshot(empty_request("POST", &format!("{base}/reset")))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["mode"], "browsing");
    assert_eq!(body["selected_job"], Value::Null);
}

#[tokio::test]
async fn closed_session_is_gone() {
    let router = careers_router(build_service());
    let session_id = open_session(&router).await;
    let uri = format!("/api/v1/careers/sessions/{session_id}");

    let response = router
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::NO_CONTENT);

    let response = router
        .oneshot(empty_request("GET", &uri))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::NOT_FOUND);
}
