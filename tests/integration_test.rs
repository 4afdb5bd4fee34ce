//! Integration tests for the carpool API
//!
//! These tests drive the full router:
//! - HTTP routing
//! - JSON request/response handling
//! - Booking rules and their status codes

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use carpool::route::create_app;
use carpool::store::AppState;

const OFFERER: &str = "EMP1001";
const OTHER: &str = "EMP2002";

fn setup_test_app() -> Router {
    create_app(AppState::new())
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

fn date_time_in(days: i64) -> String {
    (Local::now().naive_local() + Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn sample_ride(days: i64) -> Value {
    json!({
        "startPoint": "Delhi",
        "stops": ["Stop1", "Stop2"],
        "destination": "Noida",
        "dateTime": date_time_in(days),
        "availableSeats": 2,
        "companyUserId": OFFERER
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_ride(app: &Router, payload: Value) -> u64 {
    let (status, body) = send(app, "POST", "/rides/create", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().unwrap()
}

async fn join(app: &Router, ride_id: u64, requester: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/rides/{ride_id}/requests"),
        Some(json!({ "companyUserId": requester })),
    )
    .await
}

#[tokio::test]
async fn test_create_and_list_ride() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rides/create")
                .header("content-type", "application/json")
                .body(Body::from(sample_ride(1).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response.into_body()).await;
    assert!(created["id"].as_u64().is_some());
    assert_eq!(created["offererId"], OFFERER);
    assert_eq!(created["requests"], json!([]));

    let (status, body) = send(&app, "GET", "/rides/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["startPoint"], "Delhi");
    assert_eq!(body[0]["availableSeats"], 2);
    assert_eq!(body[0]["stops"], json!(["Stop1", "Stop2"]));
}

#[tokio::test]
async fn test_create_accepts_date_only_timestamp() {
    let app = setup_test_app();
    let mut payload = sample_ride(0);
    payload["dateTime"] = json!((Local::now().date_naive() + Duration::days(3))
        .format("%Y-%m-%d")
        .to_string());

    let id = create_ride(&app, payload).await;

    let (status, body) = send(&app, "GET", &format!("/rides/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["dateTime"].as_str().unwrap().ends_with("T00:00:00"));
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = setup_test_app();
    let mut payload = sample_ride(1);
    payload["dateTime"] = json!("next tuesday");

    let (status, _) = send(&app, "POST", "/rides/create", Some(payload)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_get_ride_not_found() {
    let app = setup_test_app();

    let (status, body) = send(&app, "GET", "/rides/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_edit_ride() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let mut payload = sample_ride(1);
    payload["availableSeats"] = json!(5);
    let (status, body) = send(&app, "PUT", &format!("/rides/{id}"), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableSeats"], 5);
    assert_eq!(body["id"], id);

    let (status, _) = send(&app, "PUT", "/rides/999", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_ride_drops_requests_not_sent_back() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;
    let (status, _) = join(&app, id, OTHER).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "PUT", &format!("/rides/{id}"), Some(sample_ride(1))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"], json!([]));

    let (_, requests) = send(&app, "GET", &format!("/rides/{id}/requests"), None).await;
    assert_eq!(requests, json!([]));
}

#[tokio::test]
async fn test_delete_ride() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let (status, body) = send(&app, "DELETE", &format!("/rides/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedId"], id);

    let (status, body) = send(&app, "GET", "/rides/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Unknown ids are a no-op
    let (status, _) = send(&app, "DELETE", "/rides/12345", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_ride() {
    let app = setup_test_app();
    create_ride(&app, sample_ride(1)).await;

    let (status, body) = send(&app, "GET", "/rides/search?startPoint=delhi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["destination"], "Noida");

    let (_, body) = send(&app, "GET", "/rides/search?stop=STOP2&minSeats=2", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/rides/search?minSeats=3", None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, "GET", "/rides/search?date=not-a-date", None).await;
    assert_eq!(body, json!([]));

    let (_, all) = send(&app, "GET", "/rides/all", None).await;
    let (_, unfiltered) = send(&app, "GET", "/rides/search", None).await;
    assert_eq!(all, unfiltered);
}

#[tokio::test]
async fn test_search_empty_min_seats_is_unconstrained() {
    let app = setup_test_app();
    create_ride(&app, sample_ride(1)).await;

    let (status, body) = send(&app, "GET", "/rides/search?minSeats=&startPoint=delhi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/rides/search?minSeats=two", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_loose_date_spellings() {
    let app = setup_test_app();
    let mut payload = sample_ride(0);
    payload["dateTime"] = json!("2099-01-06T10:00:00");
    create_ride(&app, payload).await;

    let (_, body) = send(&app, "GET", "/rides/search?date=2099-01-06", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    for date in ["2099-1-6", "%202099-01-06", "%2B2099-01-06"] {
        let (status, body) = send(&app, "GET", &format!("/rides/search?date={date}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]), "date {date} should match nothing");
    }
}

#[tokio::test]
async fn test_request_to_join_ride() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let (status, body) = join(&app, id, OTHER).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["rideId"], id);
    assert_eq!(body["requesterId"], OTHER);

    let (status, body) = send(&app, "GET", &format!("/rides/{id}/requests"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_to_unknown_ride() {
    let app = setup_test_app();

    let (status, _) = join(&app, 77, OTHER).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/rides/77/requests", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prevent_duplicate_requests() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let (status, _) = join(&app, id, OTHER).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = join(&app, id, OTHER).await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], "duplicate_request");
}

#[tokio::test]
async fn test_prevent_requesting_own_ride() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let (status, body) = join(&app, id, OFFERER).await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], "self_booking");
}

#[tokio::test]
async fn test_accept_request_and_overbooking() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;

    let (_, r1) = join(&app, id, "EMP3003").await;
    let (_, r2) = join(&app, id, "EMP4004").await;

    for request in [&r1, &r2] {
        let uri = format!("/rides/{id}/requests/{}/accept", request["id"]);
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ACCEPTED");
    }

    let (_, r3) = join(&app, id, "EMP5005").await;
    let uri = format!("/rides/{id}/requests/{}/accept", r3["id"]);
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], "no_seats_available");

    let (_, ride) = send(&app, "GET", &format!("/rides/{id}"), None).await;
    assert_eq!(ride["availableSeats"], 0);

    // Full rides leave the public listing
    let (_, all) = send(&app, "GET", "/rides/all", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_reject_request_twice() {
    let app = setup_test_app();
    let id = create_ride(&app, sample_ride(1)).await;
    let (_, request) = join(&app, id, OTHER).await;
    let uri = format!("/rides/{id}/requests/{}/reject", request["id"]);

    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "REJECTED");
    }

    let (status, _) = send(&app, "POST", &format!("/rides/{id}/requests/999/reject"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hide_expired_rides() {
    let app = setup_test_app();
    let mut expired = sample_ride(-1);
    expired["startPoint"] = json!("OldCity");
    expired["destination"] = json!("PastTown");
    expired["companyUserId"] = json!("EMP9999");
    let id = create_ride(&app, expired).await;

    let (_, all) = send(&app, "GET", "/rides/all", None).await;
    assert!(all
        .as_array()
        .unwrap()
        .iter()
        .all(|ride| ride["startPoint"] != "OldCity"));

    let (_, found) = send(&app, "GET", "/rides/search?startPoint=oldcity", None).await;
    assert_eq!(found, json!([]));

    let (status, history) = send(&app, "GET", "/rides/history/offered?companyUserId=EMP9999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["id"], id);
}

#[tokio::test]
async fn test_taken_history() {
    let app = setup_test_app();
    let accepted_on = create_ride(&app, sample_ride(1)).await;
    let pending_on = create_ride(&app, sample_ride(2)).await;

    let (_, request) = join(&app, accepted_on, OTHER).await;
    join(&app, pending_on, OTHER).await;
    let uri = format!("/rides/{accepted_on}/requests/{}/accept", request["id"]);
    send(&app, "POST", &uri, None).await;

    let (status, taken) = send(&app, "GET", &format!("/rides/history/taken?companyUserId={OTHER}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = taken.as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(accepted_on)]);

    let (_, offered) = send(&app, "GET", &format!("/rides/history/offered?userId={OFFERER}"), None).await;
    assert_eq!(offered.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_requires_user() {
    let app = setup_test_app();

    let (status, _) = send(&app, "GET", "/rides/history/taken", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
