use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use reportbook::http::AppState;
use reportbook::models::NewStudent;
use reportbook::store::{MemoryStore, Store};
use serde_json::{json, Value};
use tower::ServiceExt;

// Rows go in through the store directly; these tests only exercise the read
// side of the listing contract.
fn app_with_students(count: u32) -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    for n in 0..count {
        store
            .append_student(NewStudent {
                first_name: format!("First{n}"),
                last_name: format!("Last{n}"),
                email: format!("s{n:02}@school.com"),
                student_id: format!("STU{n:03}"),
                date_of_birth: None,
                enrollment_date: None,
                class: None,
                avatar: None,
            })
            .expect("seed student");
    }
    reportbook::http::app(AppState::new(store))
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let response = app.clone().oneshot(request).await.expect("route request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("parse body json"))
}

fn emails(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|s| s["email"].as_str().expect("email").to_string())
        .collect()
}

#[tokio::test]
async fn default_window_is_the_first_ten() {
    let app = app_with_students(12);
    let (status, body) = get_json(&app, "/api/students").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], json!(1));
    assert_eq!(body["data"]["pageSize"], json!(10));
    assert_eq!(body["data"]["total"], json!(12));
    assert_eq!(body["data"]["totalPages"], json!(2));
    assert_eq!(emails(&body).len(), 10);
    assert_eq!(emails(&body)[0], "s00@school.com");
}

#[tokio::test]
async fn second_page_holds_the_remainder() {
    let app = app_with_students(12);
    let (_, body) = get_json(&app, "/api/students?page=2").await;

    assert_eq!(body["data"]["page"], json!(2));
    assert_eq!(emails(&body), vec!["s10@school.com", "s11@school.com"]);
    assert_eq!(body["data"]["total"], json!(12));
    assert_eq!(body["data"]["totalPages"], json!(2));
}

#[tokio::test]
async fn custom_page_size_changes_the_window_and_counts() {
    let app = app_with_students(12);
    let (_, body) = get_json(&app, "/api/students?page=2&pageSize=5").await;

    assert_eq!(body["data"]["pageSize"], json!(5));
    assert_eq!(body["data"]["totalPages"], json!(3));
    assert_eq!(
        emails(&body),
        vec![
            "s05@school.com",
            "s06@school.com",
            "s07@school.com",
            "s08@school.com",
            "s09@school.com"
        ]
    );
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_counts_intact() {
    let app = app_with_students(12);
    let (status, body) = get_json(&app, "/api/students?page=9&pageSize=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["page"], json!(9));
    assert_eq!(body["data"]["total"], json!(12));
    assert_eq!(body["data"]["totalPages"], json!(3));
}

#[tokio::test]
async fn zero_and_negative_pages_are_empty_but_echoed() {
    let app = app_with_students(12);

    let (_, zero) = get_json(&app, "/api/students?page=0").await;
    assert_eq!(zero["data"]["items"], json!([]));
    assert_eq!(zero["data"]["page"], json!(0));
    assert_eq!(zero["data"]["total"], json!(12));

    let (_, negative) = get_json(&app, "/api/students?page=-3").await;
    assert_eq!(negative["data"]["items"], json!([]));
    assert_eq!(negative["data"]["page"], json!(-3));
}

#[tokio::test]
async fn junk_parameters_fall_back_to_defaults() {
    let app = app_with_students(12);
    let (status, body) = get_json(&app, "/api/students?page=abc&pageSize=banana").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], json!(1));
    assert_eq!(body["data"]["pageSize"], json!(10));
    assert_eq!(emails(&body).len(), 10);
}

#[tokio::test]
async fn zero_and_fractional_page_sizes_fall_back() {
    let app = app_with_students(12);

    let (_, zero) = get_json(&app, "/api/students?pageSize=0").await;
    assert_eq!(zero["data"]["pageSize"], json!(10));
    assert_eq!(emails(&zero).len(), 10);

    let (_, fractional) = get_json(&app, "/api/students?pageSize=2.5").await;
    assert_eq!(fractional["data"]["pageSize"], json!(10));
}

#[tokio::test]
async fn repeating_a_request_returns_the_same_window() {
    let app = app_with_students(12);
    let (_, first) = get_json(&app, "/api/students?page=2&pageSize=4").await;
    let (_, second) = get_json(&app, "/api/students?page=2&pageSize=4").await;
    assert_eq!(first["data"]["items"], second["data"]["items"]);
    assert_eq!(first["data"]["total"], second["data"]["total"]);
}

#[tokio::test]
async fn walking_all_pages_covers_every_row_once() {
    let app = app_with_students(23);
    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        let (_, body) = get_json(&app, &format!("/api/students?page={page}&pageSize=7")).await;
        let batch = emails(&body);
        if batch.is_empty() {
            break;
        }
        seen.extend(batch);
        page += 1;
    }

    assert_eq!(page - 1, 4);
    assert_eq!(seen.len(), 23);
    let expected: Vec<String> = (0..23).map(|n| format!("s{n:02}@school.com")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn empty_collection_lists_cleanly() {
    let app = app_with_students(0);
    let (status, body) = get_json(&app, "/api/students").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], json!(0));
    assert_eq!(body["data"]["totalPages"], json!(0));
}
