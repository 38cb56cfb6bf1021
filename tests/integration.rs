//! Integration tests for shelfdash.
//!
//! These tests drive the dashboard end to end: dataset load, filtering, chart
//! building, the update interaction, and the HTTP routes.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use shelfdash::prelude::*;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

const BOOKS_CSV: &str = "bookID,title,authors,average_rating,  num_pages,ratings_count\n\
    1,Book A,Author X,4.57,100,2095690\n\
    2,Book B,Author Y,4.49,300,2153167\n\
    3,Book C,Author X,4.42,50,6333\n\
    4,Broken Row,Author Y,with,extra,field,1\n\
    5,Book D,Author W,3.10,not-a-number,12\n";

/// Write the fixture CSV into a temp dir and load it through the public loader.
fn load_fixture() -> (tempfile::TempDir, Dataset, LoadReport) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(BOOKS_CSV.as_bytes()).unwrap();

    let source = DatasetSource::parse(path.to_str().unwrap());
    let (dataset, report) = load_dataset(&source, false).unwrap();
    (dir, dataset, report)
}

fn titles(records: &[BookRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn test_load_skips_malformed_rows() {
    let (_dir, dataset, report) = load_fixture();

    assert_eq!(report.rows_read, 5);
    assert_eq!(report.skipped, 2);
    assert_eq!(titles(dataset.records()), vec!["Book A", "Book B", "Book C"]);
    assert_eq!(dataset.authors(), &["Author X", "Author Y"]);
    assert_eq!(dataset.max_num_pages(), 300);
}

#[test]
fn test_load_missing_file_is_fatal() {
    let source = DatasetSource::parse("/definitely/not/here/books.csv");
    let err = load_dataset(&source, false).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn test_load_workbook() {
    let source = DatasetSource::parse(&fixture_path("books.xlsx"));
    assert!(source.is_workbook());
    let (dataset, report) = load_dataset(&source, false).unwrap();

    // Padded "  num_pages" header resolves; text, blank and fractional page cells are skipped
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.skipped, 3);
    assert_eq!(titles(dataset.records()), vec!["Book A", "Book B", "Book F"]);
    assert_eq!(dataset.authors(), &["Author X", "Author Y", "Author Z"]);

    // Float cell 352.0 and text cell "352.0" both read as 352
    let pages: Vec<u32> = dataset.records().iter().map(|r| r.num_pages).collect();
    assert_eq!(pages, vec![100, 352, 352]);
    assert_eq!(dataset.max_num_pages(), 352);
}

#[test]
fn test_load_workbook_without_sheets() {
    let source = DatasetSource::parse(&fixture_path("no_sheets.xlsx"));
    let err = load_dataset(&source, false).unwrap_err();
    assert!(matches!(err, LoadError::EmptyWorkbook));
}

#[test]
fn test_filter_scenarios() {
    let (_dir, dataset, _) = load_fixture();

    let selected = FilterSelection::new(AuthorSelection::new(vec!["Author X".into()]), Some(100));
    assert_eq!(titles(&filter_books(&dataset, &selected)), vec!["Book A", "Book C"]);

    let all = FilterSelection::new(AuthorSelection::all(), Some(50));
    assert_eq!(titles(&filter_books(&dataset, &all)), vec!["Book C"]);

    let none = FilterSelection::new(AuthorSelection::new(vec!["Author Z".into()]), Some(1000));
    assert!(filter_books(&dataset, &none).is_empty());
}

#[test]
fn test_every_result_respects_limit() {
    let (_dir, dataset, _) = load_fixture();
    for max in [0_i64, 50, 99, 100, 300] {
        let rows = filter_books(&dataset, &FilterSelection::new(AuthorSelection::all(), Some(max)));
        assert!(rows.iter().all(|r| i64::from(r.num_pages) <= max));
        assert_eq!(
            rows.len(),
            dataset
                .records()
                .iter()
                .filter(|r| i64::from(r.num_pages) <= max)
                .count()
        );
    }
}

#[test]
fn test_interaction_lifecycle() {
    let (_dir, dataset, _) = load_fixture();
    let mut handler = InteractionHandler::new(Arc::new(dataset), ChartTheme::default(), false);
    let page = handler.open_session();

    // Initial load: hidden chart, empty summary
    assert_eq!(handler.state(page), HandlerState::Idle);
    assert_eq!(handler.display(page), DisplayState::idle());

    let request = UpdateRequest {
        session: page,
        n_clicks: 1,
        authors: Some(vec!["Author X".to_string()]),
        max_pages: Some(json!(100)),
    };
    let first = handler.handle(&request);
    assert_eq!(first.status, UpdateStatus::Updated);
    assert_eq!(handler.state(page), HandlerState::Updated);

    let summary = first.display.summary.clone().unwrap();
    assert_eq!(summary.authors_line, "Selected Author(s): Author X");
    assert_eq!(summary.max_pages_line, "Maximum Pages: 100");

    // Same inputs, next click: identical output
    let again = handler.handle(&UpdateRequest {
        n_clicks: 2,
        ..request.clone()
    });
    assert_eq!(again.display, first.display);

    // Cleared input: rejected, prior display retained
    let rejected = handler.handle(&UpdateRequest {
        session: page,
        n_clicks: 3,
        authors: None,
        max_pages: None,
    });
    assert_eq!(rejected.status, UpdateStatus::Rejected);
    assert_eq!(rejected.display, first.display);
    assert_eq!(handler.state(page), HandlerState::Updated);

    // Reloaded page counts from 1 again and starts idle
    let reloaded = handler.open_session();
    assert_eq!(handler.display(reloaded), DisplayState::idle());
    let after_reload = handler.handle(&UpdateRequest {
        session: reloaded,
        n_clicks: 1,
        ..request.clone()
    });
    assert_eq!(after_reload.status, UpdateStatus::Updated);
    assert_eq!(after_reload.display, first.display);
}

fn test_app() -> (tempfile::TempDir, axum::Router) {
    let (dir, dataset, _) = load_fixture();
    std::fs::write(dir.path().join("background.jpg"), b"jpeg-bytes").unwrap();
    let dashboard = Dashboard::new(Arc::new(dataset), ChartTheme::default());
    let app = build_router(AppState::new(dashboard, true), dir.path().to_path_buf());
    (dir, app)
}

async fn get_page(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Session id the page script will post back
fn page_session(html: &str) -> u64 {
    let start = html.find("window.__SESSION__ = ").unwrap() + "window.__SESSION__ = ".len();
    let end = start + html[start..].find(';').unwrap();
    html[start..end].parse().unwrap()
}

async fn post_update(app: &axum::Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_update")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_index_page_served() {
    let (_dir, app) = test_app();
    let html = get_page(&app).await;
    assert!(html.contains("<option value=\"Author X\">Author X</option>"));
    assert!(html.contains("value=\"300\""));
    assert!(html.contains("style=\"display: none;\""));
}

#[tokio::test]
async fn test_update_endpoint() {
    let (_dir, app) = test_app();

    let body = post_update(
        &app,
        json!({ "n_clicks": 1, "authors": [], "max_pages": 50 }),
    )
    .await;
    assert_eq!(body["status"], "updated");
    assert_eq!(body["display"]["chart_visible"], true);
    assert_eq!(body["figure"]["data"][0]["y"], json!(["Book C"]));
    assert!(body["summary_html"]
        .as_str()
        .unwrap()
        .contains("Selected Author(s): All Authors"));

    // Debug mode surfaces the rejection reason
    let rejected = post_update(
        &app,
        json!({ "n_clicks": 2, "authors": ["Author X"], "max_pages": null }),
    )
    .await;
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["figure"], body["figure"]);
    assert!(rejected["diagnostic"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_update_empty_result() {
    let (_dir, app) = test_app();
    let body = post_update(
        &app,
        json!({ "n_clicks": 1, "authors": ["Author Z"], "max_pages": 1000 }),
    )
    .await;

    assert_eq!(body["status"], "updated");
    assert_eq!(body["figure"]["data"][0]["y"], json!([]));
    assert!(body["summary_html"].as_str().unwrap().contains("Maximum Pages: 1000"));
}

#[tokio::test]
async fn test_reload_accepts_first_click() {
    let (_dir, app) = test_app();

    let before = page_session(&get_page(&app).await);
    for n_clicks in [1, 2] {
        let body = post_update(
            &app,
            json!({ "session": before, "n_clicks": n_clicks, "authors": [], "max_pages": 100 }),
        )
        .await;
        assert_eq!(body["status"], "updated");
    }

    // The reloaded page restarts its click count at 1
    let after = page_session(&get_page(&app).await);
    assert_ne!(after, before);
    let body = post_update(
        &app,
        json!({ "session": after, "n_clicks": 1, "authors": [], "max_pages": 50 }),
    )
    .await;
    assert_eq!(body["status"], "updated");
    assert_eq!(body["figure"]["data"][0]["y"], json!(["Book C"]));
    assert!(body["summary_html"].as_str().unwrap().contains("Maximum Pages: 50"));

    // The old page is still tracked on its own
    let stale = post_update(
        &app,
        json!({ "session": before, "n_clicks": 2, "authors": [], "max_pages": 50 }),
    )
    .await;
    assert_eq!(stale["status"], "rejected");
    assert!(stale["summary_html"].as_str().unwrap().contains("Maximum Pages: 100"));
}

#[tokio::test]
async fn test_assets_served() {
    let (_dir, app) = test_app();

    let asset = app
        .clone()
        .oneshot(Request::builder().uri("/assets/background.jpg").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    let bytes = to_bytes(asset.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"jpeg-bytes");

    let missing = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
