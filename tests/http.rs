//! End-to-end tests driving the router in-process

mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_report_sort_walkthrough() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());

    let response = app.send(upload(cookie, "report.pdf", &pdf_bytes(3))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({"success": true, "filename": "report.pdf"}));

    let response = app.send(get("/page-count/report.pdf", cookie)).await;
    assert_eq!(json(response).await, json!({"pages": 3}));

    let response = app
        .send(post_json("/check-name/report.pdf", cookie, json!({"name": "page2"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({"valid": true, "name": "page2.pdf"}));

    let response = app
        .send(post_json(
            "/create-pdf/report.pdf",
            cookie,
            json!({"page": 2, "name": "page2"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json(response).await,
        json!({
            "success": true,
            "path": "report-sorted/page2.pdf",
            "name": "page2.pdf",
            "folder": "report-sorted",
        })
    );

    let response = app.send(get("/list-sorted/report.pdf", cookie)).await;
    assert_eq!(
        json(response).await,
        json!({"pdfs": ["page2.pdf"], "folder": "report-sorted"})
    );

    let created = std::fs::read_dir(app.storage.path())
        .unwrap()
        .map(|entry| entry.unwrap().path().join("report-sorted/page2.pdf"))
        .find(|path| path.exists())
        .expect("created PDF inside the session directory");
    assert_eq!(page_count(&std::fs::read(created).unwrap()), 1);
}

#[tokio::test]
async fn test_append_grows_target_and_reports_count() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());
    app.send(upload(cookie, "report.pdf", &pdf_bytes(3))).await;
    app.send(post_json(
        "/create-pdf/report.pdf",
        cookie,
        json!({"page": 1, "name": "bundle"}),
    ))
    .await;

    let response = app
        .send(post_json(
            "/append-to-pdf/report.pdf",
            cookie,
            json!({"page": 3, "target": "bundle.pdf"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json(response).await,
        json!({"success": true, "target": "bundle.pdf", "new_page_count": 2})
    );

    let response = app
        .send(post_json(
            "/append-to-pdf/report.pdf",
            cookie,
            json!({"page": 1, "target": "missing.pdf"}),
        ))
        .await;
    assert_failure(response, StatusCode::NOT_FOUND).await;

    let response = app
        .send(post_json(
            "/append-to-pdf/report.pdf",
            cookie,
            json!({"page": 7, "target": "bundle.pdf"}),
        ))
        .await;
    assert_failure(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_create_rejects_taken_and_bad_names() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());
    app.send(upload(cookie, "report.pdf", &pdf_bytes(2))).await;
    let create = |name: &str| {
        post_json(
            "/create-pdf/report.pdf",
            cookie,
            json!({"page": 1, "name": name}),
        )
    };

    assert_eq!(app.send(create("first")).await.status(), StatusCode::OK);

    let error = assert_failure(app.send(create("first.pdf")).await, StatusCode::CONFLICT).await;
    assert_eq!(error, "a PDF with this name already exists");

    let error = assert_failure(app.send(create("a:b")).await, StatusCode::BAD_REQUEST).await;
    assert_eq!(error, "name contains forbidden characters.");

    let response = app
        .send(post_json("/create-pdf/report.pdf", cookie, json!({"name": "nopage"})))
        .await;
    assert_failure(response, StatusCode::BAD_REQUEST).await;

    let response = app
        .send(post_json("/check-name/report.pdf", cookie, json!({"name": "first"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json(response).await,
        json!({"valid": false, "error": "a PDF with this name already exists"})
    );

    let response = app
        .send(post_json("/check-name/report.pdf", cookie, json!({"name": ".hidden"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["valid"], false);
}

#[tokio::test]
async fn test_upload_collision_and_rejection() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());

    app.send(upload(cookie, "report.pdf", &pdf_bytes(1))).await;
    let response = app.send(upload(cookie, "report.pdf", &pdf_bytes(2))).await;
    assert_eq!(json(response).await["filename"], "report_1.pdf");

    let response = app.send(upload(cookie, "notes.txt", b"plain text")).await;
    assert_failure(response, StatusCode::BAD_REQUEST).await;

    let response = app.send(get("/pdfs", cookie)).await;
    assert_eq!(
        json(response).await,
        json!({
            "pdfs": [
                {"name": "report.pdf", "pages": 1},
                {"name": "report_1.pdf", "pages": 2},
            ],
            "total": 2,
        })
    );
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = TestApp::new();
    let alice = app.new_session().await;
    let bob = app.new_session().await;
    assert_ne!(alice, bob);

    app.send(upload(Some(alice.as_str()), "report.pdf", &pdf_bytes(3))).await;

    let response = app.send(get("/pdfs", Some(bob.as_str()))).await;
    assert_eq!(json(response).await["total"], 0);

    let response = app.send(get("/open/report.pdf", Some(bob.as_str()))).await;
    assert_failure(response, StatusCode::NOT_FOUND).await;

    let response = app.send(get("/pdfs", Some(alice.as_str()))).await;
    assert_eq!(json(response).await["total"], 1);
}

#[tokio::test]
async fn test_forged_cookie_gets_a_fresh_session() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    app.send(upload(Some(cookie.as_str()), "report.pdf", &pdf_bytes(1))).await;

    let token = cookie
        .trim_start_matches("pdf_session=")
        .split('.')
        .next()
        .unwrap();
    let forged = format!("pdf_session={}.{}", token, "0".repeat(64));

    let response = app.send(get("/pdfs", Some(forged.as_str()))).await;
    let issued = session_cookie(&response).unwrap();
    assert_ne!(issued, cookie);
    assert_eq!(json(response).await["total"], 0);
}

#[tokio::test]
async fn test_cookie_is_reissued_on_every_response() {
    let app = TestApp::new();
    let cookie = app.new_session().await;

    let response = app.send(get("/", Some(cookie.as_str()))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_cookie(&response).as_deref(), Some(cookie.as_str()));

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=259200"));

    let response = app.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_open_download_and_page_image() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());
    let bytes = pdf_bytes(2);
    app.send(upload(cookie, "report.pdf", &bytes)).await;

    let response = app.send(get("/open/report.pdf", cookie)).await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("inline;"));
    assert_eq!(body_bytes(response).await, bytes);

    let response = app.send(get("/download/report.pdf", cookie)).await;
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"report.pdf\""));

    let response = app.send(get("/page/report.pdf/2", cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert!(body_bytes(response).await.starts_with(b"\x89PNG"));

    for uri in ["/page/report.pdf/0", "/page/report.pdf/3", "/page/other.pdf/1"] {
        assert_failure(app.send(get(uri, cookie)).await, StatusCode::NOT_FOUND).await;
    }
}

#[tokio::test]
async fn test_delete_with_sorted_folder() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());
    app.send(upload(cookie, "report.pdf", &pdf_bytes(2))).await;
    app.send(post_json(
        "/create-pdf/report.pdf",
        cookie,
        json!({"page": 1, "name": "keep"}),
    ))
    .await;

    let response = app
        .send(delete_json("/delete/report.pdf", cookie, json!({"delete_sorted": true})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({"success": true}));

    let response = app.send(get("/list-sorted/report.pdf", cookie)).await;
    assert_eq!(json(response).await["pdfs"], json!([]));

    let response = app
        .send(delete_json("/delete/report.pdf", cookie, json!({})))
        .await;
    assert_failure(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn test_sorter_view() {
    let app = TestApp::new();
    let cookie = app.new_session().await;
    let cookie = Some(cookie.as_str());
    app.send(upload(cookie, "report.pdf", &pdf_bytes(3))).await;

    let response = app.send(get("/sorter/report.pdf?start=9", cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Page <span id=\"current\">3</span> of 3"));

    let response = app.send(get("/sorter/missing.pdf", cookie)).await;
    assert_failure(response, StatusCode::NOT_FOUND).await;
}
