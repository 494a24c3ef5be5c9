//! Shared helpers for HTTP tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use lopdf::{dictionary, Document, Object, Stream};
use tower::ServiceExt;

use pdf_sorter::config::Config;
use pdf_sorter::routes;
use pdf_sorter::state::AppState;

const BOUNDARY: &str = "pdf-sorter-test-boundary";

/// A router over a throwaway storage directory
pub struct TestApp {
    pub storage: tempfile::TempDir,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.base_dir = storage.path().to_path_buf();
        config.session.secret = "integration-test-secret".to_string();

        Self {
            router: routes::app(AppState::new(config)),
            storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Issue a request and return the session cookie pair it was given
    pub async fn new_session(&self) -> String {
        let response = self.send(get("/pdfs", None)).await;
        session_cookie(&response).expect("session cookie")
    }
}

/// `name=value` of the session cookie set by a response
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("pdf_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

fn with_cookie(builder: axum::http::request::Builder, cookie: Option<&str>) -> axum::http::request::Builder {
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::get(uri), cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    with_cookie(Request::post(uri), cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    with_cookie(Request::delete(uri), cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart upload with a single `file` part
pub fn upload(cookie: Option<&str>, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    with_cookie(Request::post("/upload"), cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Assert a failure status and the `{success: false, error}` body shape
pub async fn assert_failure(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let body = json(response).await;
    assert_eq!(body["success"], false);
    body["error"].as_str().expect("error message").to_string()
}

/// Page count of an in-memory PDF
pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

/// A `pages`-page document whose page `n` shows the text `Page n`
pub fn pdf_bytes(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 40 150 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(200),
                Object::Integer(300),
            ]),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
