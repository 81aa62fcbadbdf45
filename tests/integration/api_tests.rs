//! API integration tests, driven in-process through the router

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_server::{
    api::create_router, repository::BookRepository, services::Services, AppConfig, AppState,
};

fn app() -> Router {
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(Services::new(BookRepository::new())),
    };
    create_router(state)
}

/// Send a request and return the status with the decoded JSON body
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };

    (status, body)
}

fn book_a() -> Value {
    json!({
        "name": "Buku A",
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": 100,
        "readPage": 25,
        "reading": false
    })
}

async fn create(app: &Router, body: Value) -> String {
    let (status, body) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["bookId"].as_str().expect("No bookId in response").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], 0);
}

#[tokio::test]
async fn test_add_book_with_complete_data() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/books", Some(book_a())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    assert_eq!(body["data"]["bookId"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_add_book_accepts_string_year() {
    let app = app();
    let mut book = book_a();
    book["year"] = json!("2010");

    let id = create(&app, book).await;
    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["year"], 2010);
}

#[tokio::test]
async fn test_add_book_without_name() {
    let app = app();
    let mut book = book_a();
    book.as_object_mut().unwrap().remove("name");

    let (status, body) = send(&app, Method::POST, "/books", Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn test_add_book_with_read_page_over_page_count() {
    let app = app();
    let mut book = book_a();
    book["readPage"] = json!(101);

    let (status, body) = send(&app, Method::POST, "/books", Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_get_book_by_id() {
    let app = app();
    let id = create(&app, book_a()).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let book = &body["data"]["book"];
    assert_eq!(book["id"], id.as_str());
    assert_eq!(book["name"], "Buku A");
    assert_eq!(book["pageCount"], 100);
    assert_eq!(book["readPage"], 25);
    assert_eq!(book["finished"], false);
    assert_eq!(book["reading"], false);
    assert_eq!(book["insertedAt"], book["updatedAt"]);
}

#[tokio::test]
async fn test_get_unknown_book() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/books/xxxxx", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn test_list_books_with_filters() {
    let app = app();
    let harry = create(
        &app,
        json!({
            "name": "Harry Potter and the Philosopher's Stone",
            "year": 1997,
            "author": "J. K. Rowling",
            "summary": "Wizards",
            "publisher": "Bloomsbury",
            "pageCount": 223,
            "readPage": 223,
            "reading": false
        }),
    )
    .await;
    let mut reading = book_a();
    reading["reading"] = json!(true);
    let buku = create(&app, reading).await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["id"], harry.as_str());
    assert_eq!(books[1]["id"], buku.as_str());

    let (_, body) = send(&app, Method::GET, "/books?name=hArRy", None).await;
    assert_eq!(
        body["data"]["books"],
        json!([{
            "id": harry.as_str(),
            "name": "Harry Potter and the Philosopher's Stone",
            "publisher": "Bloomsbury"
        }])
    );

    let (_, body) = send(&app, Method::GET, "/books?reading=1", None).await;
    assert_eq!(body["data"]["books"][0]["id"], buku.as_str());
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/books?finished=1", None).await;
    assert_eq!(body["data"]["books"][0]["id"], harry.as_str());
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/books?finished=0", None).await;
    assert_eq!(body["data"]["books"][0]["id"], buku.as_str());

    // name takes precedence over the other filters
    let (_, body) = send(&app, Method::GET, "/books?name=buku&finished=1", None).await;
    assert_eq!(body["data"]["books"][0]["id"], buku.as_str());
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_books_with_repeated_query_key() {
    let app = app();
    let id = create(&app, book_a()).await;

    let (status, body) = send(&app, Method::GET, "/books?name=buku&name=harry", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["books"][0]["id"], id.as_str());
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/books?reading=0&reading=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"][0]["id"], id.as_str());
}

#[tokio::test]
async fn test_update_book() {
    let app = app();
    let id = create(&app, book_a()).await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{}", id), None).await;

    let update = json!({
        "name": "Buku A Revisi",
        "year": 2011,
        "author": "Jane Doe",
        "summary": "Lorem Dolor sit Amet",
        "publisher": "Dicoding",
        "pageCount": 200,
        "readPage": 200,
        "reading": true
    });
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let (_, after) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    let book = &after["data"]["book"];
    assert_eq!(book["name"], "Buku A Revisi");
    assert_eq!(book["year"], 2011);
    assert_eq!(book["publisher"], "Dicoding");
    assert_eq!(book["finished"], true);
    assert_eq!(book["reading"], true);
    assert_eq!(book["insertedAt"], before["data"]["book"]["insertedAt"]);
    assert_ne!(book["updatedAt"], before["data"]["book"]["updatedAt"]);
}

#[tokio::test]
async fn test_rejected_update_keeps_book() {
    let app = app();
    let id = create(&app, book_a()).await;

    let mut update = book_a();
    update["pageCount"] = json!(80);
    update["readPage"] = json!(90);
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let mut nameless = book_a();
    nameless.as_object_mut().unwrap().remove("name");
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(nameless)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["pageCount"], 100);
    assert_eq!(body["data"]["book"]["readPage"], 25);
}

#[tokio::test]
async fn test_update_requires_every_key() {
    let app = app();
    let id = create(&app, book_a()).await;

    let mut update = book_a();
    update.as_object_mut().unwrap().remove("author");
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi author buku");

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["author"], "John Doe");
}

#[tokio::test]
async fn test_update_clears_null_details() {
    let app = app();
    let id = create(&app, book_a()).await;

    let mut update = book_a();
    update["author"] = Value::Null;
    update["year"] = Value::Null;
    let (status, _) = send(&app, Method::PUT, &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["author"], Value::Null);
    assert_eq!(body["data"]["book"]["year"], Value::Null);
    assert_eq!(body["data"]["book"]["publisher"], "Dicoding Indonesia");
}

#[tokio::test]
async fn test_update_unknown_book() {
    let app = app();

    let (status, body) = send(&app, Method::PUT, "/books/xxxxx", Some(book_a())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");
}

#[tokio::test]
async fn test_delete_book() {
    let app = app();
    let first = create(&app, book_a()).await;
    let second = create(&app, book_a()).await;
    let third = create(&app, book_a()).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Buku berhasil dihapus");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    let ids: Vec<&str> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), third.as_str()]);

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", second), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Halaman tidak ditemukan");
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = app();

    let (status, body) = send(&app, Method::PATCH, "/books", Some(book_a())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Metode tidak diizinkan");

    let (status, body) = send(&app, Method::POST, "/books/xxxxx", Some(book_a())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "fail");
}
