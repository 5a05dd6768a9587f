use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

/// Token accepted by endpoints restricted to administrators.
pub const ADMIN_TOKEN: &str = "admin-token";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Book {
    #[serde(rename = "@id")]
    pub iri: String,
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    pub author: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Document {
    pub id: u64,
    pub name: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip)]
    pub locked: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    books: BTreeMap<u64, Book>,
    documents: BTreeMap<u64, Document>,
    next_book: u64,
    next_document: u64,
}

impl Store {
    /// Book 1 ("Dune") and a locked document 1.
    pub fn seeded() -> Self {
        let mut store = Store {
            next_book: 1,
            next_document: 1,
            ..Store::default()
        };
        store.insert_book("Dune".to_string(), Some("Frank Herbert".to_string()));
        let id = store.next_document;
        store.next_document += 1;
        store.documents.insert(
            id,
            Document {
                id,
                name: "contract.pdf".to_string(),
                size: 0,
                title: None,
                locked: true,
            },
        );
        store
    }

    fn insert_book(&mut self, title: String, author: Option<String>) -> Book {
        let id = self.next_book;
        self.next_book += 1;
        let book = Book {
            iri: format!("/books/{id}"),
            id,
            title,
            author,
        };
        self.books.insert(id, book.clone());
        book
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book).delete(delete_book))
        .route("/pages/{slug}", get(get_page))
        .route("/files/{name}", get(download_attachment))
        .route("/images/{name}", get(download_inline))
        .route("/documents", post(upload_document))
        .route("/documents/{id}/versions", post(upload_version))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::info!(addr = ?listener.local_addr().ok(), "mock API listening");
    axum::serve(listener, app()).await
}

/// hydra error document, as served by JSON-LD APIs.
pub fn hydra_error(status: StatusCode, description: &str) -> Response {
    let body = json!({
        "@context": "/contexts/Error",
        "@type": "hydra:Error",
        "hydra:title": "An error occurred",
        "hydra:description": description,
    });
    (status, [(header::CONTENT_TYPE, "application/ld+json")], body.to_string()).into_response()
}

fn html_not_found() -> Response {
    let page = "<!DOCTYPE html><html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>";
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}

async fn list_books(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Response {
    let store = db.read().await;
    if query.contains_key("count") {
        return store.books.len().to_string().into_response();
    }
    let members: Vec<&Book> = store.books.values().collect();
    Json(json!({
        "@context": "/contexts/Book",
        "@id": "/books",
        "@type": "hydra:Collection",
        "hydra:member": members,
        "hydra:totalItems": members.len(),
    }))
    .into_response()
}

async fn create_book(State(db): State<Db>, body: Bytes) -> Response {
    let input: BookInput = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(_) => return hydra_error(StatusCode::BAD_REQUEST, "Syntax error"),
    };
    if input.title.trim().is_empty() {
        return hydra_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "title: This value should not be blank.",
        );
    }
    let book = db.write().await.insert_book(input.title, input.author);
    tracing::debug!(id = book.id, "book created");
    (StatusCode::CREATED, Json(book)).into_response()
}

async fn get_book(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    match db.read().await.books.get(&id) {
        Some(book) => Json(book.clone()).into_response(),
        None => hydra_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn delete_book(State(db): State<Db>, Path(id): Path<u64>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {ADMIN_TOKEN}").as_str());
    if !authorized {
        return hydra_error(StatusCode::FORBIDDEN, "Access Denied.");
    }
    match db.write().await.books.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => hydra_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn get_page(Path(slug): Path<String>) -> Response {
    match slug.as_str() {
        "about" => Html("<html><head><title>About</title></head><body><p>Books API</p></body></html>")
            .into_response(),
        _ => html_not_found(),
    }
}

fn download(name: &str, disposition: &str) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{name}\""),
        ),
    ];
    (StatusCode::OK, headers, format!("content of {name}")).into_response()
}

async fn download_attachment(Path(name): Path<String>) -> Response {
    download(&name, "attachment")
}

async fn download_inline(Path(name): Path<String>) -> Response {
    download(&name, "inline")
}

struct Upload {
    name: Option<String>,
    size: usize,
    title: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, Response> {
    let mut upload = Upload {
        name: None,
        size: 0,
        title: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.name = field.file_name().map(str::to_string);
                upload.size = field.bytes().await.map_err(IntoResponse::into_response)?.len();
            }
            Some("title") => {
                upload.title = Some(field.text().await.map_err(IntoResponse::into_response)?);
            }
            _ => {}
        }
    }
    Ok(upload)
}

async fn upload_document(State(db): State<Db>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    let Some(name) = upload.name else {
        return hydra_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "file: This value should not be null.",
        );
    };
    let mut store = db.write().await;
    let id = store.next_document;
    store.next_document += 1;
    let document = Document {
        id,
        name,
        size: upload.size,
        title: upload.title,
        locked: false,
    };
    store.documents.insert(id, document.clone());
    (StatusCode::CREATED, Json(document)).into_response()
}

async fn upload_version(State(db): State<Db>, Path(id): Path<u64>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    let Some(document) = store.documents.get_mut(&id) else {
        return hydra_error(StatusCode::NOT_FOUND, "Not Found");
    };
    if document.locked {
        return hydra_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Can not upload a new version of the document",
        );
    }
    if let Some(name) = upload.name {
        document.name = name;
        document.size = upload.size;
    }
    Json(document.clone()).into_response()
}
