//! `HttpCatalog` against an in-process marketplace.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use hybrid_core::ScriptId;
use hybrid_engine::catalog::{Catalog, CatalogError, CatalogFallback, HttpCatalog};

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    category: String,
}

fn listing() -> serde_json::Value {
    json!({
        "id": "csv-summary",
        "name": "CSV Summary",
        "description": "Summarize a CSV file",
        "author": "Data Team",
        "version": "2.1.0",
        "category": "data",
        "rating": 4.2,
        "downloads": "1K+",
        "offline": false,
        "code": "def summarize(input):\n    return {'rows': 0}",
        "entryPoint": "summarize",
        "packages": ["pandas"]
    })
}

async fn search(Query(params): Query<SearchParams>) -> impl IntoResponse {
    if params.q.is_empty() || "csv summary".contains(&params.q.to_lowercase()) {
        if params.category.is_empty() || params.category == "all" || params.category == "data" {
            return Json(json!([listing()]));
        }
    }
    Json(json!([]))
}

async fn download(Path(id): Path<String>) -> impl IntoResponse {
    if id == "csv-summary" || id == "data/csv-summary" {
        (StatusCode::OK, Json(listing()))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
    }
}

async fn spawn_marketplace() -> String {
    let app = Router::new()
        .route("/scripts", get(search))
        .route("/scripts/{id}", get(download));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// Nothing listens on port 1.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn id(raw: &str) -> ScriptId {
    ScriptId::new(raw).unwrap()
}

#[tokio::test]
async fn search_and_download_from_marketplace() {
    let base = spawn_marketplace().await;
    let catalog = HttpCatalog::new(&format!("{}/", base), CatalogFallback::Fail);
    assert_eq!(catalog.base_url(), base);

    let hits = catalog.search("csv", "all").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id("csv-summary"));
    assert!(catalog.search("csv", "finance").await.unwrap().is_empty());

    let descriptor = catalog.download(&id("csv-summary")).await.unwrap();
    assert_eq!(descriptor.entry_point.as_deref(), Some("summarize"));
    assert_eq!(descriptor.packages, Some(vec!["pandas".to_string()]));
    assert_eq!(descriptor.version.as_deref(), Some("2.1.0"));
}

#[tokio::test]
async fn marketplace_404_is_not_found() {
    let base = spawn_marketplace().await;
    let catalog = HttpCatalog::new(&base, CatalogFallback::Offline);
    let err = catalog.download(&id("hello-world")).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(missing) if missing == "hello-world"));
}

#[tokio::test]
async fn strict_policy_reports_unavailable() {
    let catalog = HttpCatalog::new(UNREACHABLE, CatalogFallback::Fail);
    assert!(matches!(
        catalog.search("", "all").await,
        Err(CatalogError::Unavailable(_))
    ));
    assert!(matches!(
        catalog.download(&id("hello-world")).await,
        Err(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn offline_policy_answers_from_builtin_entries() {
    let catalog = HttpCatalog::new(UNREACHABLE, CatalogFallback::Offline);
    assert_eq!(catalog.search("", "all").await.unwrap().len(), 3);
    assert_eq!(catalog.popular(2).await.unwrap().len(), 2);

    let hello = catalog.download(&id("hello-world")).await.unwrap();
    assert_eq!(hello.name.as_deref(), Some("Hello World"));
}

#[tokio::test]
async fn ids_are_sent_as_one_path_segment() {
    let base = spawn_marketplace().await;
    let catalog = HttpCatalog::new(&base, CatalogFallback::Fail);

    let descriptor = catalog.download(&id("data/csv-summary")).await.unwrap();
    assert_eq!(descriptor.name.as_deref(), Some("CSV Summary"));

    let err = catalog.download(&id("csv summary?x=1")).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(missing) if missing == "csv summary?x=1"));
}
