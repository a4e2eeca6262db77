//! In-process stub of the hosted collection API.
//!
//! Speaks the camelCase wire schema the HTTP client expects, with just enough
//! behavior to exercise success, not-found, and validation paths.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Backend {
    pub packages: Vec<Value>,
    pub products: Vec<Value>,
    next_package_id: u64,
    next_product_id: u64,
}

pub type Shared = Arc<Mutex<Backend>>;

type ApiError = (StatusCode, Json<Value>);

fn field<'a>(row: &'a Value, name: &str) -> &'a str {
    row.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "No such record" })))
}

async fn list_packages(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let tenant = params.get("tenant").cloned().unwrap_or_default();
    let limit = params
        .get("limit")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(100);
    let backend = state.lock().expect("backend lock");
    let mut rows: Vec<Value> = backend
        .packages
        .iter()
        .filter(|row| field(row, "tenantId") == tenant)
        .cloned()
        .collect();
    // RFC 3339 strings from the same writer sort lexicographically.
    rows.sort_by(|a, b| field(b, "createdAt").cmp(field(a, "createdAt")));
    rows.truncate(limit);
    Json(Value::Array(rows))
}

async fn insert_package(
    State(state): State<Shared>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    if field(&body, "itemName").trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "itemName is required" })),
        ));
    }
    let mut backend = state.lock().expect("backend lock");
    backend.next_package_id += 1;
    body["objectId"] = json!(format!("R{}", backend.next_package_id));
    backend.packages.push(body.clone());
    Ok(Json(body))
}

async fn update_status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let tenant = field(&body, "tenantId").to_string();
    let status = body.get("status").cloned().unwrap_or(Value::Null);
    let mut backend = state.lock().expect("backend lock");
    for row in backend.packages.iter_mut() {
        if field(row, "objectId") == id && field(row, "tenantId") == tenant {
            row["status"] = status;
            return Ok(Json(json!({ "success": true })));
        }
    }
    Err(not_found())
}

async fn delete_package(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let tenant = params.get("tenant").cloned().unwrap_or_default();
    let mut backend = state.lock().expect("backend lock");
    let before = backend.packages.len();
    backend
        .packages
        .retain(|row| !(field(row, "objectId") == id && field(row, "tenantId") == tenant));
    if backend.packages.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({ "success": true })))
}

async fn find_products(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let tenant = params.get("tenant").cloned().unwrap_or_default();
    let name = params.get("name").cloned();
    let backend = state.lock().expect("backend lock");
    let rows: Vec<Value> = backend
        .products
        .iter()
        .filter(|row| field(row, "tenantId") == tenant)
        .filter(|row| name.as_deref().map_or(true, |name| field(row, "name") == name))
        .cloned()
        .collect();
    Json(Value::Array(rows))
}

async fn insert_product(
    State(state): State<Shared>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut backend = state.lock().expect("backend lock");
    backend.next_product_id += 1;
    body["objectId"] = json!(format!("P{}", backend.next_product_id));
    backend.products.push(body.clone());
    Ok(Json(body))
}

async fn update_price(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let tenant = field(&body, "tenantId").to_string();
    let last_price = body.get("lastPrice").cloned().unwrap_or(Value::Null);
    let delta = body.get("quantityDelta").and_then(Value::as_u64).unwrap_or(0);
    let mut backend = state.lock().expect("backend lock");
    for row in backend.products.iter_mut() {
        if field(row, "objectId") == id && field(row, "tenantId") == tenant {
            let total = row.get("totalQuantity").and_then(Value::as_u64).unwrap_or(0);
            row["lastPrice"] = last_price;
            row["totalQuantity"] = json!(total + delta);
            return Ok(Json(json!({ "success": true })));
        }
    }
    Err(not_found())
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/packages", get(list_packages).post(insert_package))
        .route("/api/packages/:id/status", put(update_status))
        .route("/api/packages/:id", delete(delete_package))
        .route("/api/products", get(find_products).post(insert_product))
        .route("/api/products/:id/price", put(update_price))
        .with_state(state)
}

/// Serve the stub on an ephemeral loopback port; returns its base URL.
pub async fn spawn_backend() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });
    (format!("http://{}", addr), state)
}

/// A loopback URL that nothing is listening on.
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe listener addr");
    drop(listener);
    format!("http://{}", addr)
}
