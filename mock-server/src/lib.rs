//! In-memory REST document store used as a backend in tests.
//!
//! Documents live in named collections. Creation answers `201 Created` with
//! an absolute `Location`, replacement answers `204 No Content`, and a few
//! fixed routes produce redirects, authorization failures, and request
//! echoes so a client can be checked against every status it classifies.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{
        header::{CONTENT_TYPE, COOKIE, HOST, LOCATION},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Collection name → document id → document.
pub type Db = Arc<RwLock<HashMap<String, HashMap<String, Value>>>>;

/// Cookie that `/private` requires.
pub const SESSION_COOKIE: &str = "ssotoken";

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", get(echo))
        .route("/private", get(private))
        .route("/moved", get(moved).post(moved))
        .route("/{collection}", get(list_documents).post(create_document))
        .route(
            "/{collection}/{id}",
            get(get_document).put(replace_document).delete(delete_document),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_documents(State(db): State<Db>, Path(collection): Path<String>) -> Json<Vec<Value>> {
    let db = db.read().await;
    let docs: Vec<Value> = db
        .get(&collection)
        .map(|docs| docs.values().cloned().collect())
        .unwrap_or_default();
    Json(docs)
}

async fn create_document(
    State(db): State<Db>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, StatusCode> {
    let mut fields: Map<String, Value> = if is_form(&headers) {
        let Form(form) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        form.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
    } else {
        let Json(map) = Json::<Map<String, Value>>::from_request(request, &())
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        map
    };

    let id = Uuid::new_v4().to_string();
    fields.insert("id".to_string(), Value::String(id.clone()));
    let doc = Value::Object(fields);

    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let location = format!("http://{host}/{collection}/{id}");
    debug!(%location, "created document");

    db.write()
        .await
        .entry(collection)
        .or_default()
        .insert(id, doc.clone());

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(doc)).into_response())
}

async fn get_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let db = db.read().await;
    db.get(&collection)
        .and_then(|docs| docs.get(&id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
    body: String,
) -> Result<StatusCode, StatusCode> {
    let mut fields: Map<String, Value> = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if fields.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db = db.write().await;
    let doc = db
        .get_mut(&collection)
        .and_then(|docs| docs.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    fields.insert("id".to_string(), Value::String(id));
    *doc = Value::Object(fields);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_document(
    State(db): State<Db>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut db = db.write().await;
    db.get_mut(&collection)
        .and_then(|docs| docs.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn moved() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/items")])
}

async fn private(headers: HeaderMap) -> Response {
    if cookies(&headers).contains_key(SESSION_COOKIE) {
        Json(json!({"access": "granted"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "missing session").into_response()
    }
}

/// Reflect query parameters, cookies and headers back as JSON.
async fn echo(Query(query): Query<HashMap<String, String>>, headers: HeaderMap) -> Json<Value> {
    let header_map: Map<String, Value> = headers
        .iter()
        .filter(|(name, _)| **name != COOKIE)
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();
    Json(json!({
        "query": query,
        "cookies": cookies(&headers),
        "headers": header_map,
    }))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
