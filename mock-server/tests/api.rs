use axum::http::{self, header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "docs.test")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- list ---

#[tokio::test]
async fn list_unknown_collection_is_empty_array() {
    let resp = app().oneshot(get("/items")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_absolute_location() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"name":"widget"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    let doc = body_json(resp).await;
    assert_eq!(doc["name"], "widget");
    let id = doc["id"].as_str().unwrap();
    assert_eq!(location, format!("http://docs.test/items/{id}"));
}

#[tokio::test]
async fn create_accepts_form_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/people")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("firstname=John&lastname=Doe".to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let doc = body_json(resp).await;
    assert_eq!(doc["firstname"], "John");
    assert_eq!(doc["lastname"], "Doe");
}

#[tokio::test]
async fn create_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/items", "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let resp = app().oneshot(get("/items/BadId123")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- replace ---

#[tokio::test]
async fn replace_unknown_id_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/items/NotExistUid", r#"{"name":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replace_with_empty_document_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/items/any", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_id_returns_404() {
    let req = Request::builder()
        .method("DELETE")
        .uri("/items/BadId123")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- fixed routes ---

#[tokio::test]
async fn moved_redirects_without_body() {
    let resp = app().oneshot(get("/moved")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[header::LOCATION], "/items");
}

#[tokio::test]
async fn private_requires_session_cookie() {
    let resp = app().oneshot(get("/private")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/private")
        .header(header::COOKIE, "ssotoken=abc-123")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"access": "granted"}));
}

#[tokio::test]
async fn echo_reflects_query_cookies_and_headers() {
    let req = Request::builder()
        .uri("/echo?foo=bar")
        .header(header::COOKIE, "ssotoken=abc-123")
        .header("x-frdp-rs-owner", "bjensen")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed = body_json(resp).await;
    assert_eq!(echoed["query"], json!({"foo": "bar"}));
    assert_eq!(echoed["cookies"], json!({"ssotoken": "abc-123"}));
    assert_eq!(echoed["headers"]["x-frdp-rs-owner"], "bjensen");
    assert!(echoed["headers"].get("cookie").is_none());
}

// --- full lifecycle ---

#[tokio::test]
async fn document_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/items", r#"{"name":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/items"))
        .await
        .unwrap();
    let docs = body_json(resp).await;
    assert_eq!(docs.as_array().unwrap().len(), 1);

    // replace
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/items/{id}"), r#"{"name":"Walk cat"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // read back
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"id": id.clone(), "name": "Walk cat"}));

    // delete
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/items/{id}"))
        .body(String::new())
        .unwrap();
    let resp = ServiceExt::ready(&mut app).await.unwrap().call(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // read after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
