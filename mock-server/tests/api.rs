use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, App, Echo, LARGE_PAD_LEN, VERSION};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
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
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- info ---

#[tokio::test]
async fn info_reports_version() {
    let resp = app().oneshot(empty_request("GET", "/v2/info")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let info: Value = body_json(resp).await;
    assert_eq!(info["version"], VERSION);
}

// --- apps ---

#[tokio::test]
async fn list_apps_empty() {
    let resp = app().oneshot(empty_request("GET", "/v2/apps")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = body_json(resp).await;
    assert_eq!(list["apps"], serde_json::json!([]));
}

#[tokio::test]
async fn create_app_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/apps", r#"{"id":"web","cmd":"python -m http.server"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: App = body_json(resp).await;
    assert_eq!(created.id, "web");
    assert_eq!(created.instances, 1);
}

#[tokio::test]
async fn create_app_without_id_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/apps", r#"{"instances":3}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_app_not_found() {
    let resp = app().oneshot(empty_request("GET", "/v2/apps/ghost")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"not found");
}

#[tokio::test]
async fn update_app_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/v2/apps/ghost", r#"{"instances":2}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_app_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/v2/apps/ghost")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- garbage ---

#[tokio::test]
async fn garbage_is_not_json() {
    let resp = app().oneshot(empty_request("GET", "/v2/garbage")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}

#[tokio::test]
async fn large_body_exceeds_ten_mebibytes() {
    let resp = app().oneshot(empty_request("GET", "/v2/large")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(bytes.len() > 10 * 1024 * 1024);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["pad"].as_str().unwrap().len(), LARGE_PAD_LEN);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/v2/echo?cmd=a+b&scale=true")
        .header(http::header::USER_AGENT, "gomarathon")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"id":"web"}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.query["cmd"], "a b");
    assert_eq!(echo.query["scale"], "true");
    assert_eq!(echo.user_agent.as_deref(), Some("gomarathon"));
    assert_eq!(echo.body, Some(serde_json::json!({"id": "web"})));
}

#[tokio::test]
async fn echo_without_body() {
    let resp = app().oneshot(empty_request("DELETE", "/v2/echo")).await.unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert!(echo.query.is_empty());
    assert!(echo.body.is_none());
}

// --- full app lifecycle ---

#[tokio::test]
async fn app_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v2/apps", r#"{"id":"web","instances":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // create again: conflict
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v2/apps", r#"{"id":"web"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v2/apps/web"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched["app"]["instances"], 2);

    // update: instances and an extra field
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/v2/apps/web", r#"{"instances":5,"cpus":0.25}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["app"]["instances"], 5);
    assert_eq!(updated["app"]["cpus"], 0.25);

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v2/apps"))
        .await
        .unwrap();
    let list: Value = body_json(resp).await;
    assert_eq!(list["apps"].as_array().unwrap().len(), 1);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/v2/apps/web"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = body_json(resp).await;
    assert_eq!(deleted["deleted"], "web");

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v2/apps/web"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
