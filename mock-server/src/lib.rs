use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Version string reported by `/v2/info`.
pub const VERSION: &str = "1.0";

/// Length of the `pad` string served by `/v2/large`.
pub const LARGE_PAD_LEN: usize = 11 * 1024 * 1024;

/// Minimal Marathon application definition; unknown fields are kept.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct App {
    pub id: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_instances() -> u32 {
    1
}

/// What `/v2/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

pub type Db = Arc<RwLock<HashMap<String, App>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/v2/info", get(info))
        .route("/v2/apps", get(list_apps).post(create_app))
        .route("/v2/apps/{id}", get(get_app).put(update_app).delete(delete_app))
        .route("/v2/garbage", get(garbage))
        .route("/v2/large", get(large))
        .route("/v2/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::info!(addr = ?listener.local_addr().ok(), "mock marathon listening");
    axum::serve(listener, app()).await
}

async fn info() -> Json<Value> {
    Json(json!({ "name": "marathon", "version": VERSION }))
}

async fn list_apps(State(db): State<Db>) -> Json<Value> {
    let apps = db.read().await;
    let mut list: Vec<&App> = apps.values().collect();
    list.sort_by(|a, b| a.id.cmp(&b.id));
    Json(json!({ "apps": list }))
}

async fn create_app(
    State(db): State<Db>,
    Json(input): Json<App>,
) -> Result<(StatusCode, Json<App>), (StatusCode, Json<Value>)> {
    let mut apps = db.write().await;
    if apps.contains_key(&input.id) {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({ "message": format!("An app with id [{}] already exists.", input.id) })),
        ));
    }
    apps.insert(input.id.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_app(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let apps = db.read().await;
    apps.get(&id)
        .map(|app| Json(json!({ "app": app })))
        .ok_or((StatusCode::NOT_FOUND, "not found"))
}

async fn update_app(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(patch): Json<BTreeMap<String, Value>>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let mut apps = db.write().await;
    let app = apps.get_mut(&id).ok_or((StatusCode::NOT_FOUND, "not found"))?;
    for (key, value) in patch {
        if key == "cmd" {
            app.cmd = value.as_str().map(str::to_string);
        } else if key == "instances" {
            if let Some(n) = value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                app.instances = n;
            }
        } else if key != "id" {
            app.extra.insert(key, value);
        }
    }
    Ok(Json(json!({ "app": app })))
}

async fn delete_app(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, &'static str)> {
    let mut apps = db.write().await;
    apps.remove(&id)
        .map(|app| Json(json!({ "deleted": app.id })))
        .ok_or((StatusCode::NOT_FOUND, "not found"))
}

async fn garbage() -> &'static str {
    "<<<"
}

async fn large() -> Json<Value> {
    Json(json!({ "apps": [], "pad": "x".repeat(LARGE_PAD_LEN) }))
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Echo>, (StatusCode, String)> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body = if body.is_empty() {
        None
    } else {
        let value = serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid json: {e}")))?;
        Some(value)
    };
    Ok(Json(Echo {
        method: method.to_string(),
        query,
        user_agent: header("user-agent"),
        content_type: header("content-type"),
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_defaults_instances_to_one() {
        let app: App = serde_json::from_str(r#"{"id":"web"}"#).unwrap();
        assert_eq!(app.id, "web");
        assert_eq!(app.instances, 1);
        assert!(app.cmd.is_none());
        assert!(app.extra.is_empty());
    }

    #[test]
    fn app_keeps_unknown_fields() {
        let app: App =
            serde_json::from_str(r#"{"id":"web","cpus":0.5,"labels":{"tier":"front"}}"#).unwrap();
        assert_eq!(app.extra["cpus"], json!(0.5));
        let back = serde_json::to_value(&app).unwrap();
        assert_eq!(back["labels"]["tier"], "front");
    }

    #[test]
    fn app_rejects_missing_id() {
        let result: Result<App, _> = serde_json::from_str(r#"{"instances":2}"#);
        assert!(result.is_err());
    }
}
