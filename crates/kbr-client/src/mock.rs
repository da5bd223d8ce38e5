//! In-process fake Kibana for client tests.
//!
//! Objects are stored by request path. Paths containing `boom` answer 500.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub xsrf: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub(crate) struct MockKibana {
    objects: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockKibana {
    pub fn seed(&self, path: &str, value: Value) {
        self.objects.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the base address.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle(
    State(mock): State<MockKibana>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let body: Option<Value> = serde_json::from_str(&body).ok();
    mock.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        xsrf: header(&headers, "kbn-xsrf"),
        authorization: header(&headers, "authorization"),
        body: body.clone(),
    });

    if path.contains("boom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#.into());
    }
    if method != Method::GET && header(&headers, "kbn-xsrf").is_none() {
        return (StatusCode::BAD_REQUEST, r#"{"error":"missing kbn-xsrf"}"#.into());
    }

    let mut objects = mock.objects.lock().unwrap();
    let last = path.rsplit('/').next().unwrap_or_default().to_string();
    match method {
        Method::GET => match objects.get(&path) {
            Some(value) => (StatusCode::OK, value.to_string()),
            None => (StatusCode::NOT_FOUND, r#"{"statusCode":404}"#.into()),
        },
        Method::DELETE => match objects.remove(&path) {
            Some(_) => (StatusCode::NO_CONTENT, String::new()),
            None => (StatusCode::NOT_FOUND, r#"{"statusCode":404}"#.into()),
        },
        Method::POST if path.ends_with("/_copy_saved_objects") => {
            let spaces = body
                .as_ref()
                .and_then(|b| b.get("spaces"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let mut summary = serde_json::Map::new();
            for space in spaces.iter().filter_map(Value::as_str) {
                summary.insert(space.to_string(), json!({"success": true, "successCount": 1}));
            }
            (StatusCode::OK, Value::Object(summary).to_string())
        }
        Method::POST if path == "/api/spaces/space" => {
            let Some(space) = body else {
                return (StatusCode::BAD_REQUEST, String::new());
            };
            let id = space["id"].as_str().unwrap_or_default();
            let key = format!("/api/spaces/space/{id}");
            if objects.contains_key(&key) {
                return (StatusCode::CONFLICT, r#"{"statusCode":409}"#.into());
            }
            objects.insert(key, space.clone());
            (StatusCode::OK, space.to_string())
        }
        Method::PUT => {
            let Some(mut value) = body else {
                return (StatusCode::BAD_REQUEST, String::new());
            };
            if path.starts_with("/api/spaces/space/") {
                objects.insert(path, value.clone());
                return (StatusCode::OK, value.to_string());
            }
            if path.starts_with("/api/security/role/") {
                value["name"] = json!(last);
            } else if path.starts_with("/api/logstash/pipeline/") {
                value["id"] = json!(last);
                value["username"] = json!("elastic");
            }
            objects.insert(path, value);
            (StatusCode::NO_CONTENT, String::new())
        }
        _ => (StatusCode::METHOD_NOT_ALLOWED, String::new()),
    }
}
