use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::models::{Collection, NewCollection, User};
use crate::database::{CollectionChanges, DatabaseError, Store};
use crate::middleware::cors_layer;
use crate::server::{app, AppState};

/// Router wired to `store` with the development config
pub fn test_app(store: Arc<MemoryStore>) -> Router {
    let config = AppConfig::from_lookup(|_| None);
    let cors = cors_layer(&config).expect("default dev origin is valid");
    app(AppState::new(store), cors)
}

/// Send one request through `app`, returning the status and JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// In-memory `Store` for handler and keep-alive tests.
///
/// Rows keep insertion order. `set_failing(true)` makes every call return a
/// query error, which is how tests simulate an unreachable database.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    collections: Mutex<Vec<Collection>>,
    failing: AtomicBool,
    pings: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.collections.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    async fn find_user_id(&self, uid: &str) -> Result<Option<i64>, DatabaseError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.uid == uid).map(|u| u.id))
    }

    async fn insert_user(&self, uid: &str, email: &str) -> Result<Option<i64>, DatabaseError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.uid == uid) {
            return Ok(None);
        }
        let id = users.len() as i64 + 1;
        users.push(User {
            id,
            uid: uid.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        });
        Ok(Some(id))
    }

    async fn insert_collection(&self, collection: &NewCollection) -> Result<i64, DatabaseError> {
        self.check()?;
        let mut rows = self.collections.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(Collection {
            id,
            uid: collection.uid.clone(),
            name: collection.name.clone(),
            url: collection.url.clone(),
            method: collection.method.clone(),
            headers: collection.headers.clone(),
            params: collection.params.clone(),
            body: collection.body.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_collections(&self, uid: &str) -> Result<Vec<Collection>, DatabaseError> {
        self.check()?;
        let rows = self.collections.lock().unwrap();
        Ok(rows.iter().filter(|c| c.uid == uid).cloned().collect())
    }

    async fn update_collection(&self, id: i64, changes: &CollectionChanges) -> Result<u64, DatabaseError> {
        self.check()?;
        let assignments = changes.assignments()?;
        let mut rows = self.collections.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(0);
        };
        for (column, value) in assignments {
            match column {
                "uid" => row.uid = value,
                "name" => row.name = value,
                "url" => row.url = value,
                "method" => row.method = value,
                "params" => row.params = Some(value),
                "headers" => row.headers = Some(value),
                "body" => row.body = Some(value),
                other => {
                    return Err(DatabaseError::QueryError(format!("unknown column {}", other)));
                }
            }
        }
        Ok(1)
    }
}
