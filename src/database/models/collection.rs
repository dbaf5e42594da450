use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A saved HTTP request template.
///
/// `headers`, `params` and `body` hold JSON text exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: Option<String>,
    pub params: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload with the JSON columns already serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCollection {
    pub uid: String,
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: Option<String>,
    pub params: Option<String>,
    pub body: Option<String>,
}
