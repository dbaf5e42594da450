// handlers/mod.rs - HTTP request handlers
//
// Each handler is a short validate -> query -> respond sequence against the
// `Store` carried in `AppState`.

pub mod collections;
pub mod health;
pub mod users;

pub use collections::{list_collections, save_collection, update_collection};
pub use health::health;
pub use users::register_user;

use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::column_text;
use crate::error::{ApiError, ApiResult};

/// Decode a request body that must be a JSON object.
///
/// Derived `Deserialize` structs also accept arrays and fill fields by
/// position, so anything but an object is turned away before decoding.
pub(crate) fn object_body<T: DeserializeOwned>(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<T> {
    let Json(value) = payload?;
    if !value.is_object() {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ApiError::invalid_json(e.to_string()))
}

/// Collects required text fields, remembering which ones were not usable.
///
/// A field counts as missing when the key is absent, `null`, or an empty
/// string. Other values are kept as their column text.
#[derive(Debug, Default)]
pub(crate) struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn take(&mut self, name: &'static str, value: Option<Value>) -> String {
        match value {
            Some(v) if !v.is_null() && v != "" => column_text(&v),
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// Fails with a validation error naming every missing field
    pub fn check(self) -> ApiResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing_fields(&self.missing))
        }
    }
}
