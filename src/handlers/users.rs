use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{object_body, RequiredFields};
use crate::error::ApiResult;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub uid: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

/// POST /api/users - Register a user on first sight of its `uid`
///
/// Idempotent: a known `uid` answers 200 without touching the row.
///
/// Expected Input:
/// ```json
/// { "uid": "string", "email": "string" }
/// ```
///
/// Expected Output (Created):
/// ```json
/// { "message": "User created successfully", "userId": 1 }
/// ```
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: RegisterRequest = object_body(payload)?;

    let mut required = RequiredFields::default();
    let uid = required.take("uid", request.uid);
    let email = required.take("email", request.email);
    required.check()?;

    if let Some(user_id) = state.store.find_user_id(&uid).await? {
        debug!("User {} already registered as {}", uid, user_id);
        return Ok(already_exists());
    }

    // Lookup and insert are separate statements; a concurrent insert of the
    // same uid lands here as None.
    match state.store.insert_user(&uid, &email).await? {
        Some(user_id) => {
            info!("Registered user {} as {}", uid, user_id);
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "User created successfully",
                    "userId": user_id
                })),
            ))
        }
        None => Ok(already_exists()),
    }
}

fn already_exists() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": "User already exists" })))
}
