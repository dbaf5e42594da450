use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{object_body, RequiredFields};
use crate::database::models::{Collection, NewCollection};
use crate::database::CollectionChanges;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveCollectionRequest {
    #[serde(default)]
    pub uid: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub method: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    pub uid: Option<String>,
}

/// POST /api/save-collection - Store a new request template
///
/// `uid`, `name`, `url` and `method` are required. `headers`, `params` and
/// `body` may be any JSON value and are stored as JSON text.
pub async fn save_collection(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: SaveCollectionRequest = object_body(payload)?;

    let mut required = RequiredFields::default();
    let uid = required.take("uid", request.uid);
    let name = required.take("name", request.name);
    let url = required.take("url", request.url);
    let method = required.take("method", request.method);
    required.check()?;

    let collection = NewCollection {
        uid,
        name,
        url,
        method,
        headers: json_text(request.headers)?,
        params: json_text(request.params)?,
        body: json_text(request.body)?,
    };

    let collection_id = state.store.insert_collection(&collection).await?;
    info!("Saved collection {} for {}", collection_id, collection.uid);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Collection saved successfully",
            "collectionId": collection_id
        })),
    ))
}

/// GET /api/collections?uid= - List a user's collections
///
/// No ordering is applied; an unknown uid yields an empty array.
pub async fn list_collections(
    State(state): State<AppState>,
    query: Result<Query<CollectionQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Collection>>> {
    let Query(query) = query?;

    let mut required = RequiredFields::default();
    let uid = required.take("uid", query.uid.map(Value::String));
    required.check()?;

    let rows = state.store.list_collections(&uid).await?;
    Ok(Json(rows))
}

/// PUT /api/collections/:id - Update only the fields present in the body
///
/// Fields sent as `null` are skipped exactly like omitted ones. Updating an
/// id that does not exist still succeeds.
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid collection id: {}", id)))?;
    let changes: CollectionChanges = object_body(payload)?;

    if changes.is_empty() {
        return Err(ApiError::validation_error("No fields to update", None));
    }

    let affected = state.store.update_collection(id, &changes).await?;
    if affected == 0 {
        debug!("Update of collection {} matched no rows", id);
    }

    Ok(Json(json!({ "message": "Collection updated successfully" })))
}

fn json_text(value: Option<Value>) -> Result<Option<String>, serde_json::Error> {
    value.map(|v| serde_json::to_string(&v)).transpose()
}
