use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::{probe_pool, DatabaseError, DatabaseManager};
use crate::database::models::{Collection, NewCollection};
use crate::database::update::CollectionChanges;

pub const COLLECTIONS_TABLE: &str = "collections";

/// Query handle used by the request handlers.
///
/// Every method runs a single statement on a connection borrowed for the
/// duration of that call.
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Id of the user registered under `uid`, if any
    async fn find_user_id(&self, uid: &str) -> Result<Option<i64>, DatabaseError>;

    /// Insert a user. Returns `None` when a row for `uid` already exists.
    async fn insert_user(&self, uid: &str, email: &str) -> Result<Option<i64>, DatabaseError>;

    async fn insert_collection(&self, collection: &NewCollection) -> Result<i64, DatabaseError>;

    /// All collections owned by `uid`, in whatever order the store returns them
    async fn list_collections(&self, uid: &str) -> Result<Vec<Collection>, DatabaseError>;

    /// Apply `changes` to collection `id`. Returns the number of rows touched,
    /// which is zero for an unknown id.
    async fn update_collection(&self, id: i64, changes: &CollectionChanges) -> Result<u64, DatabaseError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            pool: manager.pool().clone(),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        probe_pool(&self.pool).await
    }

    async fn find_user_id(&self, uid: &str) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_user(&self, uid: &str, email: &str) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (uid, email, created_at) VALUES ($1, $2, NOW())
             ON CONFLICT (uid) DO NOTHING
             RETURNING id",
        )
        .bind(uid)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_collection(&self, collection: &NewCollection) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO collections (uid, name, url, method, headers, params, body, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
             RETURNING id",
        )
        .bind(&collection.uid)
        .bind(&collection.name)
        .bind(&collection.url)
        .bind(&collection.method)
        .bind(&collection.headers)
        .bind(&collection.params)
        .bind(&collection.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_collections(&self, uid: &str) -> Result<Vec<Collection>, DatabaseError> {
        let rows = sqlx::query_as::<_, Collection>(
            "SELECT id, uid, name, url, method, headers, params, body, created_at
             FROM collections
             WHERE uid = $1",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_collection(&self, id: i64, changes: &CollectionChanges) -> Result<u64, DatabaseError> {
        let Some(stmt) = changes.to_update(COLLECTIONS_TABLE, id)? else {
            return Ok(0);
        };

        debug!("Updating collection {}: {}", id, stmt.sql);

        let mut q = sqlx::query(&stmt.sql);
        for value in &stmt.values {
            q = q.bind(value);
        }
        let result = q.bind(stmt.id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
