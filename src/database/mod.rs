pub mod keepalive;
pub mod manager;
pub mod models;
pub mod store;
pub mod update;

pub use keepalive::spawn_keepalive;
pub use manager::{DatabaseError, DatabaseManager};
pub use store::{PgStore, Store};
pub use update::{column_text, CollectionChanges, UpdateStatement};
