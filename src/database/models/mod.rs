pub mod collection;
pub mod user;

pub use collection::{Collection, NewCollection};
pub use user::User;
