//! User persistence
//!
//! SQLite implementation of [`auth::UserStore`]:
//! - Lookup by name and by id
//! - Creation with a store-enforced unique name
//! - Embedded schema migrations
//! - Account administration (role, active flag, deletion)

pub mod model;
pub mod service;

pub use model::UserRow;
pub use service::SqliteUserStore;
