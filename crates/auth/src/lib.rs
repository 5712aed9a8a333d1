// Core modules
mod error;
mod guard;
mod jwt;
mod password;

pub mod model;
pub mod service;
pub mod store;

// Re-export error types
pub use error::{AuthError, Result};

// Re-export crypto primitives
pub use jwt::{generate_token, validate_token, Claims};
pub use password::{hash_password, verify_password};

pub use guard::authorize;
pub use model::{CreateUser, NewUser, Role, User, UserProfile};
pub use service::AuthService;
pub use store::{StoreError, UserStore};

