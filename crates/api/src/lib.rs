pub mod auth_handlers;
pub mod error;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::router;
pub use state::AppState;
