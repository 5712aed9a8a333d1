use tracing::warn;

use crate::error::{AuthError, Result};
use crate::model::{Role, User};

/// Allow the request only if the user's current role is one of `allowed`.
///
/// `user` must be the record freshly resolved from the store, not token claims.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        warn!(
            "[AUTH] Access denied for {} (role {}), required one of {:?}",
            user.name, user.role, allowed
        );
        Err(AuthError::Forbidden)
    }
}
