use auth::{AuthError, AuthService, Role};
use authgate_core::{SeedConfig, DEFAULT_ADMIN_PASSWORD};
use tracing::{info, warn};

/// Make sure the configured admin account exists.
///
/// Safe to run on every start: an existing account with the same name is left
/// untouched, whatever its current password or role.
pub async fn seed_admin(auth_service: &AuthService, seed: &SeedConfig) -> auth::Result<()> {
    info!("[SEED] Checking for admin account '{}'", seed.admin_name);

    match auth_service
        .create_user_with_role(&seed.admin_name, &seed.admin_password, Role::Admin)
        .await
    {
        Ok(user) => {
            info!("[SEED] Created admin account '{}' (id: {})", user.name, user.id);
            if seed.admin_password == DEFAULT_ADMIN_PASSWORD {
                warn!("[SEED] Admin is using the default password, change it before exposing this server");
            }
            Ok(())
        }
        Err(AuthError::DuplicateUser(name)) => {
            info!("[SEED] Admin account '{}' already exists", name);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
