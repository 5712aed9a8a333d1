use auth::AuthService;

/// Application state shared across all handlers
pub struct AppState {
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }
}
