use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::model::User;

/// JWT Claims structure.
///
/// Carries identity only. Role and active status are re-read from the store
/// on every request, so they are not part of the token. Unknown fields are
/// rejected, which also rejects tokens minted under an older claim layout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User name at issue time, informational only
    pub name: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a user, expiring `expires_in_seconds` from now.
    ///
    /// Fails with [`AuthError::TokenGenerationError`] when the expiry falls
    /// outside the representable date range.
    pub fn new(user: &User, expires_in_seconds: i64) -> Result<Self> {
        let now = Utc::now();
        let expiration = TimeDelta::try_seconds(expires_in_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::TokenGenerationError(format!(
                    "token lifetime of {}s is out of range",
                    expires_in_seconds
                ))
            })?;

        Ok(Self {
            sub: user.id.to_string(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        })
    }

    /// A token is dead from its `exp` second onward.
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Generate a signed HS256 token for a user
///
/// # Arguments
/// * `user` - The user the token is issued to
/// * `secret` - The secret key for signing the token
/// * `expires_in_seconds` - Token lifetime in seconds
pub fn generate_token(user: &User, secret: &str, expires_in_seconds: i64) -> Result<String> {
    let claims = Claims::new(user, expires_in_seconds)?;

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
}

/// Validate a token and return its claims.
///
/// Bad signature, wrong algorithm, claim layout mismatch and expiry all come
/// back as [`AuthError::InvalidToken`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| {
        debug!("[AUTH] Token rejected: {}", e);
        AuthError::InvalidToken
    })?;

    let claims = token_data.claims;

    if claims.is_expired() {
        debug!("[AUTH] Token rejected: expired at {}", claims.exp);
        return Err(AuthError::InvalidToken);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "user_123".to_string(),
            password_hash: "hash".to_string(),
            full_name: None,
            role: Role::User,
            account_active: true,
            created_at: Utc::now(),
        }
    }

    fn sign<T: Serialize>(claims: &T, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_generation_and_validation() {
        let secret = "test_secret";
        let user = test_user();

        let token = generate_token(&user, secret, 3600).unwrap();
        let claims = validate_token(&token, secret).unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.name, user.name);
        assert!(!claims.is_expired());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_invalid_secret() {
        let user = test_user();

        let token = generate_token(&user, "correct_secret", 3600).unwrap();
        let result = validate_token(&token, "wrong_secret");

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let secret = "test_secret";
        let token = generate_token(&test_user(), secret, -10).unwrap();

        let result = validate_token(&token, secret);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let secret = "test_secret";
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            name: "edge".to_string(),
            iat: now - 60,
            exp: now,
        };

        let result = validate_token(&sign(&claims, secret), secret);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_unexpected_claim_layout_is_rejected() {
        #[derive(Serialize)]
        struct LegacyClaims {
            sub: String,
            name: String,
            role: Role,
            iat: i64,
            exp: i64,
        }

        let secret = "test_secret";
        let now = Utc::now().timestamp();
        let legacy = LegacyClaims {
            sub: Uuid::new_v4().to_string(),
            name: "admin".to_string(),
            role: Role::Admin,
            iat: now,
            exp: now + 3600,
        };

        let result = validate_token(&sign(&legacy, secret), secret);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_missing_claim_is_rejected() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }

        let secret = "test_secret";
        let partial = Partial {
            sub: Uuid::new_v4().to_string(),
            exp: Utc::now().timestamp() + 3600,
        };

        assert!(validate_token(&sign(&partial, secret), secret).is_err());
    }

    #[test]
    fn test_mistyped_claim_is_rejected() {
        #[derive(Serialize)]
        struct Mistyped {
            sub: String,
            name: u64,
            iat: i64,
            exp: String,
        }

        let secret = "test_secret";
        let now = Utc::now().timestamp();
        let mistyped = Mistyped {
            sub: Uuid::new_v4().to_string(),
            name: 7,
            iat: now,
            exp: (now + 3600).to_string(),
        };

        assert!(matches!(
            validate_token(&sign(&mistyped, secret), secret),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let user = test_user();

        for ttl in [i64::MAX, i64::MIN, 400_000 * 365 * 24 * 60 * 60] {
            assert!(matches!(
                generate_token(&user, "test_secret", ttl),
                Err(AuthError::TokenGenerationError(_))
            ));
        }
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_token("not.a.token", "secret"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(validate_token("", "secret"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject() {
        let claims = Claims {
            sub: "42".to_string(),
            name: "x".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert!(matches!(claims.user_id(), Err(AuthError::InvalidToken)));
    }
}
