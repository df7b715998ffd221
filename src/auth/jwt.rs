use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::users::{self, Roles};

/// Token lifetime: 24 hours.
const TOKEN_TTL_SECS: usize = 24 * 3600;

/// Claims of the HS256 JWTs this server mints on login.
///
/// `sub` is the user's UUID in the `users` table.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    /// User's email at mint time.
    pub email: Option<String>,
    /// The user's role at mint time ("student" | "teacher" | "admin").
    /// Authorization decisions re-check the database row, not this claim.
    pub role: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

fn role_str(role: Roles) -> &'static str {
    match role {
        Roles::Student => "student",
        Roles::Teacher => "teacher",
        Roles::Admin => "admin",
    }
}

/// Mint a token for a user after successful credential verification.
pub fn issue_token(user: &users::Model, secret: &str) -> Result<String, String> {
    let now = chrono::Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        exp: now + TOKEN_TTL_SECS,
        iat: Some(now),
        email: Some(user.email.clone()),
        role: Some(role_str(user.role).to_string()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to encode JWT: {e}"))
}

/// Validate an HS256 JWT and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|td| td.claims)
    .map_err(|e| format!("{:?}", e.kind()))
}
