//! User model, roles and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Guild roles (seeded with fixed ids)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Role {
    /// Guild staff: validates, staffs and closes quests, keeps the books
    Assistant = 1,
    /// Quest giver
    Client = 2,
}

impl Role {
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Role::Assistant),
            2 => Some(Role::Client),
            _ => None,
        }
    }

    /// Whether tokens for this role are signed with the admin secret
    pub fn is_admin_tier(self) -> bool {
        matches!(self, Role::Assistant)
    }
}

/// Allow-list for staff-only routes
pub const STAFF: &[Role] = &[Role::Assistant];
/// Allow-list for routes open to every signed-in role
pub const ANY_ROLE: &[Role] = &[Role::Assistant, Role::Client];

/// User record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i32,
    pub name: String,
}

/// Short user representation embedded in quests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserShort {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
}

/// Token verification response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub role_id: i32,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Parse a token signed with either secret, admin secret first
    pub fn from_token_any(token: &str, admin_secret: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        match Self::from_token(token, admin_secret) {
            Ok(claims) => Ok(claims),
            Err(admin_err) => {
                tracing::debug!("Not an admin token, trying standard secret: {}", admin_err);
                Self::from_token(token, secret)
            }
        }
    }

    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    /// Require the caller's role to be in the route allow-list
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        match self.role() {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => Err(AppError::Authorization(
                "Insufficient role for this resource".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(role: Role) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: 7,
            email: "brienne@guild.test".to_string(),
            role_id: role.id(),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn token_roundtrip_with_either_secret() {
        let admin = claims(Role::Assistant).create_token("admin-secret").unwrap();
        let client = claims(Role::Client).create_token("user-secret").unwrap();

        let parsed = UserClaims::from_token_any(&admin, "admin-secret", "user-secret").unwrap();
        assert_eq!(parsed.role(), Some(Role::Assistant));

        let parsed = UserClaims::from_token_any(&client, "admin-secret", "user-secret").unwrap();
        assert_eq!(parsed.role(), Some(Role::Client));
        assert_eq!(parsed.sub, 7);
    }

    #[test]
    fn token_signed_with_unknown_secret_is_rejected() {
        let token = claims(Role::Client).create_token("forged").unwrap();
        assert!(UserClaims::from_token_any(&token, "admin-secret", "user-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims(Role::Client);
        expired.exp = Utc::now().timestamp() - 3600;
        let token = expired.create_token("user-secret").unwrap();
        assert!(UserClaims::from_token(&token, "user-secret").is_err());
    }

    #[test]
    fn role_allow_list() {
        assert!(claims(Role::Assistant).require_role(STAFF).is_ok());
        assert!(claims(Role::Client).require_role(ANY_ROLE).is_ok());
        assert!(matches!(
            claims(Role::Client).require_role(STAFF),
            Err(AppError::Authorization(_))
        ));

        let mut unknown = claims(Role::Client);
        unknown.role_id = 99;
        assert!(unknown.require_role(ANY_ROLE).is_err());
    }

    #[test]
    fn only_assistants_use_the_admin_secret() {
        assert!(Role::Assistant.is_admin_tier());
        assert!(!Role::Client.is_admin_tier());
    }
}
