use serde::{Deserialize, Serialize};

/// Model JWT claims dari hosted auth provider yang dipakai di seluruh back-office
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
    pub jti: String,
}

impl TokenClaims {
    /// Cek apakah token adalah access token
    pub fn is_access_token(&self) -> bool {
        self.token_type == "access"
    }

    /// Cek apakah user memiliki role admin back-office
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
