// JWT Authentication Middleware untuk Quotation Service, semua route /api khusus admin

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use shared::utils::jwt::{extract_bearer_token, validate_access_token, JwtError};

use crate::{config::AppState, error::AppError};

// Context admin yang sudah terautentikasi
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

// Axum extractor implementation untuk AuthAdmin
impl<S> axum::extract::FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthAdmin>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

// Extract Bearer token dari Authorization header
fn extract_jwt_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AppError::unauthorized("Authorization header dengan Bearer token diperlukan"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header format"))?;

    extract_bearer_token(auth_header)
        .ok_or_else(|| AppError::unauthorized("Bearer token format diperlukan"))
}

/// Validasi token dan pastikan role admin
pub fn authenticate_admin(headers: &HeaderMap, jwt_secret: &str) -> Result<AuthAdmin, AppError> {
    let token = extract_jwt_token(headers)?;

    let claims = validate_access_token(&token, jwt_secret).map_err(|e| match e {
        JwtError::MissingSecret => {
            tracing::error!("JWT secret tidak dikonfigurasi dengan benar");
            AppError::internal("Konfigurasi autentikasi tidak valid")
        }
        other => AppError::from(other),
    })?;

    if !claims.is_admin() {
        return Err(AppError::forbidden("Endpoint ini hanya untuk admin"));
    }

    Ok(AuthAdmin {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

// JWT authentication middleware, dipasang di nested router /api
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let admin = authenticate_admin(request.headers(), &state.config.jwt_secret).map_err(|e| {
        tracing::warn!("Rejected request to {}: {}", path, e);
        e
    })?;

    // Security audit log
    tracing::debug!(
        "Admin authenticated - ID: {}, Email: {}, Endpoint: {}",
        admin.user_id,
        admin.email,
        path
    );

    // Inject ke request extensions agar bisa di-extract oleh handlers
    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}
