// Redis-based Rate Limiting Middleware untuk Quotation Service

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::{AsyncCommands, Client};
use std::env;
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::auth::AuthAdmin;

fn env_limit(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Rate limit configuration dari environment
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub guest_requests_per_hour: u32,
    pub admin_requests_per_hour: u32,
    pub sensitive_requests_per_hour: u32,
    pub window_seconds: u64,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            guest_requests_per_hour: env_limit("RATE_LIMIT_GUEST_REQUESTS", 100),
            admin_requests_per_hour: env_limit("RATE_LIMIT_ADMIN_REQUESTS", 1000),
            sensitive_requests_per_hour: env_limit("RATE_LIMIT_SENSITIVE_ENDPOINTS", 60),
            window_seconds: 3600,
        }
    }

    /// Endpoint yang mengirim email ke customer punya limit sendiri
    pub fn is_sensitive(method: &Method, path: &str) -> bool {
        *method == Method::POST
            && path.contains("/quotations/")
            && (path.ends_with("/send") || path.ends_with("/reminders"))
    }

    pub fn max_requests(&self, role: &str, method: &Method, path: &str) -> u32 {
        if Self::is_sensitive(method, path) {
            return self.sensitive_requests_per_hour;
        }

        match role {
            "admin" => self.admin_requests_per_hour,
            _ => self.guest_requests_per_hour,
        }
    }
}

/// Rate limiter menggunakan Redis sorted set sebagai sliding window
#[derive(Clone)]
pub struct RateLimiter {
    redis_client: Client,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(redis_url: &str) -> Result<Self, RateLimitError> {
        let redis_client = Client::open(redis_url).map_err(RateLimitError::RedisConnection)?;

        Ok(Self {
            redis_client,
            config: RateLimitConfig::from_env(),
        })
    }

    /// Check rate limit untuk identifier dan bucket endpoint
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        bucket: &str,
        max_requests: u32,
    ) -> Result<RateLimitResult, RateLimitError> {
        let mut conn = self
            .redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(RateLimitError::RedisConnection)?;

        let window_key = format!("quotation:rate_limit:{}:{}", identifier, bucket);
        let now_ms = chrono::Utc::now().timestamp_millis();
        let window_ms = (self.config.window_seconds * 1000) as i64;
        let window_start = now_ms - window_ms;

        // Buang entry di luar window
        let _: () = conn
            .zrembyscore(&window_key, "-inf", window_start)
            .await
            .map_err(RateLimitError::RedisOperation)?;

        let current_count: u32 = conn
            .zcard(&window_key)
            .await
            .map_err(RateLimitError::RedisOperation)?;

        // Member unik supaya request di milidetik yang sama tetap terhitung
        let member = format!("{}:{}", now_ms, Uuid::new_v4());
        let _: () = conn
            .zadd(&window_key, member, now_ms)
            .await
            .map_err(RateLimitError::RedisOperation)?;

        let _: () = conn
            .expire(&window_key, self.config.window_seconds as i64)
            .await
            .map_err(RateLimitError::RedisOperation)?;

        Ok(RateLimitResult::evaluate(
            current_count,
            max_requests,
            ((now_ms + window_ms) / 1000) as u64,
        ))
    }
}

/// Rate limit result
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub current_count: u32,
    pub max_requests: u32,
    pub remaining: u32,
    pub reset_time: u64,
}

impl RateLimitResult {
    fn evaluate(previous_count: u32, max_requests: u32, reset_time: u64) -> Self {
        let allowed = previous_count < max_requests;
        Self {
            allowed,
            current_count: previous_count + 1,
            max_requests,
            remaining: if allowed {
                max_requests.saturating_sub(previous_count + 1)
            } else {
                0
            },
            reset_time,
        }
    }
}

/// Rate limiting error types
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Redis connection error: {0}")]
    RedisConnection(redis::RedisError),

    #[error("Redis operation error: {0}")]
    RedisOperation(redis::RedisError),
}

/// Axum middleware untuk rate limiting, Redis error tidak memblokir request
pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let identifier = extract_identifier(&request);

    let role = request
        .extensions()
        .get::<AuthAdmin>()
        .map(|admin| admin.role.clone())
        .unwrap_or_else(|| "guest".to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let max_requests = rate_limiter.config.max_requests(&role, &method, &path);
    let bucket = if RateLimitConfig::is_sensitive(&method, &path) {
        "sensitive"
    } else {
        role.as_str()
    };

    match rate_limiter.check_rate_limit(&identifier, bucket, max_requests).await {
        Ok(result) if result.allowed => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();

            headers.insert("X-RateLimit-Limit", HeaderValue::from(result.max_requests));
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(result.remaining));
            headers.insert("X-RateLimit-Reset", HeaderValue::from(result.reset_time));

            response
        }
        Ok(result) => {
            tracing::warn!(
                "Rate limit exceeded for {} on {} {} ({}/{})",
                identifier,
                method,
                path,
                result.current_count,
                result.max_requests
            );

            let body = axum::Json(serde_json::json!({
                "success": false,
                "error": "rate_limit_exceeded",
                "message": "Terlalu banyak request, coba lagi nanti"
            }));

            (StatusCode::TOO_MANY_REQUESTS, body).into_response()
        }
        Err(e) => {
            tracing::error!("Rate limiting error: {}", e);
            next.run(request).await
        }
    }
}

/// Extract client identifier untuk rate limiting
fn extract_identifier(request: &Request) -> String {
    if let Some(admin) = request.extensions().get::<AuthAdmin>() {
        return format!("user:{}", admin.user_id);
    }

    request
        .headers()
        .get("x-forwarded-for")
        .or_else(|| request.headers().get("x-real-ip"))
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|ip| format!("ip:{}", ip.trim()))
        .unwrap_or_else(|| "ip:unknown".to_string())
}
