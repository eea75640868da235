// Quotation Service Configuration
use sqlx::{postgres::PgConnectOptions, postgres::PgPoolOptions, PgPool};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::quotation::DEFAULT_VALIDITY_DAYS;
use crate::middleware::rate_limit::RateLimiter;
use crate::repositories::{
    history_repo::PgHistoryRepository, order_repo::PgOrderRepository,
    payment_repo::PgPaymentRepository, quotation_repo::PgQuotationRepository,
};
use crate::services::{NotificationDispatcher, OrderService, PaymentLedger, QuotationManager};
use crate::utils::email::build_email_sender;

// Provider email transaksional
#[derive(Debug, Clone, PartialEq)]
pub enum EmailSettings {
    Resend {
        api_key: String,
        from_email: String,
        from_name: String,
    },
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
        from_email: String,
        from_name: String,
    },
}

impl EmailSettings {
    // Load konfigurasi email sesuai EMAIL_PROVIDER
    fn from_env(company_name: &str) -> Result<Self, String> {
        let provider = env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "resend".to_string());
        let from_name = env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| company_name.to_string());

        match provider.to_lowercase().as_str() {
            "resend" => Ok(EmailSettings::Resend {
                api_key: required("RESEND_API_KEY")?,
                from_email: required("RESEND_FROM_EMAIL")?,
                from_name,
            }),
            "smtp" => Ok(EmailSettings::Smtp {
                host: required("SMTP_HOST")?,
                port: parse_or("SMTP_PORT", 587)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from_email: required("EMAIL_FROM")?,
                from_name,
            }),
            other => Err(format!(
                "EMAIL_PROVIDER tidak dikenal: {} (gunakan resend atau smtp)",
                other
            )),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            EmailSettings::Resend { .. } => "resend",
            EmailSettings::Smtp { .. } => "smtp",
        }
    }
}

fn required(key: &str) -> Result<String, String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| format!("{} harus diset", key))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("{} tidak valid: {}", key, value)),
        Err(_) => Ok(default),
    }
}

// Konfigurasi aplikasi dari environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub redis_url: String,
    pub email: EmailSettings,
    pub company_name: String,
    pub quote_validity_days: i64,
    pub run_migrations: bool,
    pub app_version: String,
}

impl AppConfig {
    // Load konfigurasi dari environment dengan validasi
    pub fn from_env() -> Result<Self, String> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        if !cfg!(debug_assertions) && jwt_secret.contains("change-this") {
            return Err("JWT_SECRET masih default! Ganti untuk production".to_string());
        }

        let company_name = env::var("COMPANY_NAME").unwrap_or_else(|_| "BioPlast".to_string());

        let quote_validity_days = parse_or("QUOTE_VALIDITY_DAYS", DEFAULT_VALIDITY_DAYS)?;
        if quote_validity_days <= 0 {
            return Err("QUOTE_VALIDITY_DAYS harus lebih dari 0".to_string());
        }

        Ok(AppConfig {
            database_url,
            server_host: env::var("QUOTATION_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_or("QUOTATION_SERVICE_PORT", 3010)?,
            environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
            jwt_secret,
            frontend_url: required("FRONTEND_URL")?,
            redis_url: required("REDIS_URL")?,
            email: EmailSettings::from_env(&company_name)?,
            company_name,
            quote_validity_days,
            run_migrations: parse_or("RUN_MIGRATIONS", true)?,
            app_version: env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
        })
    }

    // Helper cek production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

// Inisialisasi database connection pool
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing Quotation Service database connection...");

    // Disable prepared statement cache supaya aman di belakang connection pooler
    let options = PgConnectOptions::from_str(database_url)?.statement_cache_capacity(0);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    tracing::info!("Quotation Service database pool initialized");
    Ok(pool)
}

// Health check database connection
pub async fn check_db_health(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_optional(pool).await.is_ok()
}

// Application state yang di-share ke semua handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
    pub rate_limiter: RateLimiter,
    pub orders: OrderService,
    pub quotations: QuotationManager,
    pub payments: PaymentLedger,
    pub notifications: NotificationDispatcher,
}

impl axum::extract::FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}

impl AppState {
    // Inisialisasi application state
    pub async fn new(config: AppConfig) -> Result<Self, String> {
        let db = init_db_pool(&config.database_url)
            .await
            .map_err(|e| format!("Failed to init database: {}", e))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        let email_sender = build_email_sender(&config.email, http_client)
            .map_err(|e| format!("Failed to init email sender: {}", e))?;
        tracing::info!("Email provider: {}", config.email.provider_name());

        tracing::info!("Initializing Redis rate limiter...");
        let rate_limiter = RateLimiter::new(&config.redis_url)
            .map_err(|e| format!("Failed to initialize Redis rate limiter: {}", e))?;

        let order_repo = Arc::new(PgOrderRepository::new(db.clone()));
        let quotation_repo = Arc::new(PgQuotationRepository::new(db.clone()));
        let payment_repo = Arc::new(PgPaymentRepository::new(db.clone()));
        let history_repo = Arc::new(PgHistoryRepository::new(db.clone()));

        let orders = OrderService::new(order_repo.clone());
        let quotations = QuotationManager::new(
            order_repo.clone(),
            quotation_repo.clone(),
            config.quote_validity_days,
        );
        let payments = PaymentLedger::new(quotation_repo.clone(), payment_repo);
        let notifications = NotificationDispatcher::new(
            order_repo,
            quotation_repo,
            history_repo,
            email_sender,
            config.company_name.clone(),
        );

        Ok(AppState {
            db,
            config,
            rate_limiter,
            orders,
            quotations,
            payments,
            notifications,
        })
    }

    // Inisialisasi application state dari environment
    pub async fn from_env() -> Result<Self, String> {
        let config = AppConfig::from_env()?;
        Self::new(config).await
    }

    // Health check semua dependencies
    pub async fn health_check(&self) -> HealthStatus {
        let db_healthy = check_db_health(&self.db).await;

        HealthStatus {
            database: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
            overall: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        }
    }
}

// Response untuk health check endpoint
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub database: String,
    pub overall: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_missing() {
        let port: u16 = parse_or("QUOTATION_TEST_UNSET_PORT", 3010).unwrap();
        assert_eq!(port, 3010);
    }

    #[test]
    fn test_required_reports_missing_key() {
        let err = required("QUOTATION_TEST_UNSET_KEY").unwrap_err();
        assert_eq!(err, "QUOTATION_TEST_UNSET_KEY harus diset");
    }

    #[test]
    fn test_provider_name() {
        let settings = EmailSettings::Resend {
            api_key: "re_test".to_string(),
            from_email: "sales@bioplast.example".to_string(),
            from_name: "BioPlast".to_string(),
        };
        assert_eq!(settings.provider_name(), "resend");
    }
}
