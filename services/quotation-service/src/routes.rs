// API Routes untuk Quotation Service, semua route /api khusus admin

use crate::config::AppState;
use crate::handlers::{communication, health, orders, payments, quotations};
use crate::middleware::{auth::jwt_auth_middleware, rate_limit::rate_limit_middleware};
use axum::{
    extract::Request,
    http::{header, header::HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

// OpenAPI Documentation untuk Quotation Service
#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_orders,
        orders::get_order_overview,
        orders::update_order_status,
        quotations::create_quotation,
        quotations::get_order_quotation,
        quotations::amend_quotation,
        payments::record_payment,
        payments::list_payments,
        payments::get_balance,
        communication::send_quotation,
        communication::send_reminder,
        communication::list_history,
        health::health_check,
        health::get_service_info,
    ),
    components(
        schemas(
            crate::domain::order::CustomOrder,
            crate::domain::order::OrderStatus,
            crate::domain::order::ProductionTimeline,
            crate::domain::order::CreateOrderRequest,
            crate::domain::order::UpdateOrderStatusRequest,
            crate::domain::order::OrderListResponse,
            crate::domain::quotation::Quotation,
            crate::domain::quotation::BalanceSummary,
            crate::domain::quotation::CreateQuotationRequest,
            crate::domain::quotation::AmendQuotationRequest,
            crate::domain::quotation::QuotationCreated,
            crate::domain::payment::Payment,
            crate::domain::payment::PaymentMethod,
            crate::domain::payment::RecordPaymentRequest,
            crate::domain::payment::PaymentRecorded,
            crate::domain::history::QuotationHistory,
            crate::domain::history::SendReminderRequest,
            crate::config::HealthStatus,
            orders::OrderOverview,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Orders", description = "Custom order intake dan status"),
        (name = "Quotations", description = "Pembuatan dan amend quotation"),
        (name = "Payments", description = "Ledger pembayaran dan saldo quotation"),
        (name = "Communication", description = "Email quotation, reminder dan history"),
        (name = "Service", description = "Health check dan info service")
    ),
    info(
        title = "Quotation Service API",
        description = "Custom order quotation and payment workflow\n\n## Authentication\n\nAll `/api` endpoints require an admin access token in the `Authorization: Bearer {token}` header.",
        version = "1.0.0"
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub struct ApiDoc;

// Security scheme modifier untuk Bearer JWT authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

// Security headers middleware
async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; frame-ancestors 'none';",
        ),
    );
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    response
}

// CORS hanya untuk admin dashboard di FRONTEND_URL
fn configure_cors(frontend_url: &str) -> Result<CorsLayer, String> {
    let allowed_origin = frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| format!("FRONTEND_URL harus valid URL format: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(false)
        .max_age(Duration::from_secs(86400)))
}

// Buat router dengan JWT auth dan Redis rate limiting
pub fn create_routes(state: AppState) -> Result<Router, String> {
    if state.config.is_production() {
        tracing::warn!("Quotation Service running in PRODUCTION mode");
    } else {
        tracing::info!("Quotation Service running in DEVELOPMENT mode");
    }

    let cors = configure_cors(&state.config.frontend_url)?;
    let openapi = ApiDoc::openapi();

    // Public routes - tanpa JWT authentication
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/info", get(health::get_service_info))
        .layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit_middleware))
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi));

    // Protected API routes: auth dulu, lalu rate limit per admin
    let protected_routes = build_api_routes()
        .layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .with_state(state);

    Ok(public_routes
        .nest("/api", protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(cors),
        )
        .layer(from_fn(security_headers_middleware)))
}

fn build_api_routes() -> Router<AppState> {
    Router::new()
        // ===== Orders =====
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order_overview))
        .route("/orders/{id}/status", patch(orders::update_order_status))
        .route("/orders/{id}/history", get(communication::list_history))

        // ===== Quotations =====
        .route(
            "/orders/{id}/quotation",
            post(quotations::create_quotation).get(quotations::get_order_quotation),
        )
        .route("/quotations/{id}", patch(quotations::amend_quotation))

        // ===== Payments =====
        .route(
            "/quotations/{id}/payments",
            post(payments::record_payment).get(payments::list_payments),
        )
        .route("/quotations/{id}/balance", get(payments::get_balance))

        // ===== Communication =====
        .route("/quotations/{id}/send", post(communication::send_quotation))
        .route("/quotations/{id}/reminders", post(communication::send_reminder))
}
