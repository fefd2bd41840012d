//! Poo Tracker Web Server
//!
//! Axum-based REST API for logging records and reading health analytics.
//!
//! Security features:
//! - API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, record ranges)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use poo_core::{AnalyticsConfig, AnalyticsService, Database};

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Header naming the user whose records are read or written
pub const USER_HEADER: &str = "x-user-id";

/// User assumed when no user header is sent
pub const DEFAULT_USER: &str = "local";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Paths reachable without authentication
const PUBLIC_PATHS: &[&str] = &["/api/health"];

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub analytics: AnalyticsService,
    pub config: ServerConfig,
}

/// Authentication middleware - validates the bearer API key
///
/// API keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth || PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        tracing::debug!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Parse a comma-separated list of API keys, skipping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// User id from the request headers, `local` when absent or blank
pub fn get_user_id(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USER)
        .to_string()
}

/// Create the application router
pub fn create_router(db: Database, analytics: AnalyticsConfig, config: ServerConfig) -> Router {
    let service = AnalyticsService::from_database(db.clone(), analytics);
    create_router_with_state(Arc::new(AppState {
        db,
        analytics: service,
        config,
    }))
}

/// Create the application router around prepared state (for testing)
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Analytics
        .route("/analytics/overview", get(handlers::get_overview))
        .route("/analytics/correlations", get(handlers::get_correlations))
        .route("/analytics/trends", get(handlers::get_trends))
        .route("/analytics/patterns", get(handlers::get_patterns))
        .route("/analytics/insights", get(handlers::get_insights))
        .route("/analytics/score", get(handlers::get_score))
        .route(
            "/analytics/recommendations",
            get(handlers::get_recommendations),
        )
        // Records
        .route(
            "/bowel-movements",
            get(handlers::list_bowel_movements).post(handlers::create_bowel_movement),
        )
        .route(
            "/meals",
            get(handlers::list_meals).post(handlers::create_meal),
        )
        .route(
            "/symptoms",
            get(handlers::list_symptoms).post(handlers::create_symptom),
        )
        .route(
            "/medications",
            get(handlers::list_medications).post(handlers::create_medication),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::HeaderName::from_static(USER_HEADER),
            ])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::HeaderName::from_static(USER_HEADER),
            ])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    analytics: AnalyticsConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("⚠️  Authentication required but no API keys configured (set POO_API_KEYS)");
    }

    let app = create_router(db, analytics, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn gateway_timeout(msg: &str) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error to its HTTP status
    ///
    /// Client mistakes keep their message; anything else is logged and
    /// answered with a generic 500.
    pub fn from_core(err: poo_core::Error) -> Self {
        match err {
            poo_core::Error::InvalidDateRange | poo_core::Error::Validation(_) => {
                Self::bad_request(&err.to_string())
            }
            poo_core::Error::Timeout(_) => Self::gateway_timeout(&err.to_string()),
            poo_core::Error::NotFound(_) => Self::not_found(&err.to_string()),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
