//! Lince Web Server
//!
//! Axum-based REST API for the Lince Track back office.
//!
//! Security features:
//! - Access-proxy header or API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Full audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use lince_core::{CompanyProfile, Database};

mod handlers;

/// Maximum number of audit entries returned at once
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Access proxy header carrying the authenticated user email
const CF_ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as `Authorization: Bearer <key>`
    pub api_keys: Vec<String>,
    /// Company profile TOML (falls back to LINCE_COMPANY_CONFIG and defaults)
    pub company_profile: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            company_profile: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Issuer data printed on documents and reminder messages
    pub company: CompanyProfile,
}

/// Authentication middleware - accepts the access-proxy user header or an API key
///
/// # Security Notes
///
/// **Access proxy header**: `CF-Access-Authenticated-User-Email` is trusted as set by the
/// proxy in front of the server. It can be spoofed if the server is exposed directly.
///
/// **API keys**: Compared using constant-time comparison to prevent timing attacks.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let proxy_user = request
        .headers()
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(email) = proxy_user {
        info!(user = %email, path = %request.uri().path(), "Authenticated via access proxy header");
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
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
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

    for key in valid_keys {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && provided_bytes.ct_eq(key_bytes).into() {
            return true;
        }
    }
    false
}

/// Parse a comma-separated list of API keys, ignoring blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Extract user email from request headers (for audit logging)
/// Returns the proxy user, "api-key" for API key auth, or "local-dev" for unauthenticated
pub fn get_user_email(headers: &axum::http::HeaderMap) -> String {
    if let Some(email) = headers
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
    {
        return email.to_string();
    }

    if headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .is_some()
    {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router, loading the configured company profile
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let company = match CompanyProfile::load(config.company_profile.as_deref()) {
        Ok(company) => company,
        Err(e) => {
            warn!(error = %e, "Failed to load company profile, using defaults");
            CompanyProfile::default()
        }
    };
    create_router_with_company(db, static_dir, config, company)
}

/// Create the application router with an explicit company profile
pub fn create_router_with_company(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    company: CompanyProfile,
) -> Router {
    info!(company = %company.name, "Serving documents for company");

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        company,
    });

    let api_routes = Router::new()
        // Health and dashboard
        .route("/health", get(handlers::health))
        .route("/dashboard", get(handlers::get_dashboard))
        // Customers
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/customers/birthdays", get(handlers::list_birthdays))
        .route(
            "/customers/:id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/customers/:id/toggle-active",
            post(handlers::toggle_customer_active),
        )
        .route(
            "/customers/:id/vehicles",
            get(handlers::list_vehicles).post(handlers::add_vehicle),
        )
        // Vehicles
        .route(
            "/vehicles/:id",
            axum::routing::put(handlers::update_vehicle).delete(handlers::delete_vehicle),
        )
        // Invoices
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/invoices/generate", post(handlers::generate_invoices))
        .route(
            "/invoices/:id",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice),
        )
        .route(
            "/invoices/:id/toggle-status",
            post(handlers::toggle_invoice_status),
        )
        .route("/invoices/:id/whatsapp", post(handlers::send_whatsapp_reminder))
        .route("/invoices/:id/document", get(handlers::invoice_document))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/categories", get(handlers::list_expense_categories))
        .route("/expenses/document", get(handlers::expense_list_document))
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        .route(
            "/expenses/:id/toggle-status",
            post(handlers::toggle_expense_status),
        )
        // Commercial proposals
        .route(
            "/proposals",
            get(handlers::list_proposals).post(handlers::create_proposal),
        )
        .route("/proposals/stats", get(handlers::get_proposal_stats))
        .route(
            "/proposals/:id",
            get(handlers::get_proposal)
                .put(handlers::update_proposal)
                .delete(handlers::delete_proposal),
        )
        .route("/proposals/:id/status", post(handlers::set_proposal_status))
        .route("/proposals/:id/document", get(handlers::proposal_document))
        // Reports
        .route("/reports/invoices", get(handlers::report_invoices))
        .route("/reports/expenses", get(handlers::report_expenses))
        .route("/reports/financial", get(handlers::report_financial))
        .route("/reports/customers", get(handlers::report_customers))
        // Export
        .route("/export/invoices", get(handlers::export_invoices))
        .route("/export/expenses", get(handlers::export_expenses))
        // Audit log
        .route("/audit", get(handlers::list_audit_log));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Printable documents carry inline styles
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
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
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(db, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        info!("No API keys configured; only access-proxy authenticated requests will be accepted");
    }

    // Mark stale expenses before the first request sees them
    match db.refresh_overdue_expenses(chrono::Local::now().date_naive()) {
        Ok(count) if count > 0 => info!("Marked {} expense(s) overdue", count),
        Ok(_) => {}
        Err(e) => warn!("Failed to refresh overdue expenses: {}", e),
    }

    let app = create_router(db, static_dir, config);
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

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }
}

/// Map a core error to the matching HTTP status
///
/// Validation, missing records and conflicts keep their message; storage
/// failures become 503 and anything else a generic 500.
pub fn core_error(err: lince_core::Error) -> AppError {
    use lince_core::Error;

    match err {
        Error::InvalidData(msg) => AppError::bad_request(&msg),
        Error::NotFound(what) => AppError::not_found(&format!("{} not found", what)),
        Error::Conflict(msg) => AppError::conflict(&msg),
        Error::Pool(e) => {
            error!(error = %e, "Database pool unavailable");
            AppError::unavailable("Database unavailable")
        }
        other => other.into(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
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
