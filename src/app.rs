use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::ai::{FallbackChain, GenerativeModel};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::{AccountDirectory, ConsoleStore, VerificationStore};
use crate::handlers::{functions, protected};
use crate::middleware::{jwt_auth_middleware, resolve_profile_middleware};
use crate::services::VerificationService;
use crate::sms::SmsGateway;

/// Handles shared by every request. Built once in `main` (or a test harness).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifications: Arc<dyn VerificationStore>,
    pub directory: Arc<dyn AccountDirectory>,
    pub console: Arc<dyn ConsoleStore>,
    pub model: Arc<dyn GenerativeModel>,
    pub chain: FallbackChain,
    pub sms: Arc<dyn SmsGateway>,
}

impl AppState {
    /// One store serving all three roles (Postgres or in-memory)
    pub fn new<S>(
        config: AppConfig,
        store: Arc<S>,
        model: Arc<dyn GenerativeModel>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self
    where
        S: VerificationStore + AccountDirectory + ConsoleStore + 'static,
    {
        let chain = FallbackChain::new(config.ai.models.clone());
        Self {
            config: Arc::new(config),
            verifications: store.clone(),
            directory: store.clone(),
            console: store,
            model,
            chain,
            sms,
        }
    }

    pub fn verification_service(&self) -> VerificationService {
        VerificationService::new(
            self.verifications.clone(),
            self.directory.clone(),
            self.sms.clone(),
            self.config.sms.clone(),
        )
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(function_routes())
        // Protected console API
        .merge(console_routes(state.clone()))
        // Global middleware, outermost first
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/functions/refine-prayers", post(functions::refine_prayers))
        .route("/functions/extract-members", post(functions::extract_members))
        .route("/functions/send-sms", post(functions::send_sms))
        .route("/functions/verify-sms", post(functions::verify_sms))
}

fn console_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/me", get(protected::me))
        .route("/api/stats", get(protected::stats))
        .route("/api/departments/:id/export", get(protected::department_export))
        .route("/api/notices", get(protected::notices))
        .route("/api/inquiries/unread-count", get(protected::unread_count))
        .route("/api/inquiries/unread-count/stream", get(protected::unread_count_stream))
        .route("/api/inquiries/:id/read", post(protected::mark_read))
        .route("/api/admin-requests", get(protected::admin_requests))
        .route("/api/admin-requests/:id", post(protected::decide_admin_request))
        // Layers run bottom-up: JWT first, then profile resolution
        .route_layer(from_fn_with_state(state.clone(), resolve_profile_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.permissive_cors {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Church Console API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "functions": "/functions/{refine-prayers,extract-members,send-sms,verify-sms}",
                "me": "/api/me (protected)",
                "stats": "/api/stats (protected)",
                "export": "/api/departments/:id/export (protected)",
                "notices": "/api/notices (protected)",
                "inquiries": "/api/inquiries/* (protected)",
                "admin_requests": "/api/admin-requests[/:id] (master only)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.console.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
