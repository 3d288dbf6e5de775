use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::ServiceRepository;
use crate::error::ApiError;
use crate::handlers::{health, services};
use crate::middleware::{jwt_auth_middleware, require_permission_middleware};

/// Shared handler state. Cloned per request; both fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceRepository,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(services: ServiceRepository, config: AppConfig) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/v1/services",
            get(services::list)
                .post(services::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/v1/services/:id",
            get(services::show)
                .patch(services::update)
                .delete(services::delete)
                .fallback(method_not_allowed),
        )
        // Last added runs first: authenticate, then check permissions
        .route_layer(middleware::from_fn(require_permission_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let cors = cors_layer(&state.config.security);

    Router::new()
        .route(
            "/v1/healthcheck",
            get(health::healthcheck).fallback(method_not_allowed),
        )
        .merge(protected)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors),
        )
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal_server_error().into_response()
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
