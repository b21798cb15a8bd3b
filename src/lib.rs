use axum::{
    Router,
    http::{HeaderName, Method, header},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregated by access level (Public, Permission-gated).
pub mod routes;
use routes::{protected, public};

// --- Public Re-exports ---

pub use auth::{AccessGuard, KeySource, RemoteKeySource, StaticKeySource};
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{DrinkRepository, InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the drinks API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_drinks, handlers::get_drinks_detail, handlers::create_drink,
        handlers::update_drink, handlers::delete_drink
    ),
    components(
        schemas(
            models::Ingredient, models::IngredientShort, models::DrinkShort, models::DrinkLong,
            models::RecipeInput, models::CreateDrinkRequest, models::UpdateDrinkRequest,
            models::DrinkListResponse, models::DrinkDetailResponse, models::DrinkCreatedResponse,
            models::DrinkDeletedResponse, models::ErrorResponse,
        )
    ),
    tags(
        (name = "drinks", description = "Coffee shop drinks menu API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single application context built at startup and shared by every request.
/// Nothing in it is mutated after construction.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: drink persistence.
    pub repo: RepositoryState,
    /// Access Guard: token verification and permission checks.
    pub guard: AccessGuard,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

/// create_router
///
/// Assembles the routing structure, the permission gates, the error fallbacks and
/// the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: browser clients send a bearer token and JSON bodies.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Routes. The 405 fallback is installed after every route is merged so it
    // reaches all of them.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(protected::protected_routes(state.guard.clone()))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state);

    // 3. Request id, tracing span and id propagation.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of one request carries its
/// `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
