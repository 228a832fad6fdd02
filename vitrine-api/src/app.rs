//! Application state and router builder
//!
//! ```no_run
//! use vitrine_api::{app::{build_router, AppState}, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let app = build_router(AppState::new(pool, config));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, patch, post, put},
    Extension, Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use vitrine_shared::auth::{
    authorization::require_admin,
    middleware::{authenticate, AuthContext},
};

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                  public
/// /auth/{register,login,refresh}           public
/// /public/landpages/:digital_name[/leads]  public
/// /user/...  /landpages/...  /landpage/... bearer token
/// /admin/...                               bearer token, admin role
/// /uploads/*                               uploaded photos, static
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{
        access, auth, health, landpages, leads, orders, products, public, trainings, users,
    };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/public/landpages/:digital_name", get(public::get_page))
        .route("/public/landpages/:digital_name/leads", post(public::capture_lead));

    let user_routes = Router::new()
        .route("/user/profile", get(users::get_profile).put(users::update_profile))
        .route("/user/access/:product_type", get(access::check_access))
        .route("/user/products/available", get(products::list_available))
        .route("/user/products/my-products", get(products::list_mine))
        .route("/user/products/:id", get(products::get_product))
        .route("/user/orders", get(orders::list_mine).post(orders::create_order))
        .route("/user/trainings/in-progress", get(trainings::list_in_progress))
        .route("/user/trainings/locked", get(trainings::list_locked))
        .route("/user/trainings/available", get(trainings::list_available))
        .route("/user/trainings/:id", get(trainings::get_training))
        .route("/user/lessons/:id/complete", post(trainings::complete_lesson))
        .route("/landpages", get(landpages::list_pages).post(landpages::create_page))
        .route("/landpages/templates/:objective", get(landpages::list_templates))
        .route(
            "/landpages/:id/config",
            get(landpages::get_config).put(landpages::update_config),
        )
        .route(
            "/landpages/upload-photo",
            post(landpages::upload_photo)
                .layer(DefaultBodyLimit::max(state.config.uploads.max_bytes + 64 * 1024)),
        )
        .route("/landpage/leads", get(leads::list_leads))
        .route("/landpage/leads/export", get(leads::export_leads))
        .route("/landpage/products", get(products::list_landpage_products))
        .route("/landpage/orders", post(orders::create_landpage_order))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let admin_routes = Router::new()
        .route("/admin/users", get(users::list_users))
        .route(
            "/admin/products",
            get(products::admin_list).post(products::admin_create),
        )
        .route(
            "/admin/products/:id",
            put(products::admin_update).delete(products::admin_delete),
        )
        .route(
            "/admin/trainings",
            get(trainings::admin_list).post(trainings::admin_create),
        )
        .route(
            "/admin/trainings/:id",
            put(trainings::admin_update).delete(trainings::admin_delete),
        )
        .route("/admin/trainings/:id/status", patch(trainings::update_status))
        .route("/admin/trainings/:id/modules", post(trainings::create_module))
        .route("/admin/modules/:id/lessons", post(trainings::create_lesson))
        .route("/admin/orders", get(orders::admin_list))
        .route("/admin/orders/:id/status", patch(orders::update_status))
        .route_layer(from_fn(admin_only_layer))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Validates the bearer token and injects [`AuthContext`] into the request
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Rejects non-admin principals; must run inside `jwt_auth_layer`
async fn admin_only_layer(
    Extension(auth): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_admin(&auth)?;
    Ok(next.run(req).await)
}
