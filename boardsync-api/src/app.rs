/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use boardsync_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = boardsync_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::realtime::rooms::BoardRooms;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use boardsync_shared::auth::{jwt, middleware as auth_middleware, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the room
/// registry is behind an Arc so every clone notifies the same subscribers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Per-board subscriber registry for realtime notifications
    pub rooms: Arc<BoardRooms>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            rooms: Arc::new(BoardRooms::new()),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /ws                            # Realtime endpoint (token in query)
/// └── /v1/                           # API v1
///     ├── /auth/
///     │   ├── POST /register         # (public)
///     │   ├── POST /login            # (public)
///     │   ├── POST /refresh          # (public)
///     │   └── GET  /me               # (authenticated)
///     ├── /users/GET /search         # (authenticated)
///     ├── /boards/                   # (authenticated)
///     │   ├── POST / , GET /
///     │   ├── GET|PATCH|DELETE /:id
///     │   ├── POST /:board_id/lists
///     │   └── GET  /:board_id/activities
///     ├── /lists/                    # (authenticated)
///     │   ├── PATCH|DELETE /:id
///     │   └── POST /:list_id/tasks
///     └── /tasks/                    # (authenticated)
///         ├── PATCH|DELETE /:id
///         └── POST /:task_id/move|assign|unassign
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::realtime::socket;
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login/refresh are public, /me needs a token
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    // User search (authenticated)
    let user_routes = Router::new()
        .route("/search", get(routes::users::search_users))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Board operations, board-scoped list creation and the activity feed
    let board_routes = Router::new()
        .route("/", post(routes::boards::create_board))
        .route("/", get(routes::boards::list_boards))
        .route("/:id", get(routes::boards::get_board))
        .route("/:id", patch(routes::boards::update_board))
        .route("/:id", delete(routes::boards::delete_board))
        .route("/:board_id/lists", post(routes::lists::create_list))
        .route(
            "/:board_id/activities",
            get(routes::activities::list_board_activities),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // List operations and list-scoped task creation
    let list_routes = Router::new()
        .route("/:id", patch(routes::lists::update_list))
        .route("/:id", delete(routes::lists::delete_list))
        .route("/:list_id/tasks", post(routes::tasks::create_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Task operations
    let task_routes = Router::new()
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:task_id/move", post(routes::tasks::move_task))
        .route("/:task_id/assign", post(routes::tasks::assign_task))
        .route("/:task_id/unassign", post(routes::tasks::unassign_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/boards", board_routes)
        .nest("/lists", list_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .route("/ws", get(socket::ws_handler))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token, then injects an [`AuthContext`]
/// into request extensions for the handlers downstream.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = auth_middleware::bearer_token(req.headers())?.to_string();

    let claims = jwt::validate_access_token(&token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::new(claims.sub));

    Ok(next.run(req).await)
}
