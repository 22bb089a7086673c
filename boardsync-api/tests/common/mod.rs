/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and migrations
/// - Test user creation and JWT token generation
/// - API client helpers
///
/// The tests that use this context require a live PostgreSQL behind
/// `DATABASE_URL` (plus `JWT_SECRET`), so they are marked `#[ignore]` and
/// run with `cargo test -- --ignored`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use boardsync_api::app::{build_router, AppState};
use boardsync_api::config::Config;
use boardsync_api::realtime::BoardRooms;
use boardsync_shared::auth::jwt::{create_token, Claims, TokenType};
use boardsync_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    /// The router's room registry, for subscribing to broadcasts in-process
    pub rooms: Arc<BoardRooms>,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and a seeded user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db, "Test User").await?;
        let jwt_token = token_for(&config, user.id)?;

        let state = AppState::new(db.clone(), config.clone());
        let rooms = state.rooms.clone();
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            rooms,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value for the seeded user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns authorization header value for any user
    pub fn auth_header_for(&self, user_id: Uuid) -> String {
        let token = token_for(&self.config, user_id).expect("token creation");
        format!("Bearer {}", token)
    }

    /// Sends a JSON request and returns (status, parsed body)
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        auth: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if !auth.is_empty() {
            builder = builder.header("authorization", auth);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.app.call(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Cleans up everything the test created under the seeded users
    ///
    /// Boards go through the same explicit cascade the API uses, then the
    /// user rows themselves.
    pub async fn cleanup(&self, extra_users: &[Uuid]) -> anyhow::Result<()> {
        use boardsync_shared::models::activity::Activity;
        use boardsync_shared::models::board::Board;
        use boardsync_shared::models::list::List;
        use boardsync_shared::models::task::Task;

        let boards: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM boards WHERE owner_id = $1")
                .bind(self.user.id)
                .fetch_all(&self.db)
                .await?;

        for (board_id,) in boards {
            Task::delete_by_board(&self.db, board_id).await?;
            List::delete_by_board(&self.db, board_id).await?;
            Activity::delete_by_board(&self.db, board_id).await?;
            Board::delete(&self.db, board_id).await?;
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        for user_id in extra_users {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        Ok(())
    }
}

/// Creates a user directly in the store
///
/// The password hash is a placeholder; these tests authenticate with a
/// minted JWT, never through the login endpoint.
pub async fn create_test_user(db: &PgPool, name: &str) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            name: name.to_string(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: "$argon2id$test".to_string(),
        },
    )
    .await?;

    Ok(user)
}

fn token_for(config: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, TokenType::Access);
    Ok(create_token(&claims, &config.jwt.secret)?)
}
