/// User search endpoint
///
/// Backs the assignment picker: case-insensitive substring search over
/// names and emails, never returning the caller themselves.
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/search?q=ada&limit=10
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use boardsync_shared::auth::middleware::AuthContext;
use boardsync_shared::models::user::{User, UserSummary};
use serde::{Deserialize, Serialize};

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against names and emails
    pub q: Option<String>,

    /// Maximum number of results (default 10, capped at 50)
    pub limit: Option<i64>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matching users
    pub users: Vec<UserSummary>,
}

/// Searches users by name or email
///
/// A blank query returns an empty list rather than everyone.
pub async fn search_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Ok(Json(SearchResponse { users: Vec::new() }));
    }

    let limit = query.limit.unwrap_or(10).clamp(1, 50);

    let users = User::search(&state.db, q, auth.user_id, limit).await?;

    Ok(Json(SearchResponse { users }))
}
