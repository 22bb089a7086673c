/// Board activity feed
///
/// # Endpoint
///
/// ```text
/// GET /v1/boards/:board_id/activities?page=1&limit=20
/// ```
///
/// Returns the board's audit trail newest-first, with the acting user
/// resolved, plus pagination metadata.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use boardsync_shared::{
    access::require_board_access,
    auth::middleware::AuthContext,
    models::activity::{Activity, ActivityView},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feed query parameters
#[derive(Debug, Deserialize)]
pub struct ActivitiesQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,

    /// Page size (default 20, capped at 100)
    pub limit: Option<i64>,
}

/// One page of a board's activity feed
#[derive(Debug, Serialize)]
pub struct ActivityPage {
    /// Records on this page, newest first
    pub activities: Vec<ActivityView>,

    /// Total number of records on the board
    pub total: i64,

    /// 1-based page number
    pub page: i64,

    /// Total number of pages
    pub total_pages: i64,
}

/// Lists a board's activity records, newest first
pub async fn list_board_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<ActivitiesQuery>,
) -> ApiResult<Json<ActivityPage>> {
    require_board_access(&state.db, auth.user_id, board_id).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let activities = Activity::list_by_board(&state.db, board_id, limit, offset).await?;
    let total = Activity::count_by_board(&state.db, board_id).await?;

    Ok(Json(ActivityPage {
        activities,
        total,
        page,
        total_pages: (total + limit - 1) / limit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activities_query_defaults() {
        let query: ActivitiesQuery = serde_json::from_str("{}").unwrap();
        assert!(query.page.is_none());
        assert!(query.limit.is_none());

        // The handler normalization: page floors at 1, limit is capped.
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        assert_eq!(page, 1);
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let pages = |total: i64, limit: i64| (total + limit - 1) / limit;

        assert_eq!(pages(0, 20), 0);
        assert_eq!(pages(1, 20), 1);
        assert_eq!(pages(20, 20), 1);
        assert_eq!(pages(21, 20), 2);
    }
}
