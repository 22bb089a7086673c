/// Board endpoints
///
/// # Endpoints
///
/// - `POST   /v1/boards` - Create a board (acting user becomes owner)
/// - `GET    /v1/boards` - List accessible boards, paginated + searchable
/// - `GET    /v1/boards/:id` - Full board read (lists, tasks, assignees)
/// - `PATCH  /v1/boards/:id` - Patch board fields
/// - `DELETE /v1/boards/:id` - Delete a board and everything under it

use crate::{
    app::AppState,
    error::ApiResult,
    realtime::BoardEvent,
    routes::{record_activity, MessageResponse},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use boardsync_shared::{
    access::require_board_access,
    auth::middleware::AuthContext,
    models::{
        activity::{Activity, ActivityAction, ActivityEntity, CreateActivity},
        board::{Board, BoardDetail, BoardPage, CreateBoard, UpdateBoard},
        list::List,
        task::Task,
    },
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 255, message = "Board title is required"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,
}

/// Update board request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Board title cannot be empty"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListBoardsQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,

    /// Page size (default 10, capped at 50)
    pub limit: Option<i64>,

    /// Title/description substring filter
    pub search: Option<String>,
}

/// Creates a board owned by the acting user
///
/// The owner always comes from the authenticated identity; any owner field
/// in the payload is ignored by construction.
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate()?;

    let board = Board::create(
        &state.db,
        auth.user_id,
        CreateBoard {
            title: req.title,
            description: req.description.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, user_id = %auth.user_id, "board created");

    record_activity(
        &state.db,
        CreateActivity {
            board_id: board.id,
            user_id: auth.user_id,
            action: ActivityAction::CreateBoard,
            entity_type: ActivityEntity::Board,
            entity_id: board.id,
            details: json!({ "title": board.title }),
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(board.id, &BoardEvent::CreateBoard {
            board: board.clone(),
        })
        .await;

    Ok(Json(board))
}

/// Lists boards the acting user can access
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListBoardsQuery>,
) -> ApiResult<Json<BoardPage>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let offset = (page - 1) * limit;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let boards = Board::list_accessible(&state.db, auth.user_id, search, limit, offset).await?;
    let total = Board::count_accessible(&state.db, auth.user_id, search).await?;

    Ok(Json(BoardPage {
        boards,
        total,
        page,
        total_pages: (total + limit - 1) / limit,
    }))
}

/// Returns the full board read: owner, members, lists, tasks, assignees
///
/// This is the payload clients refetch after every invalidation event.
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    require_board_access(&state.db, auth.user_id, board_id).await?;

    let detail = BoardDetail::load(&state.db, board_id)
        .await?
        .ok_or_else(|| crate::error::ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(detail))
}

/// Patches board fields
///
/// The activity record logs the patch payload verbatim as `details`; board
/// updates do not snapshot previous state (task updates do).
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate()?;

    require_board_access(&state.db, auth.user_id, board_id).await?;

    let patch = UpdateBoard {
        title: req.title,
        description: req.description,
    };
    let details = serde_json::to_value(&patch).unwrap_or_default();

    let board = Board::update(&state.db, board_id, patch)
        .await?
        .ok_or_else(|| crate::error::ApiError::NotFound("Board not found".to_string()))?;

    record_activity(
        &state.db,
        CreateActivity {
            board_id: board.id,
            user_id: auth.user_id,
            action: ActivityAction::UpdateBoard,
            entity_type: ActivityEntity::Board,
            entity_id: board.id,
            details,
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(board.id, &BoardEvent::UpdateBoard {
            board: board.clone(),
        })
        .await;

    Ok(Json(board))
}

/// Deletes a board and everything scoped to it
///
/// Explicit ordered cascade without a transaction, children first: tasks,
/// lists, activities, then the board row (members cascade with it). A crash
/// mid-sequence can leave orphaned children for a sweep to collect.
/// Deletion neither broadcasts (subscribers lose the room) nor logs an
/// activity (the trail goes with the board).
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_board_access(&state.db, auth.user_id, board_id).await?;

    let tasks = Task::delete_by_board(&state.db, board_id).await?;
    let lists = List::delete_by_board(&state.db, board_id).await?;
    let activities = Activity::delete_by_board(&state.db, board_id).await?;
    Board::delete(&state.db, board_id).await?;

    tracing::info!(
        %board_id,
        user_id = %auth.user_id,
        tasks,
        lists,
        activities,
        "board deleted"
    );

    Ok(Json(MessageResponse::new("Board deleted")))
}
