/// List endpoints
///
/// # Endpoints
///
/// - `POST   /v1/boards/:board_id/lists` - Create a list (appended at the tail)
/// - `PATCH  /v1/lists/:id` - Patch list fields (including `position`)
/// - `DELETE /v1/lists/:id` - Delete a list and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    realtime::BoardEvent,
    routes::{record_activity, MessageResponse},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use boardsync_shared::{
    access::require_board_access,
    auth::middleware::AuthContext,
    models::{
        activity::{ActivityAction, ActivityEntity, CreateActivity},
        list::{CreateList, List, UpdateList},
        task::Task,
    },
    ordering,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Create list request
///
/// A missing or blank title falls back to "New List" rather than failing;
/// columns are usually named after creation.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    /// List title
    pub title: Option<String>,
}

/// Update list request; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    /// New title
    pub title: Option<String>,

    /// New sibling sort key (how lists are reordered)
    pub position: Option<i32>,
}

/// Creates a list at the tail of a board
pub async fn create_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<Json<List>> {
    require_board_access(&state.db, auth.user_id, board_id).await?;

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "New List".to_string());

    let position = ordering::next_list_position(&state.db, board_id).await?;

    let list = List::create(
        &state.db,
        CreateList {
            board_id,
            title,
            position,
        },
    )
    .await?;

    tracing::info!(list_id = %list.id, %board_id, position, "list created");

    record_activity(
        &state.db,
        CreateActivity {
            board_id,
            user_id: auth.user_id,
            action: ActivityAction::CreateList,
            entity_type: ActivityEntity::List,
            entity_id: list.id,
            details: json!({ "title": list.title }),
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(board_id, &BoardEvent::CreateList { list: list.clone() })
        .await;

    Ok(Json(list))
}

/// Patches list fields
///
/// Board access is derived from the list itself; the activity record logs
/// the patch payload verbatim.
pub async fn update_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<UpdateListRequest>,
) -> ApiResult<Json<List>> {
    let list = List::find_by_id(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, list.board_id).await?;

    let patch = UpdateList {
        title: req.title,
        position: req.position,
    };
    let details = serde_json::to_value(&patch).unwrap_or_default();

    let list = List::update(&state.db, list_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    record_activity(
        &state.db,
        CreateActivity {
            board_id: list.board_id,
            user_id: auth.user_id,
            action: ActivityAction::UpdateList,
            entity_type: ActivityEntity::List,
            entity_id: list.id,
            details,
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(list.board_id, &BoardEvent::UpdateList { list: list.clone() })
        .await;

    Ok(Json(list))
}

/// Deletes a list and its tasks
///
/// Ordered cascade: tasks first, then the list row.
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let list = List::find_by_id(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, list.board_id).await?;

    let tasks = Task::delete_by_list(&state.db, list_id).await?;
    List::delete(&state.db, list_id).await?;

    tracing::info!(%list_id, board_id = %list.board_id, tasks, "list deleted");

    record_activity(
        &state.db,
        CreateActivity {
            board_id: list.board_id,
            user_id: auth.user_id,
            action: ActivityAction::DeleteList,
            entity_type: ActivityEntity::List,
            entity_id: list.id,
            details: json!({ "title": list.title }),
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(list.board_id, &BoardEvent::DeleteList { list_id: list.id })
        .await;

    Ok(Json(MessageResponse::new("List deleted")))
}
