/// Task endpoints
///
/// # Endpoints
///
/// - `POST   /v1/lists/:list_id/tasks` - Create a task (appended at the tail)
/// - `PATCH  /v1/tasks/:id` - Patch task fields
/// - `DELETE /v1/tasks/:id` - Delete a task
/// - `POST   /v1/tasks/:task_id/move` - Move within or across lists
/// - `POST   /v1/tasks/:task_id/assign` - Add an assignee (owner only)
/// - `POST   /v1/tasks/:task_id/unassign` - Remove an assignee (owner only)

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
    access::{ensure_member, require_board_access, require_board_owner},
    auth::middleware::AuthContext,
    models::{
        activity::{ActivityAction, ActivityEntity, CreateActivity},
        list::List,
        task::{CreateTask, Task, TaskStatus, TaskView, UpdateTask},
        user::User,
    },
    ordering,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Task title is required"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (default: todo)
    pub status: Option<TaskStatus>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Task title cannot be empty"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New due date; an explicit null clears it, an absent field leaves it
    /// unchanged
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New sibling sort key
    pub position: Option<i32>,
}

/// Move task request
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    /// Destination list; may equal the current list
    pub target_list_id: Uuid,

    /// Destination sort key. Omitted: same-list moves keep the current
    /// key, cross-list moves insert at the head (0).
    pub position: Option<i32>,
}

/// Assign/unassign request
#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    /// The user being (un)assigned
    pub user_id: Uuid,
}

/// Distinguishes an absent field (None) from an explicit null (Some(None))
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Creates a task at the tail of a list
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate()?;

    let list = List::find_by_id(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, list.board_id).await?;

    let position = ordering::next_task_position(&state.db, list_id).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            list_id,
            board_id: list.board_id,
            title: req.title,
            description: req.description.unwrap_or_default(),
            position,
            status: req.status.unwrap_or_default(),
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, %list_id, position, "task created");

    record_activity(
        &state.db,
        CreateActivity {
            board_id: task.board_id,
            user_id: auth.user_id,
            action: ActivityAction::CreateTask,
            entity_type: ActivityEntity::Task,
            entity_id: task.id,
            details: json!({ "title": task.title }),
            previous_data: None,
        },
    )
    .await;

    let view = TaskView {
        task,
        assignees: Vec::new(),
    };

    state
        .rooms
        .notify(
            view.task.board_id,
            &BoardEvent::CreateTask { task: view.clone() },
        )
        .await;

    Ok(Json(view))
}

/// Patches task fields
///
/// Unlike board and list updates, the activity record carries a **full
/// previous-state snapshot** of the task in `previous_data`, alongside the
/// patch in `details`.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate()?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, task.board_id).await?;

    let previous_data = serde_json::to_value(&task).ok();

    let patch = UpdateTask {
        title: req.title,
        description: req.description,
        status: req.status,
        due_date: req.due_date,
        position: req.position,
    };
    let details = serde_json::to_value(&patch).unwrap_or_default();

    let updated = Task::update(&state.db, task_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    record_activity(
        &state.db,
        CreateActivity {
            board_id: updated.board_id,
            user_id: auth.user_id,
            action: ActivityAction::UpdateTask,
            entity_type: ActivityEntity::Task,
            entity_id: updated.id,
            details,
            previous_data,
        },
    )
    .await;

    let view = load_view(&state, task_id).await?;

    state
        .rooms
        .notify(
            view.task.board_id,
            &BoardEvent::UpdateTask { task: view.clone() },
        )
        .await;

    Ok(Json(view))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, task.board_id).await?;

    Task::delete(&state.db, task_id).await?;

    tracing::info!(%task_id, board_id = %task.board_id, "task deleted");

    record_activity(
        &state.db,
        CreateActivity {
            board_id: task.board_id,
            user_id: auth.user_id,
            action: ActivityAction::DeleteTask,
            entity_type: ActivityEntity::Task,
            entity_id: task.id,
            details: json!({ "title": task.title }),
            previous_data: None,
        },
    )
    .await;

    state
        .rooms
        .notify(
            task.board_id,
            &BoardEvent::DeleteTask {
                task_id: task.id,
                list_id: task.list_id,
            },
        )
        .await;

    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Moves a task within its list or to another list of the same board
///
/// Same-list moves only rewrite the sort key (default: unchanged).
/// Cross-list moves detach the task from its source list, attach it to the
/// destination, and default the sort key to 0 (head). The board reference
/// never changes; a destination list on another board is rejected.
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_board_access(&state.db, auth.user_id, task.board_id).await?;

    let (moved, details) = if req.target_list_id == task.list_id {
        let position = req.position.unwrap_or(task.position);

        let moved = Task::move_within(&state.db, task_id, position)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        let details = json!({ "list_id": req.target_list_id, "position": position });
        (moved, details)
    } else {
        let target = List::find_by_id(&state.db, req.target_list_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Target list not found".to_string()))?;

        if target.board_id != task.board_id {
            return Err(ApiError::BadRequest(
                "Cannot move a task to a list on another board".to_string(),
            ));
        }

        let position = req.position.unwrap_or(0);

        let moved = Task::move_to_list(&state.db, task_id, target.id, position)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        let details = json!({
            "from_list_id": task.list_id,
            "to_list_id": target.id,
            "position": position,
        });
        (moved, details)
    };

    tracing::info!(
        %task_id,
        from_list = %task.list_id,
        to_list = %moved.list_id,
        position = moved.position,
        "task moved"
    );

    record_activity(
        &state.db,
        CreateActivity {
            board_id: moved.board_id,
            user_id: auth.user_id,
            action: ActivityAction::MoveTask,
            entity_type: ActivityEntity::Task,
            entity_id: moved.id,
            details,
            previous_data: None,
        },
    )
    .await;

    let view = load_view(&state, task_id).await?;

    state
        .rooms
        .notify(
            view.task.board_id,
            &BoardEvent::MoveTask { task: view.clone() },
        )
        .await;

    Ok(Json(view))
}

/// Adds a user to a task's assignee set (board owner only)
///
/// Idempotent: assigning an existing assignee succeeds without a duplicate
/// entry or a second activity record. A newly reachable assignee is
/// promoted to board member so their access holds afterwards.
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let board = require_board_owner(&state.db, auth.user_id, task.board_id).await?;

    if User::find_by_id(&state.db, req.user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let newly_assigned = Task::add_assignee(&state.db, task_id, req.user_id).await?;

    if newly_assigned {
        tracing::info!(%task_id, assignee = %req.user_id, "task assigned");

        record_activity(
            &state.db,
            CreateActivity {
                board_id: task.board_id,
                user_id: auth.user_id,
                action: ActivityAction::AssignTask,
                entity_type: ActivityEntity::Task,
                entity_id: task.id,
                details: json!({ "assigned_user_id": req.user_id }),
                previous_data: None,
            },
        )
        .await;

        if let Err(error) = ensure_member(&state.db, &board, req.user_id).await {
            tracing::warn!(%error, board_id = %board.id, "failed to promote assignee to member");
        }
    }

    let view = load_view(&state, task_id).await?;

    state
        .rooms
        .notify(
            view.task.board_id,
            &BoardEvent::AssignTask { task: view.clone() },
        )
        .await;

    Ok(Json(view))
}

/// Removes a user from a task's assignee set (board owner only)
///
/// Removing a non-assignee is a successful no-op.
pub async fn unassign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    require_board_owner(&state.db, auth.user_id, task.board_id).await?;

    Task::remove_assignee(&state.db, task_id, req.user_id).await?;

    record_activity(
        &state.db,
        CreateActivity {
            board_id: task.board_id,
            user_id: auth.user_id,
            action: ActivityAction::UnassignTask,
            entity_type: ActivityEntity::Task,
            entity_id: task.id,
            details: json!({ "unassigned_user_id": req.user_id }),
            previous_data: None,
        },
    )
    .await;

    let view = load_view(&state, task_id).await?;

    state
        .rooms
        .notify(
            view.task.board_id,
            &BoardEvent::UnassignTask { task: view.clone() },
        )
        .await;

    Ok(Json(view))
}

/// Reloads a task with its assignee set for the response and the broadcast
async fn load_view(state: &AppState, task_id: Uuid) -> ApiResult<TaskView> {
    Task::with_assignees(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}
