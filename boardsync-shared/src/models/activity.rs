/// Activity model: the append-only audit trail
///
/// Every mutating operation appends exactly one activity record scoped to
/// the affected board, before the operation's response completes. Records
/// are immutable; the only deletion path is the board delete cascade.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE activity_action AS ENUM (
///     'create_board', 'update_board', 'delete_board',
///     'create_list', 'update_list', 'delete_list',
///     'create_task', 'update_task', 'delete_task',
///     'move_task', 'assign_task', 'unassign_task'
/// );
///
/// CREATE TYPE activity_entity AS ENUM ('board', 'list', 'task');
///
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     action activity_action NOT NULL,
///     entity_type activity_entity NOT NULL,
///     entity_id UUID NOT NULL,
///     details JSONB NOT NULL DEFAULT '{}',
///     previous_data JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserSummary;

/// The closed set of auditable actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Board created
    CreateBoard,

    /// Board fields patched
    UpdateBoard,

    /// Board deleted (present in the closed set; the cascade removes the
    /// trail, so no record of this kind is ever observed)
    DeleteBoard,

    /// List created
    CreateList,

    /// List fields patched
    UpdateList,

    /// List deleted
    DeleteList,

    /// Task created
    CreateTask,

    /// Task fields patched
    UpdateTask,

    /// Task deleted
    DeleteTask,

    /// Task moved within or across lists
    MoveTask,

    /// User added to a task's assignee set
    AssignTask,

    /// User removed from a task's assignee set
    UnassignTask,
}

impl ActivityAction {
    /// Converts the action to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::CreateBoard => "create_board",
            ActivityAction::UpdateBoard => "update_board",
            ActivityAction::DeleteBoard => "delete_board",
            ActivityAction::CreateList => "create_list",
            ActivityAction::UpdateList => "update_list",
            ActivityAction::DeleteList => "delete_list",
            ActivityAction::CreateTask => "create_task",
            ActivityAction::UpdateTask => "update_task",
            ActivityAction::DeleteTask => "delete_task",
            ActivityAction::MoveTask => "move_task",
            ActivityAction::AssignTask => "assign_task",
            ActivityAction::UnassignTask => "unassign_task",
        }
    }
}

/// The kind of entity an activity record targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_entity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityEntity {
    /// A board
    Board,

    /// A list
    List,

    /// A task
    Task,
}

/// Activity record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique record ID
    pub id: Uuid,

    /// Board the mutation happened on
    pub board_id: Uuid,

    /// Acting user
    pub user_id: Uuid,

    /// What happened
    pub action: ActivityAction,

    /// Kind of the target entity
    pub entity_type: ActivityEntity,

    /// Target entity ID
    pub entity_id: Uuid,

    /// Free-form payload; for updates, the patch verbatim
    pub details: JsonValue,

    /// Full previous-state snapshot (task updates only)
    pub previous_data: Option<JsonValue>,

    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity record
#[derive(Debug, Clone)]
pub struct CreateActivity {
    /// Board the mutation happened on
    pub board_id: Uuid,

    /// Acting user
    pub user_id: Uuid,

    /// What happened
    pub action: ActivityAction,

    /// Kind of the target entity
    pub entity_type: ActivityEntity,

    /// Target entity ID
    pub entity_id: Uuid,

    /// Free-form payload
    pub details: JsonValue,

    /// Previous-state snapshot, when the action records one
    pub previous_data: Option<JsonValue>,
}

/// An activity record with the acting user resolved
#[derive(Debug, Serialize)]
pub struct ActivityView {
    /// Record ID
    pub id: Uuid,

    /// Board the mutation happened on
    pub board_id: Uuid,

    /// Acting user
    pub user: UserSummary,

    /// What happened
    pub action: ActivityAction,

    /// Kind of the target entity
    pub entity_type: ActivityEntity,

    /// Target entity ID
    pub entity_id: Uuid,

    /// Free-form payload
    pub details: JsonValue,

    /// Previous-state snapshot, if any
    pub previous_data: Option<JsonValue>,

    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityViewRow {
    id: Uuid,
    board_id: Uuid,
    user_id: Uuid,
    action: ActivityAction,
    entity_type: ActivityEntity,
    entity_id: Uuid,
    details: JsonValue,
    previous_data: Option<JsonValue>,
    created_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
}

impl Activity {
    /// Appends one record to the trail
    pub async fn record(pool: &PgPool, data: CreateActivity) -> Result<Self, sqlx::Error> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (board_id, user_id, action, entity_type, entity_id,
                                    details, previous_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, board_id, user_id, action, entity_type, entity_id,
                      details, previous_data, created_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.entity_type)
        .bind(data.entity_id)
        .bind(data.details)
        .bind(data.previous_data)
        .fetch_one(pool)
        .await?;

        Ok(activity)
    }

    /// Lists a board's trail newest-first, with the acting user joined in
    pub async fn list_by_board(
        pool: &PgPool,
        board_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ActivityViewRow>(
            r#"
            SELECT a.id, a.board_id, a.user_id, a.action, a.entity_type, a.entity_id,
                   a.details, a.previous_data, a.created_at,
                   u.name AS user_name, u.email AS user_email
            FROM activities a
            JOIN users u ON u.id = a.user_id
            WHERE a.board_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(board_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let views = rows
            .into_iter()
            .map(|row| ActivityView {
                id: row.id,
                board_id: row.board_id,
                user: UserSummary {
                    id: row.user_id,
                    name: row.user_name,
                    email: row.user_email,
                },
                action: row.action,
                entity_type: row.entity_type,
                entity_id: row.entity_id,
                details: row.details,
                previous_data: row.previous_data,
                created_at: row.created_at,
            })
            .collect();

        Ok(views)
    }

    /// Counts a board's trail
    pub async fn count_by_board(pool: &PgPool, board_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a board's trail, returning the number removed
    ///
    /// The only deletion path; part of the explicit board delete cascade.
    pub async fn delete_by_board(pool: &PgPool, board_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE board_id = $1")
            .bind(board_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_action_as_str() {
        assert_eq!(ActivityAction::CreateBoard.as_str(), "create_board");
        assert_eq!(ActivityAction::MoveTask.as_str(), "move_task");
        assert_eq!(ActivityAction::UnassignTask.as_str(), "unassign_task");
    }

    #[test]
    fn test_activity_action_serde_matches_as_str() {
        let actions = [
            ActivityAction::CreateBoard,
            ActivityAction::UpdateBoard,
            ActivityAction::DeleteBoard,
            ActivityAction::CreateList,
            ActivityAction::UpdateList,
            ActivityAction::DeleteList,
            ActivityAction::CreateTask,
            ActivityAction::UpdateTask,
            ActivityAction::DeleteTask,
            ActivityAction::MoveTask,
            ActivityAction::AssignTask,
            ActivityAction::UnassignTask,
        ];

        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_activity_entity_serde() {
        assert_eq!(
            serde_json::to_string(&ActivityEntity::Board).unwrap(),
            "\"board\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityEntity::List).unwrap(),
            "\"list\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityEntity::Task).unwrap(),
            "\"task\""
        );
    }
}
