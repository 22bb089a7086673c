/// Task model and database operations
///
/// Tasks are the units of work inside a list. Each task carries both its
/// `list_id` and a denormalized `board_id` for fast board-scoped queries;
/// the invariant is that `board_id` always equals the board of the list the
/// task points to; moves never cross boards.
///
/// The sibling sort key is `position`, with the same duplicate-tolerant
/// semantics as lists.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     list_id UUID NOT NULL REFERENCES lists(id),
///     board_id UUID NOT NULL REFERENCES boards(id),
///     position INTEGER NOT NULL DEFAULT 0,
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_assignees (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::UserSummary;
use crate::ordering::Positioned;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Owning list
    pub list_id: Uuid,

    /// Owning board, always equal to the owning list's board
    pub board_id: Uuid,

    /// Sibling sort key within the list; not necessarily dense or unique
    pub position: i32,

    /// Workflow status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning list
    pub list_id: Uuid,

    /// Owning board (the list's board)
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Description (defaults to empty)
    pub description: String,

    /// Sibling sort key, computed by the ordering service
    pub position: i32,

    /// Initial status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a task; only non-None fields are written
///
/// Serialized as-is into the activity `details` payload. The outer Option
/// on `due_date` distinguishes "leave unchanged" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// New due date (Some(None) clears it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New sibling sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// A task with its assignees resolved
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    /// The task itself, flattened into the payload
    #[serde(flatten)]
    pub task: Task,

    /// Assignee set
    pub assignees: Vec<UserSummary>,
}

/// One assignee row of a board-wide assignee query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardAssigneeRow {
    /// Task carrying the assignment
    pub task_id: Uuid,

    /// Assignee user ID
    pub user_id: Uuid,

    /// Assignee name
    pub name: String,

    /// Assignee email
    pub email: String,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, list_id, board_id, position, status, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, list_id, board_id, position, status, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.list_id)
        .bind(data.board_id)
        .bind(data.position)
        .bind(data.status)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, list_id, board_id, position, status, due_date,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update; only non-None fields are written
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, list_id, board_id, position, \
             status, due_date, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(position) = data.position {
            q = q.bind(position);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a task within its current list: only the sort key changes
    pub async fn move_within(
        pool: &PgPool,
        id: Uuid,
        position: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET position = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, list_id, board_id, position, status, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(position)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task to another list of the same board
    ///
    /// The board reference is deliberately untouched; the caller has already
    /// verified the destination list belongs to the task's board.
    pub async fn move_to_list(
        pool: &PgPool,
        id: Uuid,
        list_id: Uuid,
        position: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET list_id = $2, position = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, list_id, board_id, position, status, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(list_id)
        .bind(position)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a list's tasks in sibling order
    pub async fn list_by_list(pool: &PgPool, list_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, list_id, board_id, position, status, due_date,
                   created_at, updated_at
            FROM tasks
            WHERE list_id = $1
            ORDER BY position ASC, created_at ASC, id ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists every task of a board in sibling order (grouped by the caller)
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, list_id, board_id, position, status, due_date,
                   created_at, updated_at
            FROM tasks
            WHERE board_id = $1
            ORDER BY position ASC, created_at ASC, id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes every task of a list, returning the number removed
    pub async fn delete_by_list(pool: &PgPool, list_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE list_id = $1")
            .bind(list_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every task of a board, returning the number removed
    ///
    /// First step of the explicit board delete cascade.
    pub async fn delete_by_board(pool: &PgPool, board_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Adds a user to the task's assignee set
    ///
    /// Returns true if the assignment was newly created, false if the user
    /// was already assigned (the insert is a no-op).
    pub async fn add_assignee(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a user from the task's assignee set
    ///
    /// Removing a non-assignee is a no-op; returns whether a row was removed.
    pub async fn remove_assignee(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignees WHERE task_id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a task's assignees
    pub async fn assignees(pool: &PgPool, task_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let assignees = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email
            FROM task_assignees a
            JOIN users u ON u.id = a.user_id
            WHERE a.task_id = $1
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(assignees)
    }

    /// Lists every assignee of every task on a board, for the full-board read
    pub async fn assignees_for_board(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<Vec<BoardAssigneeRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BoardAssigneeRow>(
            r#"
            SELECT a.task_id, u.id AS user_id, u.name, u.email
            FROM task_assignees a
            JOIN tasks t ON t.id = a.task_id
            JOIN users u ON u.id = a.user_id
            WHERE t.board_id = $1
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Checks whether a user is assigned to at least one task on a board
    ///
    /// This is the third leg of the board access check.
    pub async fn is_assigned_on_board(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM task_assignees a
                JOIN tasks t ON t.id = a.task_id
                WHERE t.board_id = $1 AND a.user_id = $2
            )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Loads a task together with its assignee set
    pub async fn with_assignees(pool: &PgPool, id: Uuid) -> Result<Option<TaskView>, sqlx::Error> {
        let Some(task) = Task::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let assignees = Task::assignees(pool, id).await?;

        Ok(Some(TaskView { task, assignees }))
    }
}

impl Positioned for Task {
    fn position(&self) -> i32 {
        self.position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn id(&self) -> Uuid {
        self.id
    }
}
