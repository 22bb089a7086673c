/// Board model, member set, and the full-board read join
///
/// A board is the top-level shared workspace. Its member set lives in the
/// `board_members` join table (primary-keyed pair, so membership is a set),
/// and its lists are the rows of `lists` carrying the board's id, ordered by
/// `(position, created_at, id)`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::list::{List, ListDetail};
use crate::models::task::{Task, TaskView};
use crate::models::user::{User, UserSummary};

/// Board record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// The creating user; implicitly always authorized
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Description (defaults to empty)
    pub description: String,
}

/// Partial update of a board; only non-None fields are written
///
/// Serialized as-is into the activity `details` payload, so absent fields
/// are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of the accessible-boards listing
#[derive(Debug, Serialize)]
pub struct BoardPage {
    /// Boards on this page, most recently updated first
    pub boards: Vec<Board>,

    /// Total number of accessible boards matching the search
    pub total: i64,

    /// 1-based page number
    pub page: i64,

    /// Total number of pages
    pub total_pages: i64,
}

/// Full board read: the payload clients refetch after every
/// invalidation event, resolving Board → Lists → Tasks → Assignees
#[derive(Debug, Serialize)]
pub struct BoardDetail {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Description
    pub description: String,

    /// Board owner
    pub owner: UserSummary,

    /// Current member set
    pub members: Vec<UserSummary>,

    /// Lists in sibling order, each with its tasks in sibling order
    pub lists: Vec<ListDetail>,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a new board owned by `owner_id`
    ///
    /// The owner is taken from the authenticated caller, never from the
    /// request payload.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        data: CreateBoard,
    ) -> Result<Self, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, description, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Applies a partial update; only non-None fields are written
    ///
    /// Returns the updated board, or None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE boards SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, owner_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Board>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let board = q.fetch_optional(pool).await?;

        Ok(board)
    }

    /// Deletes a board row
    ///
    /// Children (tasks, lists, activities) must already be gone; deletion is
    /// an explicit ordered sequence, children first. The member set cascades
    /// with the row.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a user to the board's member set (idempotent)
    pub async fn add_member(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Checks whether a user is in the board's member set
    pub async fn is_member(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the board's member set
    pub async fn members(pool: &PgPool, board_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email
            FROM board_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.board_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists boards the user can access (owner, member, or assignee),
    /// newest activity first, with optional title/description search
    pub async fn list_accessible(
        pool: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT b.id, b.title, b.description, b.owner_id, b.created_at, b.updated_at
            FROM boards b
            WHERE (b.owner_id = $1
                OR EXISTS (SELECT 1 FROM board_members m
                           WHERE m.board_id = b.id AND m.user_id = $1)
                OR EXISTS (SELECT 1 FROM tasks t
                           JOIN task_assignees a ON a.task_id = t.id
                           WHERE t.board_id = b.id AND a.user_id = $1))
              AND ($2::text IS NULL OR b.title ILIKE $2 OR b.description ILIKE $2)
            ORDER BY b.updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Counts boards the user can access, with the same search filter
    pub async fn count_accessible(
        pool: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM boards b
            WHERE (b.owner_id = $1
                OR EXISTS (SELECT 1 FROM board_members m
                           WHERE m.board_id = b.id AND m.user_id = $1)
                OR EXISTS (SELECT 1 FROM tasks t
                           JOIN task_assignees a ON a.task_id = t.id
                           WHERE t.board_id = b.id AND a.user_id = $1))
              AND ($2::text IS NULL OR b.title ILIKE $2 OR b.description ILIKE $2)
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

impl BoardDetail {
    /// Loads the full board read: owner, members, lists with their tasks and
    /// each task's assignees
    ///
    /// This is the read-side join served after every invalidation
    /// notification. A reader racing a writer may observe a partially
    /// updated board; clients tolerate this by refetching on the next event.
    pub async fn load(pool: &PgPool, board_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let Some(board) = Board::find_by_id(pool, board_id).await? else {
            return Ok(None);
        };

        let owner = User::find_by_id(pool, board.owner_id)
            .await?
            .map(UserSummary::from)
            .ok_or(sqlx::Error::RowNotFound)?;

        let members = Board::members(pool, board_id).await?;
        let lists = List::list_by_board(pool, board_id).await?;
        let tasks = Task::list_by_board(pool, board_id).await?;
        let assignee_rows = Task::assignees_for_board(pool, board_id).await?;

        let mut assignees_by_task: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        for row in assignee_rows {
            assignees_by_task
                .entry(row.task_id)
                .or_default()
                .push(UserSummary {
                    id: row.user_id,
                    name: row.name,
                    email: row.email,
                });
        }

        let mut tasks_by_list: HashMap<Uuid, Vec<TaskView>> = HashMap::new();
        for task in tasks {
            let assignees = assignees_by_task.remove(&task.id).unwrap_or_default();
            tasks_by_list
                .entry(task.list_id)
                .or_default()
                .push(TaskView { task, assignees });
        }

        let lists = lists
            .into_iter()
            .map(|list| {
                let tasks = tasks_by_list.remove(&list.id).unwrap_or_default();
                ListDetail { list, tasks }
            })
            .collect();

        Ok(Some(Self {
            id: board.id,
            title: board.title,
            description: board.description,
            owner,
            members,
            lists,
            created_at: board.created_at,
            updated_at: board.updated_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_board_default_is_empty_patch() {
        let patch = UpdateBoard::default();
        assert!(patch.title.is_none());
        assert!(patch.description.is_none());

        // An empty patch serializes to an empty details payload.
        let details = serde_json::to_value(&patch).unwrap();
        assert_eq!(details, serde_json::json!({}));
    }

    #[test]
    fn test_update_board_details_log_only_patched_fields() {
        let patch = UpdateBoard {
            title: Some("Renamed".to_string()),
            description: None,
        };

        let details = serde_json::to_value(&patch).unwrap();
        assert_eq!(details, serde_json::json!({ "title": "Renamed" }));
    }
}
