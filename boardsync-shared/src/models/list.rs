/// List model and database operations
///
/// Lists are the ordered columns of a board. The sibling sort key is the
/// integer `position` column; values are not renumbered on insert or move,
/// so duplicates are possible and every fetch orders by
/// `(position, created_at, id)` to keep the rendering order total and
/// deterministic.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     board_id UUID NOT NULL REFERENCES boards(id),
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::TaskView;
use crate::ordering::Positioned;

/// List record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    /// Unique list ID
    pub id: Uuid,

    /// List title
    pub title: String,

    /// Owning board
    pub board_id: Uuid,

    /// Sibling sort key within the board; not necessarily dense or unique
    pub position: i32,

    /// When the list was created
    pub created_at: DateTime<Utc>,

    /// When the list was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new list
#[derive(Debug, Clone)]
pub struct CreateList {
    /// Owning board
    pub board_id: Uuid,

    /// List title
    pub title: String,

    /// Sibling sort key, computed by the ordering service
    pub position: i32,
}

/// Partial update of a list; only non-None fields are written
///
/// Serialized as-is into the activity `details` payload. Patching
/// `position` is how lists are reordered within their board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateList {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New sibling sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// A list with its tasks resolved, used by the full-board read
#[derive(Debug, Serialize)]
pub struct ListDetail {
    /// The list itself, flattened into the payload
    #[serde(flatten)]
    pub list: List,

    /// Tasks in sibling order
    pub tasks: Vec<TaskView>,
}

impl List {
    /// Creates a new list
    pub async fn create(pool: &PgPool, data: CreateList) -> Result<Self, sqlx::Error> {
        let list = sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (title, board_id, position)
            VALUES ($1, $2, $3)
            RETURNING id, title, board_id, position, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.board_id)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Finds a list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, List>(
            r#"
            SELECT id, title, board_id, position, created_at, updated_at
            FROM lists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Applies a partial update; only non-None fields are written
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateList,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE lists SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, board_id, position, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, List>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(position) = data.position {
            q = q.bind(position);
        }

        let list = q.fetch_optional(pool).await?;

        Ok(list)
    }

    /// Deletes a list row (its tasks must already be gone)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a board's lists in sibling order
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lists = sqlx::query_as::<_, List>(
            r#"
            SELECT id, title, board_id, position, created_at, updated_at
            FROM lists
            WHERE board_id = $1
            ORDER BY position ASC, created_at ASC, id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Deletes every list of a board, returning the number removed
    ///
    /// Part of the explicit board delete cascade; tasks go first.
    pub async fn delete_by_board(pool: &PgPool, board_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE board_id = $1")
            .bind(board_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

impl Positioned for List {
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
