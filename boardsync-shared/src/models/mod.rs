/// Database models for boardsync
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `user`: User accounts
/// - `board`: Boards, the board member set, and the full-board read join
/// - `list`: Lists (ordered columns within a board)
/// - `task`: Tasks, their status, and the assignee set
/// - `activity`: The append-only audit trail
///
/// # Example
///
/// ```no_run
/// use boardsync_shared::models::user::{CreateUser, User};
/// use boardsync_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Ada".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod board;
pub mod list;
pub mod task;
pub mod user;
