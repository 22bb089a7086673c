/// Board access checks
///
/// A user may observe and mutate a board iff they are its owner, a member,
/// or assigned to at least one of its tasks. Assigning or unassigning task
/// collaborators is restricted further, to the board owner.
///
/// The two failure shapes are deliberately distinct so the API can tell
/// "nothing there" from "not allowed": a missing board is `BoardNotFound`,
/// a real board the user has no relationship with is `AccessDenied`.
///
/// # Example
///
/// ```no_run
/// use boardsync_shared::access::require_board_access;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, board_id: Uuid)
/// # -> Result<(), Box<dyn std::error::Error>> {
/// let board = require_board_access(&pool, user_id, board_id).await?;
/// println!("{} may act on {}", user_id, board.title);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::board::Board;
use crate::models::task::Task;

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The referenced board does not exist
    #[error("Board {0} not found")]
    BoardNotFound(Uuid),

    /// The user has no relationship with the board
    #[error("Access denied to board {0}")]
    AccessDenied(Uuid),

    /// The user is not the board owner (owner-only operations)
    #[error("Only the owner of board {0} may perform this action")]
    NotOwner(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks whether a user may access a board: owner, member, or assignee
///
/// The checks short-circuit in that order; the assignee leg is the only one
/// that touches the tasks table.
pub async fn can_access(pool: &PgPool, user_id: Uuid, board: &Board) -> Result<bool, sqlx::Error> {
    if board.owner_id == user_id {
        return Ok(true);
    }

    if Board::is_member(pool, board.id, user_id).await? {
        return Ok(true);
    }

    Task::is_assigned_on_board(pool, board.id, user_id).await
}

/// Loads a board and requires that the user may access it
///
/// Returns the board so callers don't fetch it twice.
pub async fn require_board_access(
    pool: &PgPool,
    user_id: Uuid,
    board_id: Uuid,
) -> Result<Board, AccessError> {
    let board = Board::find_by_id(pool, board_id)
        .await?
        .ok_or(AccessError::BoardNotFound(board_id))?;

    if !can_access(pool, user_id, &board).await? {
        return Err(AccessError::AccessDenied(board_id));
    }

    Ok(board)
}

/// Loads a board and requires that the user is its owner
///
/// The stricter gate for assign/unassign; membership alone is not enough.
pub async fn require_board_owner(
    pool: &PgPool,
    user_id: Uuid,
    board_id: Uuid,
) -> Result<Board, AccessError> {
    let board = Board::find_by_id(pool, board_id)
        .await?
        .ok_or(AccessError::BoardNotFound(board_id))?;

    if board.owner_id != user_id {
        return Err(AccessError::NotOwner(board_id));
    }

    Ok(board)
}

/// Ensures a user belongs to the board's member set
///
/// Used when an assignment makes a user newly reachable through a task:
/// they are promoted to member so board access holds afterwards. Idempotent,
/// and a no-op for the owner (who never needs membership).
pub async fn ensure_member(pool: &PgPool, board: &Board, user_id: Uuid) -> Result<(), sqlx::Error> {
    if board.owner_id == user_id {
        return Ok(());
    }

    Board::add_member(pool, board.id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_display() {
        let board_id = Uuid::new_v4();

        let err = AccessError::BoardNotFound(board_id);
        assert!(err.to_string().contains("not found"));

        let err = AccessError::AccessDenied(board_id);
        assert!(err.to_string().contains("Access denied"));

        let err = AccessError::NotOwner(board_id);
        assert!(err.to_string().contains("owner"));
    }
}
