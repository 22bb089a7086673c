/// Sibling ordering for lists and tasks
///
/// Both lists-within-a-board and tasks-within-a-list are ordered by an
/// integer sort key (`position`). The key is gap-tolerant: appends take
/// `max + 1`, moves write the caller's target value verbatim, and siblings
/// are never renumbered. Repeated inserts at the same slot can therefore
/// produce duplicate keys; the total order stays deterministic because
/// every comparison falls back to `(created_at, id)`.
///
/// Two concurrent appends on the same collection can race and both read the
/// same MAX; that is an accepted property of the model, not a defect, and
/// resolves through the same tie-break.
///
/// # Example
///
/// ```
/// use boardsync_shared::ordering::append_position;
///
/// // Empty collection starts at 0, then grows by one per append.
/// assert_eq!(append_position(None), 0);
/// assert_eq!(append_position(Some(0)), 1);
/// assert_eq!(append_position(Some(41)), 42);
/// ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Anything ordered by the sibling sort key with the stable tie-break
pub trait Positioned {
    /// The sibling sort key
    fn position(&self) -> i32;

    /// Creation time, first tie-break
    fn created_at(&self) -> DateTime<Utc>;

    /// Identity, final tie-break
    fn id(&self) -> Uuid;
}

/// Computes the sort key for an append given the collection's current MAX
///
/// `None` means the collection is empty and the first item gets 0.
pub fn append_position(max: Option<i32>) -> i32 {
    max.map_or(0, |m| m + 1)
}

/// Total, deterministic order over siblings
///
/// Primary key `position`, then `created_at`, then `id`, so rendering order
/// never depends on store enumeration order even when sort keys collide.
/// SQL fetches mirror this as `ORDER BY position, created_at, id`.
pub fn sibling_cmp<T: Positioned>(a: &T, b: &T) -> Ordering {
    a.position()
        .cmp(&b.position())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Computes the append sort key for a new list on a board
pub async fn next_list_position(pool: &PgPool, board_id: Uuid) -> Result<i32, sqlx::Error> {
    let (max,): (Option<i32>,) =
        sqlx::query_as("SELECT MAX(position) FROM lists WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(pool)
            .await?;

    Ok(append_position(max))
}

/// Computes the append sort key for a new task on a list
pub async fn next_task_position(pool: &PgPool, list_id: Uuid) -> Result<i32, sqlx::Error> {
    let (max,): (Option<i32>,) =
        sqlx::query_as("SELECT MAX(position) FROM tasks WHERE list_id = $1")
            .bind(list_id)
            .fetch_one(pool)
            .await?;

    Ok(append_position(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Item {
        position: i32,
        created_at: DateTime<Utc>,
        id: Uuid,
    }

    impl Positioned for Item {
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

    fn item(position: i32, secs: i64, id: u128) -> Item {
        Item {
            position,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            id: Uuid::from_u128(id),
        }
    }

    #[test]
    fn test_append_position_empty_collection_starts_at_zero() {
        assert_eq!(append_position(None), 0);
    }

    #[test]
    fn test_append_position_increments_max() {
        assert_eq!(append_position(Some(0)), 1);
        assert_eq!(append_position(Some(7)), 8);
        // Sparse keys still append past the maximum.
        assert_eq!(append_position(Some(100)), 101);
    }

    #[test]
    fn test_appending_n_items_yields_position_n_minus_one() {
        let mut max = None;
        for expected in 0..10 {
            let position = append_position(max);
            assert_eq!(position, expected);
            max = Some(position);
        }
    }

    #[test]
    fn test_sibling_cmp_orders_by_position_first() {
        let a = item(0, 100, 2);
        let b = item(1, 50, 1);
        assert_eq!(sibling_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_sibling_cmp_breaks_position_ties_by_creation_time() {
        let older = item(3, 100, 9);
        let newer = item(3, 200, 1);
        assert_eq!(sibling_cmp(&older, &newer), Ordering::Less);
    }

    #[test]
    fn test_sibling_cmp_is_total_on_full_ties() {
        // Same position and timestamp: identity keeps the order total.
        let a = item(5, 100, 1);
        let b = item(5, 100, 2);
        assert_eq!(sibling_cmp(&a, &b), Ordering::Less);
        assert_eq!(sibling_cmp(&b, &a), Ordering::Greater);
        assert_eq!(sibling_cmp(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_sort_is_deterministic_with_duplicate_positions() {
        // Repeated inserts at the head produce duplicate sort keys; sorting
        // any permutation must converge on the same order.
        let mut items = vec![
            item(0, 300, 3),
            item(0, 100, 1),
            item(2, 50, 4),
            item(0, 200, 2),
        ];

        items.sort_by(sibling_cmp);
        let ids: Vec<u128> = items.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        items.reverse();
        items.sort_by(sibling_cmp);
        let ids: Vec<u128> = items.iter().map(|i| i.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
