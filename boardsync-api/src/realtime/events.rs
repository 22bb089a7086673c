/// Realtime event payloads and client commands
///
/// Outbound events are JSON frames of the shape
/// `{"board_id": "...", "type": "<operation-kind>", ...payload}` where the
/// payload is the affected entity (or its identifiers for deletions).
/// Board deletion has no event kind: subscribers lose the room with the
/// board, so there is nobody left to tell.
///
/// Inbound, a connection only ever sends subscription commands:
/// `{"action": "join_board", "board_id": "..."}` and the matching
/// `leave_board`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boardsync_shared::models::board::Board;
use boardsync_shared::models::list::List;
use boardsync_shared::models::task::TaskView;

/// One board-scoped change notification
///
/// Serialized internally tagged, so the `type` field carries the
/// operation-kind string.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A board was created
    CreateBoard {
        /// The new board
        board: Board,
    },

    /// Board fields were patched
    UpdateBoard {
        /// The board after the patch
        board: Board,
    },

    /// A list was created
    CreateList {
        /// The new list
        list: List,
    },

    /// List fields were patched
    UpdateList {
        /// The list after the patch
        list: List,
    },

    /// A list (and its tasks) was deleted
    DeleteList {
        /// ID of the removed list
        list_id: Uuid,
    },

    /// A task was created
    CreateTask {
        /// The new task with its (empty) assignee set
        task: TaskView,
    },

    /// Task fields were patched
    UpdateTask {
        /// The task after the patch
        task: TaskView,
    },

    /// A task was deleted
    DeleteTask {
        /// ID of the removed task
        task_id: Uuid,
        /// The list it was removed from
        list_id: Uuid,
    },

    /// A task moved within or across lists
    MoveTask {
        /// The task after the move
        task: TaskView,
    },

    /// A user was assigned to a task
    AssignTask {
        /// The task with its updated assignee set
        task: TaskView,
    },

    /// A user was unassigned from a task
    UnassignTask {
        /// The task with its updated assignee set
        task: TaskView,
    },
}

impl BoardEvent {
    /// The operation-kind string carried in the frame's `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            BoardEvent::CreateBoard { .. } => "create_board",
            BoardEvent::UpdateBoard { .. } => "update_board",
            BoardEvent::CreateList { .. } => "create_list",
            BoardEvent::UpdateList { .. } => "update_list",
            BoardEvent::DeleteList { .. } => "delete_list",
            BoardEvent::CreateTask { .. } => "create_task",
            BoardEvent::UpdateTask { .. } => "update_task",
            BoardEvent::DeleteTask { .. } => "delete_task",
            BoardEvent::MoveTask { .. } => "move_task",
            BoardEvent::AssignTask { .. } => "assign_task",
            BoardEvent::UnassignTask { .. } => "unassign_task",
        }
    }
}

/// The wire frame pushed to subscribers
#[derive(Debug, Serialize)]
pub struct EventFrame<'a> {
    /// Board the event is scoped to
    pub board_id: Uuid,

    /// The event, flattened so its `type` tag and payload sit beside
    /// `board_id`
    #[serde(flatten)]
    pub event: &'a BoardEvent,
}

/// Subscription commands a connection may send
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Subscribe to a board's events
    JoinBoard {
        /// Board to join
        board_id: Uuid,
    },

    /// Unsubscribe from a board's events
    LeaveBoard {
        /// Board to leave
        board_id: Uuid,
    },
}
