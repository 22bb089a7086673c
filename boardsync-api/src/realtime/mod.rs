/// Real-time change propagation
///
/// The broadcaster is a cache-invalidation signal, not a state channel:
/// every event tells subscribed clients "this board changed, refetch it".
/// Delivery is best-effort and fire-and-forget; a dropped notification is
/// benign because clients reconcile by refetching the full board on every
/// event, which also heals missed or reordered notifications.
///
/// # Modules
///
/// - `rooms`: the per-board subscriber registry (join/leave/disconnect/notify)
/// - `events`: outbound event payloads and inbound client commands
/// - `socket`: the `/ws` WebSocket endpoint

pub mod events;
pub mod rooms;
pub mod socket;

pub use events::BoardEvent;
pub use rooms::BoardRooms;
