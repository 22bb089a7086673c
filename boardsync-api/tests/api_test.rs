/// Integration tests for the boardsync API
///
/// These tests drive the real router against a live PostgreSQL and verify
/// the system end-to-end: the mutation unit of work, ordering semantics,
/// access control, activity recording, broadcast fan-out, and the cascade
/// delete.
///
/// They require `DATABASE_URL` and `JWT_SECRET` in the environment and are
/// therefore marked `#[ignore]`; run them with `cargo test -- --ignored`.

mod common;

use boardsync_shared::models::activity::Activity;
use boardsync_shared::models::list::List;
use boardsync_shared::models::task::Task;
use common::TestContext;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Requests without a bearer token are rejected before any handler runs
#[tokio::test]
#[ignore]
async fn test_authentication_required() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/v1/boards", "", None).await;
    assert_eq!(status, 401);

    let (status, _) = ctx
        .request(
            "POST",
            "/v1/boards",
            "Bearer not.a.token",
            Some(json!({ "title": "Nope" })),
        )
        .await;
    assert_eq!(status, 401);

    ctx.cleanup(&[]).await.unwrap();
}

/// The end-to-end scenario: board → list → task → move, with the activity
/// trail read back newest-first
#[tokio::test]
#[ignore]
async fn test_sprint_board_scenario() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (status, board) = ctx
        .request(
            "POST",
            "/v1/boards",
            &auth,
            Some(json!({ "title": "Sprint 1" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(board["owner_id"], ctx.user.id.to_string());
    let board_id = board["id"].as_str().unwrap().to_string();

    let (status, todo) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "Todo" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(todo["position"], 0);
    let todo_id = todo["id"].as_str().unwrap().to_string();

    let (status, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", todo_id),
            &auth,
            Some(json!({ "title": "Fix bug" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(task["position"], 0);
    assert_eq!(task["status"], "todo");
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, done) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "Done" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(done["position"], 1);
    let done_id = done["id"].as_str().unwrap().to_string();

    let (status, moved) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/move", task_id),
            &auth,
            Some(json!({ "target_list_id": done_id, "position": 0 })),
        )
        .await;
    assert_eq!(status, 200);
    // The list reference changed; the board reference did not.
    assert_eq!(moved["list_id"], done_id);
    assert_eq!(moved["board_id"], board_id);
    assert_eq!(moved["position"], 0);

    // Trail newest-first: the move, then the creations in reverse order.
    let (status, feed) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities", board_id),
            &auth,
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(feed["total"], 5);

    let actions: Vec<&str> = feed["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec![
            "move_task",
            "create_list",
            "create_task",
            "create_list",
            "create_board"
        ]
    );

    // The move across lists logs source and destination.
    let move_record = &feed["activities"][0];
    assert_eq!(move_record["details"]["from_list_id"], todo_id);
    assert_eq!(move_record["details"]["to_list_id"], done_id);
    assert_eq!(move_record["details"]["position"], 0);
    assert_eq!(move_record["user"]["id"], ctx.user.id.to_string());

    ctx.cleanup(&[]).await.unwrap();
}

/// Appending N tasks to an empty list yields positions 0..N-1
#[tokio::test]
#[ignore]
async fn test_appended_tasks_get_increasing_positions() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "Ord" })))
        .await;
    let board_id = board["id"].as_str().unwrap().to_string();

    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "Backlog" })),
        )
        .await;
    let list_id = list["id"].as_str().unwrap().to_string();

    for expected in 0..5 {
        let (status, task) = ctx
            .request(
                "POST",
                &format!("/v1/lists/{}/tasks", list_id),
                &auth,
                Some(json!({ "title": format!("Task {}", expected) })),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(task["position"], expected);
    }

    ctx.cleanup(&[]).await.unwrap();
}

/// Moving a task to a list on another board is rejected
#[tokio::test]
#[ignore]
async fn test_move_across_boards_rejected() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board_a) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "A" })))
        .await;
    let (_, board_b) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "B" })))
        .await;

    let (_, list_a) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_a["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "A1" })),
        )
        .await;
    let (_, list_b) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_b["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "B1" })),
        )
        .await;

    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list_a["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "Stay put" })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/move", task_id),
            &auth,
            Some(json!({ "target_list_id": list_b["id"] })),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "bad_request");

    // The task is untouched.
    let unchanged = Task::find_by_id(&ctx.db, task_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.list_id.to_string(), list_a["id"].as_str().unwrap());

    ctx.cleanup(&[]).await.unwrap();
}

/// A same-list move with no position keeps the current sort key
#[tokio::test]
#[ignore]
async fn test_same_list_move_defaults_to_unchanged_position() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "M" })))
        .await;
    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "Only" })),
        )
        .await;
    let list_id = list["id"].as_str().unwrap().to_string();

    ctx.request(
        "POST",
        &format!("/v1/lists/{}/tasks", list_id),
        &auth,
        Some(json!({ "title": "First" })),
    )
    .await;
    let (_, second) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list_id),
            &auth,
            Some(json!({ "title": "Second" })),
        )
        .await;
    assert_eq!(second["position"], 1);

    let (status, moved) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/move", second["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "target_list_id": list_id })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(moved["position"], 1);
    assert_eq!(moved["list_id"], list_id);

    ctx.cleanup(&[]).await.unwrap();
}

/// Access control: outsiders are forbidden, assignment promotes to member,
/// and assign/unassign stay owner-only
#[tokio::test]
#[ignore]
async fn test_assignment_grants_board_access() {
    let mut ctx = TestContext::new().await.unwrap();
    let owner_auth = ctx.auth_header();

    let outsider = common::create_test_user(&ctx.db, "Outsider").await.unwrap();
    let outsider_auth = ctx.auth_header_for(outsider.id);

    let (_, board) = ctx
        .request(
            "POST",
            "/v1/boards",
            &owner_auth,
            Some(json!({ "title": "Sprint 1" })),
        )
        .await;
    let board_id = board["id"].as_str().unwrap().to_string();

    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &owner_auth,
            Some(json!({ "title": "Todo" })),
        )
        .await;
    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list["id"].as_str().unwrap()),
            &owner_auth,
            Some(json!({ "title": "Shared work" })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // No relationship yet: the board exists but is forbidden, while a
    // missing board is not-found. The two signals stay distinct.
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}", board_id),
            &outsider_auth,
            None,
        )
        .await;
    assert_eq!(status, 403);

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}", Uuid::new_v4()),
            &outsider_auth,
            None,
        )
        .await;
    assert_eq!(status, 404);

    // A non-owner cannot assign, even themselves.
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            &outsider_auth,
            Some(json!({ "user_id": outsider.id })),
        )
        .await;
    assert_eq!(status, 403);

    // The owner assigns the outsider, which promotes them to member.
    let (status, assigned) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            &owner_auth,
            Some(json!({ "user_id": outsider.id })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(assigned["assignees"].as_array().unwrap().len(), 1);

    let (status, detail) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}", board_id),
            &outsider_auth,
            None,
        )
        .await;
    assert_eq!(status, 200);
    let members = detail["members"].as_array().unwrap();
    assert!(members
        .iter()
        .any(|m| m["id"] == outsider.id.to_string()));

    // Member access does not include assignment rights.
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/assign", task_id),
            &outsider_auth,
            Some(json!({ "user_id": ctx.user.id })),
        )
        .await;
    assert_eq!(status, 403);

    ctx.cleanup(&[outsider.id]).await.unwrap();
}

/// Assigning twice is idempotent: one assignee entry, one activity record
#[tokio::test]
#[ignore]
async fn test_assign_is_idempotent() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let helper = common::create_test_user(&ctx.db, "Helper").await.unwrap();

    let (_, board) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "I" })))
        .await;
    let board_id: Uuid = board["id"].as_str().unwrap().parse().unwrap();
    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "L" })),
        )
        .await;
    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "T" })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let before = Activity::count_by_board(&ctx.db, board_id).await.unwrap();

    for _ in 0..2 {
        let (status, view) = ctx
            .request(
                "POST",
                &format!("/v1/tasks/{}/assign", task_id),
                &auth,
                Some(json!({ "user_id": helper.id })),
            )
            .await;
        assert_eq!(status, 200);
        // Membership of the assignee set is unchanged after the second call.
        assert_eq!(view["assignees"].as_array().unwrap().len(), 1);
    }

    // The no-op repeat did not append a second assign_task record.
    let after = Activity::count_by_board(&ctx.db, board_id).await.unwrap();
    assert_eq!(after, before + 1);

    ctx.cleanup(&[helper.id]).await.unwrap();
}

/// Unassigning a user who was never assigned succeeds as a no-op
#[tokio::test]
#[ignore]
async fn test_unassign_non_assignee_is_noop_success() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let stranger = common::create_test_user(&ctx.db, "Stranger").await.unwrap();

    let (_, board) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "U" })))
        .await;
    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "L" })),
        )
        .await;
    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "T" })),
        )
        .await;

    let (status, view) = ctx
        .request(
            "POST",
            &format!("/v1/tasks/{}/unassign", task["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "user_id": stranger.id })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(view["assignees"].as_array().unwrap().len(), 0);

    ctx.cleanup(&[stranger.id]).await.unwrap();
}

/// A task update appends exactly one activity carrying the full previous
/// state, unlike board updates which log only the patch
#[tokio::test]
#[ignore]
async fn test_update_activities_snapshot_semantics() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board) = ctx
        .request(
            "POST",
            "/v1/boards",
            &auth,
            Some(json!({ "title": "Before board" })),
        )
        .await;
    let board_id: Uuid = board["id"].as_str().unwrap().parse().unwrap();
    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "L" })),
        )
        .await;
    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "Before task" })),
        )
        .await;

    let before = Activity::count_by_board(&ctx.db, board_id).await.unwrap();

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/v1/tasks/{}", task["id"].as_str().unwrap()),
            &auth,
            Some(json!({ "title": "After task", "status": "in_progress" })),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/v1/boards/{}", board_id),
            &auth,
            Some(json!({ "title": "After board" })),
        )
        .await;
    assert_eq!(status, 200);

    let after = Activity::count_by_board(&ctx.db, board_id).await.unwrap();
    assert_eq!(after, before + 2);

    let (_, feed) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities", board_id),
            &auth,
            None,
        )
        .await;
    let activities = feed["activities"].as_array().unwrap();

    // Newest first: the board patch, then the task patch.
    let board_update = &activities[0];
    assert_eq!(board_update["action"], "update_board");
    assert_eq!(board_update["details"], json!({ "title": "After board" }));
    assert!(board_update["previous_data"].is_null());

    let task_update = &activities[1];
    assert_eq!(task_update["action"], "update_task");
    assert_eq!(
        task_update["details"],
        json!({ "title": "After task", "status": "in_progress" })
    );
    // Full snapshot of the pre-patch task, not just the patched fields.
    assert_eq!(task_update["previous_data"]["title"], "Before task");
    assert_eq!(task_update["previous_data"]["status"], "todo");
    assert_eq!(task_update["previous_data"]["position"], 0);

    ctx.cleanup(&[]).await.unwrap();
}

/// Deleting a board removes every list, task, and activity scoped to it
#[tokio::test]
#[ignore]
async fn test_delete_board_cascades() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "Doomed" })))
        .await;
    let board_id: Uuid = board["id"].as_str().unwrap().parse().unwrap();

    let (_, list) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            &auth,
            Some(json!({ "title": "L" })),
        )
        .await;
    let list_id: Uuid = list["id"].as_str().unwrap().parse().unwrap();

    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list_id),
            &auth,
            Some(json!({ "title": "T" })),
        )
        .await;
    let task_id: Uuid = task["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = ctx
        .request("DELETE", &format!("/v1/boards/{}", board_id), &auth, None)
        .await;
    assert_eq!(status, 200);

    let (status, _) = ctx
        .request("GET", &format!("/v1/boards/{}", board_id), &auth, None)
        .await;
    assert_eq!(status, 404);

    assert!(List::find_by_id(&ctx.db, list_id).await.unwrap().is_none());
    assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
    assert_eq!(Activity::count_by_board(&ctx.db, board_id).await.unwrap(), 0);

    ctx.cleanup(&[]).await.unwrap();
}

/// A mutation on board B notifies B's subscribers and nobody else; after
/// leaving, the subscriber hears nothing further
#[tokio::test]
#[ignore]
async fn test_mutations_broadcast_to_board_subscribers() {
    let mut ctx = TestContext::new().await.unwrap();
    let auth = ctx.auth_header();

    let (_, board_b) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "B" })))
        .await;
    let (_, board_c) = ctx
        .request("POST", "/v1/boards", &auth, Some(json!({ "title": "C" })))
        .await;
    let b_id: Uuid = board_b["id"].as_str().unwrap().parse().unwrap();
    let c_id: Uuid = board_c["id"].as_str().unwrap().parse().unwrap();

    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (tx_c, mut rx_c) = mpsc::unbounded_channel();
    let conn_b = Uuid::new_v4();
    ctx.rooms.join(b_id, conn_b, tx_b).await;
    ctx.rooms.join(c_id, Uuid::new_v4(), tx_c).await;

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", b_id),
            &auth,
            Some(json!({ "title": "Watched" })),
        )
        .await;
    assert_eq!(status, 200);

    let frame = rx_b.try_recv().expect("subscriber of B hears the mutation");
    let event: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(event["type"], "create_list");
    assert_eq!(event["board_id"], b_id.to_string());
    assert_eq!(event["list"]["title"], "Watched");

    // The board C subscriber heard nothing.
    assert!(rx_c.try_recv().is_err());

    // After leaving, further mutations on B are silent for this connection.
    ctx.rooms.leave(b_id, conn_b).await;
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", b_id),
            &auth,
            Some(json!({ "title": "Unwatched" })),
        )
        .await;
    assert_eq!(status, 200);
    assert!(rx_b.try_recv().is_err());

    ctx.cleanup(&[]).await.unwrap();
}
