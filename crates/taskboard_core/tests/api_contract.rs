use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use serde_json::json;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    ApiResponse, ApiStatus, CategoryId, CategoryService, FixedClock, Note, NoteService, OwnerId, Recurrence,
    SqliteCategoryRepository, SqliteNoteRepository, SqliteTaskRepository, Task, TaskId,
    TaskRepository, TaskboardApi,
};
use uuid::Uuid;

fn at(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

fn api(conn: &Connection) -> TaskboardApi<'_, FixedClock> {
    TaskboardApi::new(conn, FixedClock(at("2024-01-01T08:00:00Z")), Tz::UTC)
}

fn seed_category(conn: &Connection) -> (OwnerId, CategoryId) {
    let owner_id = Uuid::new_v4();
    let categories = CategoryService::new(SqliteCategoryRepository::try_new(conn).unwrap());
    (
        owner_id,
        categories.create_category(owner_id, "Home").unwrap().id,
    )
}

fn seed_task(conn: &Connection, recurrence: Option<Recurrence>) -> (OwnerId, TaskId) {
    let (owner_id, category_id) = seed_category(conn);
    let mut task = Task::new(owner_id, category_id, "laundry");
    task.due = Some(at("2024-01-01T09:00:00Z"));
    task.recurrence = recurrence;
    let task_id = SqliteTaskRepository::try_new(conn)
        .unwrap()
        .create_task(&task)
        .unwrap();
    (owner_id, task_id)
}

fn seed_notes(conn: &Connection, count: usize) -> Vec<Note> {
    let (_, category_id) = seed_category(conn);
    let notes = NoteService::new(SqliteNoteRepository::try_new(conn).unwrap());
    (0..count)
        .map(|index| {
            notes
                .create_note(category_id, format!("note-{index}"), None)
                .unwrap()
        })
        .collect()
}

fn stored_due(conn: &Connection, owner_id: OwnerId, task_id: TaskId) -> Option<DateTime<Utc>> {
    SqliteTaskRepository::try_new(conn)
        .unwrap()
        .get_task(owner_id, task_id)
        .unwrap()
        .unwrap()
        .due
}

#[test]
fn update_task_status_completes_recurring_task() {
    let conn = open_db_in_memory().unwrap();
    let (owner_id, task_id) = seed_task(&conn, Some(Recurrence::Daily));

    let body = json!({ "id": task_id.to_string(), "value": true }).to_string();
    let response = api(&conn).update_task_status(Some(owner_id), &body);

    assert_eq!(response.status, ApiStatus::NoContent);
    assert_eq!(response.body(), None);
    assert_eq!(
        stored_due(&conn, owner_id, task_id),
        Some(at("2024-01-02T09:00:00Z"))
    );
}

#[test]
fn update_task_status_requires_identity_before_payload() {
    let conn = open_db_in_memory().unwrap();

    let response = api(&conn).update_task_status(None, "not json");
    assert_eq!(response.status.code(), 401);
    assert_eq!(response.message.as_deref(), Some("Unauthorized"));
}

#[test]
fn update_task_status_rejects_invalid_payloads() {
    let conn = open_db_in_memory().unwrap();
    let (owner_id, task_id) = seed_task(&conn, None);
    let api = api(&conn);

    for body in [
        "not json".to_string(),
        json!({ "value": true }).to_string(),
        json!({ "id": task_id.to_string() }).to_string(),
        json!({ "id": task_id.to_string(), "value": "yes" }).to_string(),
        json!({ "id": "", "value": true }).to_string(),
    ] {
        let response = api.update_task_status(Some(owner_id), &body);
        assert_eq!(response.status.code(), 400, "body: {body}");
        assert_eq!(response.message.as_deref(), Some("Invalid payload"));
    }
}

#[test]
fn update_task_status_hides_foreign_tasks() {
    let conn = open_db_in_memory().unwrap();
    let (owner_id, task_id) = seed_task(&conn, Some(Recurrence::Daily));
    let api = api(&conn);

    let body = json!({ "id": task_id.to_string(), "value": true }).to_string();
    let foreign = api.update_task_status(Some(Uuid::new_v4()), &body);
    assert_eq!(foreign.status.code(), 404);
    assert_eq!(foreign.message.as_deref(), Some("Task not found"));

    let malformed_id = json!({ "id": "task-1", "value": true }).to_string();
    assert_eq!(
        api.update_task_status(Some(owner_id), &malformed_id)
            .status
            .code(),
        404
    );
    assert_eq!(
        stored_due(&conn, owner_id, task_id),
        Some(at("2024-01-01T09:00:00Z"))
    );
}

#[test]
fn reschedule_task_maps_every_failure() {
    let conn = open_db_in_memory().unwrap();
    let (owner_id, plain_task) = seed_task(&conn, None);
    let api = api(&conn);

    let unauthorized = api.reschedule_task(None, "{}");
    assert_eq!(unauthorized.status, ApiStatus::Unauthorized);

    let missing = api.reschedule_task(Some(owner_id), "{}");
    assert_eq!(missing.status, ApiStatus::BadRequest);
    assert_eq!(missing.message.as_deref(), Some("Task id is required"));

    let unknown = json!({ "id": Uuid::new_v4().to_string() }).to_string();
    assert_eq!(
        api.reschedule_task(Some(owner_id), &unknown).status,
        ApiStatus::NotFound
    );

    let plain = json!({ "id": plain_task.to_string() }).to_string();
    let not_recurring = api.reschedule_task(Some(owner_id), &plain);
    assert_eq!(not_recurring.status, ApiStatus::BadRequest);
    assert_eq!(
        not_recurring.body(),
        Some(r#"{"message":"Task is not recurring"}"#.to_string())
    );
}

#[test]
fn reschedule_task_moves_overdue_task_to_today() {
    let conn = open_db_in_memory().unwrap();
    let (owner_id, category_id) = seed_category(&conn);
    let mut task = Task::new(owner_id, category_id, "stretch");
    task.due = Some(at("2023-12-20T09:00:00Z"));
    task.recurrence = Some(Recurrence::Workday);
    let task_id = SqliteTaskRepository::try_new(&conn)
        .unwrap()
        .create_task(&task)
        .unwrap();

    let body = json!({ "id": task_id.to_string() }).to_string();
    let response = api(&conn).reschedule_task(Some(owner_id), &body);

    assert_eq!(response.status, ApiStatus::NoContent);
    // 2024-01-01 is a Monday and 09:00 has not passed at 08:00.
    assert_eq!(
        stored_due(&conn, owner_id, task_id),
        Some(at("2024-01-01T09:00:00Z"))
    );
}

#[test]
fn reorder_notes_applies_the_move() {
    let conn = open_db_in_memory().unwrap();
    let notes = seed_notes(&conn, 6);

    let body = json!({
        "movedNoteId": notes[2].id.to_string(),
        "positionMovedTo": 5,
        "positionMovedFrom": 2,
    })
    .to_string();
    let response = api(&conn).reorder_notes(&body);
    assert_eq!(response.status, ApiStatus::NoContent);

    let listed = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap())
        .list_notes(notes[0].category_id)
        .unwrap();
    let order: Vec<Uuid> = listed.iter().map(|note| note.id).collect();
    assert_eq!(
        order,
        vec![
            notes[0].id,
            notes[1].id,
            notes[3].id,
            notes[4].id,
            notes[5].id,
            notes[2].id,
        ]
    );
}

#[test]
fn reorder_notes_status_mapping() {
    let conn = open_db_in_memory().unwrap();
    let notes = seed_notes(&conn, 3);
    let api = api(&conn);
    let note_id = notes[0].id.to_string();

    let noop = json!({ "movedNoteId": note_id, "positionMovedTo": 1, "positionMovedFrom": 1 });
    assert_eq!(
        api.reorder_notes(&noop.to_string()).status,
        ApiStatus::NoContent
    );
    let noop_unknown =
        json!({ "movedNoteId": "abc", "positionMovedTo": 3, "positionMovedFrom": 3 });
    assert_eq!(
        api.reorder_notes(&noop_unknown.to_string()),
        ApiResponse {
            status: ApiStatus::NoContent,
            message: None,
        }
    );

    for malformed in [
        json!({ "movedNoteId": note_id, "positionMovedTo": -1, "positionMovedFrom": 0 }),
        json!({ "movedNoteId": note_id, "positionMovedTo": 1.5, "positionMovedFrom": 0 }),
        json!({ "movedNoteId": note_id, "positionMovedFrom": 0 }),
        json!({ "positionMovedTo": 1, "positionMovedFrom": 0 }),
    ] {
        assert_eq!(
            api.reorder_notes(&malformed.to_string()).status,
            ApiStatus::BadRequest,
            "body: {malformed}"
        );
    }

    let unknown = json!({
        "movedNoteId": Uuid::new_v4().to_string(),
        "positionMovedTo": 1,
        "positionMovedFrom": 0,
    });
    assert_eq!(
        api.reorder_notes(&unknown.to_string()).status,
        ApiStatus::NotFound
    );

    let stale = json!({ "movedNoteId": note_id, "positionMovedTo": 2, "positionMovedFrom": 1 });
    assert_eq!(
        api.reorder_notes(&stale.to_string()).status,
        ApiStatus::BadRequest
    );

    let out_of_range =
        json!({ "movedNoteId": note_id, "positionMovedTo": 3, "positionMovedFrom": 0 });
    assert_eq!(
        api.reorder_notes(&out_of_range.to_string()).status,
        ApiStatus::BadRequest
    );
}
