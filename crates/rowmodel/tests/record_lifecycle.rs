//! Create, insert, load, modify and save records against the scripted connector.

mod fixtures;

use chrono::NaiveDate;
use fixtures::{connector, database, user_row};
use rowmodel::prelude::*;
use rowmodel::{Event, NaiveDateTime};

fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

#[test]
fn test_create_set_and_insert() {
    let conn = connector();
    let (db, sink) = database(&conn);
    let users = db.table("users").unwrap();

    let mut user = users.create();
    assert!(user.is_new());
    assert!(!user.is_modified());
    assert_eq!(user.get("Id", Representation::Internal).unwrap(), Value::Null);

    user.set("Name", "Alice").unwrap();
    let expected: FieldMap = [("Name", "'Alice'")].into_iter().collect();
    assert_eq!(user.changes(Representation::Wire).unwrap(), expected);

    conn.push_affected(1, Some(7));
    conn.push_rows(vec![user_row(7, "Alice", "2024-01-02 03:04:05")]);
    user.save().unwrap();

    assert_eq!(
        conn.executed(),
        vec![
            "DESCRIBE `users`".to_string(),
            "INSERT INTO `users` (`Id`,`Name`,`Created`) VALUES (NULL,'Alice',NULL);".to_string(),
            "SELECT `Id`,`Name`,`Created` FROM `users` WHERE `Id` = 7;".to_string(),
        ]
    );
    assert_eq!(user.identity(), Some(&Value::Int(7)));
    assert_eq!(user.get("Id", Representation::Internal).unwrap(), Value::Int(7));
    assert_eq!(
        user.get("Created", Representation::Internal).unwrap(),
        Value::DateTime(timestamp(2024, 1, 2, 3, 4, 5))
    );
    assert!(!user.is_modified());
    assert!(!user.is_new());

    assert!(sink.events().iter().any(|e| matches!(
        e,
        Event::RecordSaved { table, identity, inserted: true } if table == "users" && identity.as_deref() == Some("7")
    )));
}

#[test]
fn test_insert_returns_stored_record() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    let mut user = users.create();
    user.set("Name", "Bea").unwrap();
    conn.push_affected(1, Some(3));
    conn.push_rows(vec![user_row(3, "Bea", "2023-05-06 07:08:09")]);

    let stored = users.insert(&mut user).unwrap();
    assert_eq!(stored.identity(), Some(&Value::Int(3)));
    assert_eq!(
        stored.data(Representation::External).unwrap(),
        user.data(Representation::External).unwrap()
    );
    assert!(!stored.is_modified());
}

#[test]
fn test_save_updates_only_changed_fields() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![user_row(42, "Alice", "2024-01-02 03:04:05")]);
    let mut user = users.get(42, &GetOptions::new()).unwrap().unwrap();
    assert!(!user.is_modified());
    assert!(user.changes(Representation::Internal).unwrap().is_empty());

    user.set("Name", "Bob").unwrap();
    conn.push_affected(1, None);
    user.save().unwrap();

    assert_eq!(
        conn.last_statement().unwrap(),
        "UPDATE `users` SET `Name` = 'Bob' WHERE `Id` = 42;"
    );
    assert!(!user.is_modified());
    assert_eq!(
        user.get("Name", Representation::Internal).unwrap(),
        Value::from("Bob")
    );
}

#[test]
fn test_save_without_changes_issues_no_statement() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![user_row(42, "Alice", "2024-01-02 03:04:05")]);
    let mut user = users.get(42, &GetOptions::new()).unwrap().unwrap();
    let before = conn.executed().len();

    user.save().unwrap();
    assert_eq!(conn.executed().len(), before);
}

#[test]
fn test_changing_primary_key_updates_by_identity() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![user_row(42, "Alice", "2024-01-02 03:04:05")]);
    let mut user = users.get(42, &GetOptions::new()).unwrap().unwrap();

    user.set("PRIMARY", 43).unwrap();
    conn.push_affected(1, None);
    user.save().unwrap();

    assert_eq!(
        conn.last_statement().unwrap(),
        "UPDATE `users` SET `Id` = 43 WHERE `Id` = 42;"
    );
    assert_eq!(user.identity(), Some(&Value::Int(43)));
}

#[test]
fn test_datetime_text_is_normalized_on_set() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![user_row(1, "Alice", "2024-01-02 03:04:05")]);
    let mut user = users.get(1, &GetOptions::new()).unwrap().unwrap();

    user.set("Created", "2024-06-30").unwrap();
    assert_eq!(
        user.get("Created", Representation::Internal).unwrap(),
        Value::DateTime(timestamp(2024, 6, 30, 0, 0, 0))
    );
    let changes = user.changes(Representation::Wire).unwrap();
    assert_eq!(
        changes.get("Created"),
        Some(&Value::from("'2024-06-30 00:00:00'"))
    );
}

#[test]
fn test_select_maps_projected_fields() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![
        Row::new(vec![Value::from("Alice")]),
        Row::new(vec![Value::from("Bob")]),
    ]);
    let names = users
        .select(
            &Select::new()
                .fields(["Name"])
                .order_by(Order::asc("Name"))
                .limit(2),
        )
        .unwrap();

    assert_eq!(
        conn.last_statement().unwrap(),
        "SELECT `Name` FROM `users` ORDER BY `Name` ASC LIMIT 2;"
    );
    assert_eq!(names.len(), 2);
    for record in &names {
        assert!(!record.is_new());
        assert!(record.is_loaded());
        assert!(record.identity().is_none());
        assert!(!record.is_modified());
        assert_eq!(record.get("Id", Representation::Internal).unwrap(), Value::Null);
    }
    assert_eq!(
        names[1].get("Name", Representation::External).unwrap(),
        Value::from("Bob")
    );
}

#[test]
fn test_record_selected_without_key_is_not_saved() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![Row::new(vec![Value::from("Alice")])]);
    let mut names = users.select(&Select::new().fields(["Name"])).unwrap();
    let before = conn.executed().len();

    let record = names.iter_mut().next().unwrap();
    record.save().unwrap();
    assert_eq!(conn.executed().len(), before);

    record.set("Name", "Alicia").unwrap();
    assert!(matches!(record.save(), Err(Error::Schema(_))));
    assert!(record.is_modified());
    assert_eq!(conn.executed().len(), before);
}

#[test]
fn test_select_full_rows_carry_identity() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![
        user_row(1, "Alice", "2024-01-02 03:04:05"),
        user_row(2, "Bob", "2024-01-03 03:04:05"),
    ]);
    let all = users
        .select(&Select::new().filter("`Created` > '2024-01-01'"))
        .unwrap();

    let ids: Vec<_> = all.iter().map(|r| r.identity().cloned()).collect();
    assert_eq!(ids, vec![Some(Value::Int(1)), Some(Value::Int(2))]);
    assert_eq!(
        all.first().unwrap().to_json().unwrap(),
        serde_json::json!({
            "Id": 1,
            "Name": "Alice",
            "Created": "2024-01-02 03:04:05",
        })
    );
}

#[test]
fn test_order_and_group_reject_unknown_fields() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();
    let before = conn.executed().len();

    let err = users
        .select(&Select::new().order_by("Nope"))
        .unwrap_err();
    assert!(matches!(err, Error::Field(_)));

    let err = users.select(&Select::new().group_by("Nope")).unwrap_err();
    assert!(matches!(err, Error::Field(_)));

    assert_eq!(conn.executed().len(), before);
}

#[test]
fn test_create_with_seed_ignores_unknown_keys() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    let seed: FieldMap = [("Name", "Carol"), ("Nickname", "C")].into_iter().collect();
    let user = users.create_with(&seed).unwrap();

    assert!(user.is_new());
    assert!(!user.is_modified());
    assert_eq!(
        user.get("Name", Representation::Internal).unwrap(),
        Value::from("Carol")
    );
}

#[test]
fn test_update_primitive_returns_affected_count() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_affected(3, None);
    let values: FieldMap = [("Name", "'anon'")].into_iter().collect();
    let affected = users.update(&values, "`Created` IS NULL").unwrap();

    assert_eq!(affected, 3);
    assert_eq!(
        conn.last_statement().unwrap(),
        "UPDATE `users` SET `Name` = 'anon' WHERE `Created` IS NULL;"
    );

    let bogus: FieldMap = [("Nope", "1")].into_iter().collect();
    assert!(matches!(
        users.update(&bogus, Where::new()),
        Err(Error::Field(_))
    ));
}

#[test]
fn test_revert_discards_changes() {
    let conn = connector();
    let (db, _sink) = database(&conn);
    let users = db.table("users").unwrap();

    conn.push_rows(vec![user_row(5, "Alice", "2024-01-02 03:04:05")]);
    let mut user = users.get(5, &GetOptions::new()).unwrap().unwrap();
    user.set("Name", "Mallory").unwrap();
    user.revert();

    assert!(!user.is_modified());
    assert_eq!(
        user.get("Name", Representation::Internal).unwrap(),
        Value::from("Alice")
    );
}
