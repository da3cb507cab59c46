use goaltracker_core::db::open_db_in_memory;
use goaltracker_core::{
    CharacterRepository, GoalTracker, RepoError, ServiceError, SqliteCharacterRepository,
    SqliteUserRepository, UserRepository,
};

#[test]
fn create_and_get_user_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    let created = tracker.users.create_user("  zezima@example.com ").unwrap();
    assert!(!created.user_id.is_empty());
    assert_eq!(created.email, "zezima@example.com");
    assert_eq!(created.created_at, created.updated_at);

    let loaded = tracker.users.get_user(&created.user_id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn created_users_get_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let first = repo.create_user("a@example.com").unwrap();
    let second = repo.create_user("a@example.com").unwrap();
    assert_ne!(first.user_id, second.user_id);
}

#[test]
fn create_user_rejects_blank_email() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    for email in ["", "   "] {
        let err = repo.create_user(email).unwrap_err();
        assert!(matches!(err, RepoError::InvalidInput(ref message) if message.contains("email")));
    }
}

#[test]
fn get_missing_user_is_distinct_not_found() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    let err = tracker.users.get_user("nonexistentId").unwrap_err();
    match err {
        ServiceError::NotFound { entity, id } => {
            assert_eq!(entity, "user");
            assert_eq!(id, "nonexistentId");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn get_user_rejects_blank_id_before_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    let err = tracker.users.get_user("  ").unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(err.status_code(), 400);
}

#[test]
fn add_character_stores_trimmed_name() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    let character = tracker
        .characters
        .add_character_to_user("u1", "  Zezima  ")
        .unwrap();
    assert_eq!(character.name, "Zezima");
    assert_eq!(character.user_id, "u1");

    let stored: String = conn
        .query_row(
            "SELECT character_name FROM entities WHERE pk = 'USER#u1' AND entity_type = 'CHARACTER';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "Zezima");
}

#[test]
fn characters_for_user_without_characters_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    let characters = tracker
        .characters
        .get_characters_for_user("userWithNoCharacters")
        .unwrap();
    assert!(characters.is_empty());
}

#[test]
fn characters_are_listed_per_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCharacterRepository::try_new(&conn).unwrap();

    repo.add_character_to_user("u1", "TestChar1").unwrap();
    repo.add_character_to_user("u1", "TestChar2").unwrap();
    repo.add_character_to_user("u2", "Other").unwrap();

    let names = repo
        .get_characters_for_user(" u1 ")
        .unwrap()
        .into_iter()
        .map(|character| character.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["TestChar1".to_string(), "TestChar2".to_string()]);
}

#[test]
fn adding_same_character_twice_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let tracker = GoalTracker::compose(&conn).unwrap();

    tracker
        .characters
        .add_character_to_user("u1", "Zezima")
        .unwrap();
    let err = tracker
        .characters
        .add_character_to_user("u1", " Zezima")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.status_code(), 409);

    tracker
        .characters
        .add_character_to_user("u2", "Zezima")
        .expect("same name under another user is allowed");
}

#[test]
fn character_operations_reject_blank_identifiers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCharacterRepository::try_new(&conn).unwrap();

    let cases = [
        repo.add_character_to_user("", "Zezima").unwrap_err(),
        repo.add_character_to_user("u1", "   ").unwrap_err(),
        repo.get_characters_for_user("\t").unwrap_err(),
    ];
    for err in cases {
        assert!(matches!(err, RepoError::InvalidInput(_)), "unexpected: {err}");
    }
}
