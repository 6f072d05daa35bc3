//! Integration tests for the `roster-db` data layer.
//!
//! Every test opens its own in-memory `SQLite` database with migrations
//! applied, so no external services are needed.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use roster_db::{CourseStore, Database, DbError, StudentStore, UserStore};
use roster_types::{CourseId, NewCourse, NewStudent, StudentId};

async fn setup() -> Database {
    Database::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

fn new_student(name: &str, email: Option<&str>) -> NewStudent {
    NewStudent {
        name: name.to_owned(),
        age: 16,
        grade: "10A".to_owned(),
        email: email.map(str::to_owned),
        phone: Some("555-0100".to_owned()),
        address: None,
    }
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn user_create_and_find() {
    let db = setup().await;
    let users = UserStore::new(db.pool());

    let created = users.create("admin", "$argon2id$hash").await.unwrap();
    let found = users.find_by_username("admin").await.unwrap().unwrap();
    assert_eq!(found, created);

    assert!(users.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let db = setup().await;
    let users = UserStore::new(db.pool());

    users.create("admin", "h1").await.unwrap();
    let err = users.create("admin", "h2").await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
}

// =============================================================================
// Students
// =============================================================================

#[tokio::test]
async fn student_crud_roundtrip() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());

    let alice = students
        .insert(&new_student("Alice", Some("alice@example.com")))
        .await
        .unwrap();
    let bob = students.insert(&new_student("Bob", None)).await.unwrap();

    let listed = students.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, alice.id);
    assert_eq!(listed[1].name, "Bob");

    let mut changed = new_student("Robert", Some("rob@example.com"));
    changed.age = 17;
    assert!(students.update(bob.id, &changed).await.unwrap());

    let fetched = students.get(bob.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Robert");
    assert_eq!(fetched.age, 17);
    assert_eq!(fetched.email.as_deref(), Some("rob@example.com"));
    assert_eq!(fetched.created_at, bob.created_at);

    assert!(students.delete(alice.id).await.unwrap());
    assert!(students.get(alice.id).await.unwrap().is_none());
    assert_eq!(students.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_student_is_reported_not_errored() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());

    let missing = StudentId(999);
    assert!(students.get(missing).await.unwrap().is_none());
    assert!(!students.update(missing, &new_student("X", None)).await.unwrap());
    assert!(!students.delete(missing).await.unwrap());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());

    students
        .insert(&new_student("Alice", Some("same@example.com")))
        .await
        .unwrap();
    let err = students
        .insert(&new_student("Eve", Some("same@example.com")))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");

    // Students without an email never collide.
    students.insert(&new_student("NoMail1", None)).await.unwrap();
    students.insert(&new_student("NoMail2", None)).await.unwrap();
}

// =============================================================================
// Courses and enrollments
// =============================================================================

#[tokio::test]
async fn enrollment_is_idempotent() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());
    let courses = CourseStore::new(db.pool());

    let alice = students.insert(&new_student("Alice", None)).await.unwrap();
    let maths = courses
        .insert(&NewCourse {
            course_name: "Maths".to_owned(),
            description: Some("Algebra and geometry".to_owned()),
        })
        .await
        .unwrap();
    let art = courses
        .insert(&NewCourse {
            course_name: "Art".to_owned(),
            description: None,
        })
        .await
        .unwrap();

    assert!(courses.enroll(alice.id, maths.id).await.unwrap());
    assert!(!courses.enroll(alice.id, maths.id).await.unwrap());
    assert!(courses.enroll(alice.id, art.id).await.unwrap());

    let enrolled = courses.courses_for_student(alice.id).await.unwrap();
    let names: Vec<&str> = enrolled.iter().map(|c| c.course_name.as_str()).collect();
    assert_eq!(names, vec!["Art", "Maths"]);
}

#[tokio::test]
async fn enrolling_in_unknown_course_is_a_missing_reference() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());
    let courses = CourseStore::new(db.pool());

    let alice = students.insert(&new_student("Alice", None)).await.unwrap();
    let err = courses.enroll(alice.id, CourseId(404)).await.unwrap_err();
    assert!(matches!(err, DbError::MissingReference(_)), "got {err:?}");
}

#[tokio::test]
async fn deleting_a_student_drops_their_enrollments() {
    let db = setup().await;
    let students = StudentStore::new(db.pool());
    let courses = CourseStore::new(db.pool());

    let alice = students.insert(&new_student("Alice", None)).await.unwrap();
    let maths = courses
        .insert(&NewCourse {
            course_name: "Maths".to_owned(),
            description: None,
        })
        .await
        .unwrap();
    courses.enroll(alice.id, maths.id).await.unwrap();

    students.delete(alice.id).await.unwrap();

    let (remaining,): (i64,) = sqlx_count(&db).await;
    assert_eq!(remaining, 0);
    assert_eq!(courses.list().await.unwrap().len(), 1);
}

async fn sqlx_count(db: &Database) -> (i64,) {
    sqlx::query_as("SELECT COUNT(*) FROM enrollments")
        .fetch_one(db.pool())
        .await
        .unwrap()
}
