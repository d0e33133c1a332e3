//! Storage layer tests for the record store.

use super::db::{RecordStore, StoreError};
use super::queries::{NewContactMessage, NewPost, NewRegistration};

async fn test_db() -> RecordStore {
    RecordStore::open_in_memory().await.unwrap()
}

const fn registration<'a>(email: &'a str, username: &'a str) -> NewRegistration<'a> {
    NewRegistration {
        email,
        name: "Ann",
        username,
    }
}

fn conflict_field(err: StoreError) -> String {
    match err {
        StoreError::Conflict { field } => field,
        StoreError::Failure(e) => panic!("expected conflict, got {e}"),
    }
}

// === Registration tests ===

#[tokio::test]
async fn insert_and_get_registration() {
    let db = test_db().await;
    let reg = db
        .insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();

    assert_eq!(reg.email, "a@b.com");
    assert_eq!(reg.name, "Ann");
    assert_eq!(reg.username, "ann1");
    assert_eq!(reg.created_at, reg.updated_at);
    assert!(!reg.id.is_empty());

    let fetched = db.get_registration(&reg.id).await.unwrap();
    assert_eq!(fetched, reg);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let db = test_db().await;
    db.insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();

    let err = db
        .insert_registration(registration("a@b.com", "ann2"))
        .await
        .unwrap_err();
    assert_eq!(conflict_field(err), "email");
    assert_eq!(db.list_registrations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let db = test_db().await;
    db.insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();

    let err = db
        .insert_registration(registration("other@b.com", "ann1"))
        .await
        .unwrap_err();
    assert_eq!(conflict_field(err), "username");
    assert_eq!(db.list_registrations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn conflict_message_names_field() {
    let db = test_db().await;
    db.insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();

    let err = db
        .insert_registration(registration("a@b.com", "ann2"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "email already exists");
}

#[tokio::test]
async fn registrations_listed_in_insertion_order() {
    let db = test_db().await;
    for (email, username) in [("c@x.io", "c"), ("a@x.io", "a"), ("b@x.io", "b")] {
        db.insert_registration(registration(email, username))
            .await
            .unwrap();
    }

    let usernames: Vec<String> = db
        .list_registrations()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.username)
        .collect();
    assert_eq!(usernames, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn concurrent_duplicates_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = RecordStore::open(&dir.path().join("records.db")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let username = format!("user{i}");
            db.insert_registration(NewRegistration {
                email: "same@b.com",
                name: "Ann",
                username: &username,
            })
            .await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(err) => assert_eq!(conflict_field(err), "email"),
        }
    }
    assert_eq!(wins, 1);
    db.close().await;
}

// === Contact message tests ===

#[tokio::test]
async fn identical_contact_messages_are_allowed() {
    let db = test_db().await;
    let msg = NewContactMessage {
        name: "Bob",
        email: "bob@b.com",
        message: "hello",
    };

    let first = db.insert_contact_message(msg).await.unwrap();
    let second = db.insert_contact_message(msg).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.message, second.message);
    assert_eq!(db.list_contact_messages().await.unwrap().len(), 2);
}

#[tokio::test]
async fn inserted_contact_message_is_stored_row() {
    let db = test_db().await;
    let inserted = db
        .insert_contact_message(NewContactMessage {
            name: "Bob",
            email: "bob@b.com",
            message: "hello",
        })
        .await
        .unwrap();

    let stored = db.get_contact_message(&inserted.id).await.unwrap();
    assert_eq!(stored, inserted);
}

// === Post tests ===

#[tokio::test]
async fn post_links_keep_order() {
    let db = test_db().await;
    let links = vec![
        "https://z.example".to_string(),
        "https://a.example".to_string(),
        "https://m.example".to_string(),
    ];
    let post = db
        .insert_post(NewPost {
            media_hash: "Qm123",
            body: "body",
            title: "title",
            links: &links,
        })
        .await
        .unwrap();

    assert_eq!(post.links, links);
    assert_eq!(db.get_post(&post.id).await.unwrap(), post);
}

#[tokio::test]
async fn post_without_links_has_empty_list() {
    let db = test_db().await;
    let post = db
        .insert_post(NewPost {
            media_hash: "Qm123",
            body: "body",
            title: "title",
            links: &[],
        })
        .await
        .unwrap();

    assert!(post.links.is_empty());
}

#[tokio::test]
async fn list_posts_returns_all() {
    let db = test_db().await;
    for title in ["P1", "P2"] {
        db.insert_post(NewPost {
            media_hash: "hash",
            body: "body",
            title,
            links: &[],
        })
        .await
        .unwrap();
    }

    let titles: Vec<String> = db
        .list_posts()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["P1", "P2"]);
}

#[tokio::test]
async fn corrupt_links_fail_to_decode() {
    let db = test_db().await;
    sqlx::query(
        "INSERT INTO posts (id, media_hash, body, title, links, created_at, updated_at) VALUES ('p1', 'h', 'b', 't', 'not json', 0, 0)",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = db.list_posts().await.unwrap_err();
    assert!(err.to_string().contains("Decode error"), "{err}");
}

// === Admin / lifecycle tests ===

#[tokio::test]
async fn admin_data_holds_both_collections() {
    let db = test_db().await;
    db.insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();
    db.insert_contact_message(NewContactMessage {
        name: "Bob",
        email: "bob@b.com",
        message: "hi",
    })
    .await
    .unwrap();

    let data = db.admin_data().await.unwrap();
    assert_eq!(data.registrations.len(), 1);
    assert_eq!(data.contact_messages.len(), 1);
}

#[tokio::test]
async fn closed_store_fails_with_storage_error() {
    let db = test_db().await;
    db.ping().await.unwrap();
    db.close().await;

    assert!(db.ping().await.is_err());
    let err = db
        .insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Failure(_)));
}

#[tokio::test]
async fn reopening_file_store_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    let db = RecordStore::open(&path).await.unwrap();
    db.insert_registration(registration("a@b.com", "ann1"))
        .await
        .unwrap();
    db.close().await;

    let db = RecordStore::open(&path).await.unwrap();
    let regs = db.list_registrations().await.unwrap();
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].email, "a@b.com");
}
