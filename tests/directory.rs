//! Runs against the PostgreSQL database named by `DATABASE_URL`. Each test
//! works inside its own schema, so tests can run in parallel on one database.
//! Without `DATABASE_URL` the tests return immediately.

use std::sync::atomic::{AtomicUsize, Ordering};

use client_directory::{Client, ClientChanges, ClientFilter, Directory, DirectoryError, Phones};

static NEXT_SCHEMA: AtomicUsize = AtomicUsize::new(0);

struct TestDb {
    dir: Directory,
    schema: String,
}

impl TestDb {
    async fn open() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let mut dir = Directory::connect(&url).await.expect("connect");

        let schema = format!(
            "client_directory_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
        );
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema))
            .execute(dir.connection())
            .await
            .expect("drop stale schema");
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(dir.connection())
            .await
            .expect("create schema");
        sqlx::query(&format!("SET search_path TO {}", schema))
            .execute(dir.connection())
            .await
            .expect("set search_path");

        dir.ensure_schema().await.expect("ensure schema");

        Some(Self { dir, schema })
    }

    async fn count(&mut self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.dir.connection())
            .await
            .expect("count rows")
    }

    async fn phones_of(&mut self, client_id: i32) -> Vec<String> {
        self.dir
            .get_phones(client_id)
            .await
            .expect("get phones")
            .into_iter()
            .filter_map(|p| p.phone)
            .collect()
    }

    async fn finish(mut self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(self.dir.connection())
            .await
            .expect("drop schema");
        self.dir.close().await.expect("close");
    }
}

fn client(id: i32, first: &str, last: &str, email: &str) -> Client {
    Client {
        id,
        first_name: first.into(),
        last_name: last.into(),
        email: email.into(),
    }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let Some(mut db) = TestDb::open().await else { return };

    let id = db.dir.add_client("Ann", "Lee", "ann@x.com", Some("+1".into())).await.unwrap();
    db.dir.ensure_schema().await.unwrap();
    db.dir.ensure_schema().await.unwrap();

    assert_eq!(db.count("client_info").await, 1);
    assert_eq!(db.phones_of(id).await, vec!["+1"]);

    db.finish().await;
}

#[tokio::test]
async fn sample_session() {
    let Some(mut db) = TestDb::open().await else { return };

    let id = db.dir.add_client("Ann", "Lee", "ann@x.com", Some("+1".into())).await.unwrap();
    assert_eq!(id, 1);

    db.dir.add_phone(1, "+2").await.unwrap();
    let found = db.dir.find_client(&ClientFilter::new().phone("+2")).await.unwrap();
    assert_eq!(found, vec![client(1, "Ann", "Lee", "ann@x.com")]);

    let changes = ClientChanges::new().email("ann2@x.com").phones(["+3"]);
    db.dir.change_client(1, &changes).await.unwrap();

    let found = db.dir.find_client(&ClientFilter::new().phone("+1")).await.unwrap();
    assert!(found.is_empty());
    let found = db.dir.find_client(&ClientFilter::new().phone("+3")).await.unwrap();
    assert_eq!(found, vec![client(1, "Ann", "Lee", "ann2@x.com")]);

    db.dir.delete_client(1).await.unwrap();
    let found = db.dir.find_client(&ClientFilter::new().first_name("Ann")).await.unwrap();
    assert!(found.is_empty());

    db.finish().await;
}

#[tokio::test]
async fn client_with_many_phones_is_found_once() {
    let Some(mut db) = TestDb::open().await else { return };

    let ann = db
        .dir
        .add_client("Ann", "Lee", "ann@x.com", Some(["+1", "+2", "+3"].into()))
        .await
        .unwrap();
    let bob = db.dir.add_client("Bob", "Lee", "bob@x.com", None).await.unwrap();

    let all = db.dir.find_client(&ClientFilter::new()).await.unwrap();
    assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ann, bob]);

    let by_phone = db.dir.find_client(&ClientFilter::new().phone("+2")).await.unwrap();
    assert_eq!(by_phone.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ann]);

    // Clients without phones still match non-phone filters
    let by_last = db.dir.find_client(&ClientFilter::new().last_name("Lee")).await.unwrap();
    assert_eq!(by_last.len(), 2);

    let none = db
        .dir
        .find_client(&ClientFilter::new().first_name("Bob").phone("+1"))
        .await
        .unwrap();
    assert!(none.is_empty());

    db.finish().await;
}

#[tokio::test]
async fn duplicate_email_leaves_no_rows() {
    let Some(mut db) = TestDb::open().await else { return };

    db.dir.add_client("Ann", "Lee", "ann@x.com", None).await.unwrap();
    let err = db
        .dir
        .add_client("Anna", "Li", "ann@x.com", Some(["+7", "+8"].into()))
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::UniqueViolation { .. }), "{:?}", err);
    assert_eq!(db.count("client_info").await, 1);
    assert_eq!(db.count("number_client").await, 0);

    db.finish().await;
}

#[tokio::test]
async fn phone_for_unknown_client_is_rejected() {
    let Some(mut db) = TestDb::open().await else { return };

    let err = db.dir.add_phone(42, "+1").await.unwrap_err();
    assert!(err.is_foreign_key_violation(), "{:?}", err);
    assert_eq!(db.count("number_client").await, 0);

    db.finish().await;
}

#[tokio::test]
async fn empty_phone_set_differs_from_omitted_phones() {
    let Some(mut db) = TestDb::open().await else { return };

    let id = db
        .dir
        .add_client("Ann", "Lee", "ann@x.com", Some(["+1", "+2"].into()))
        .await
        .unwrap();

    db.dir.change_client(id, &ClientChanges::new()).await.unwrap();
    db.dir.change_client(id, &ClientChanges::new().first_name("Anne")).await.unwrap();
    assert_eq!(db.phones_of(id).await, vec!["+1", "+2"]);

    db.dir
        .change_client(id, &ClientChanges::new().phones(Phones::empty()))
        .await
        .unwrap();
    assert!(db.phones_of(id).await.is_empty());

    let stored = db.dir.get_client(id).await.unwrap().unwrap();
    assert_eq!(stored, client(id, "Anne", "Lee", "ann@x.com"));

    db.finish().await;
}

#[tokio::test]
async fn change_to_taken_email_rolls_back_everything() {
    let Some(mut db) = TestDb::open().await else { return };

    db.dir.add_client("Ann", "Lee", "ann@x.com", None).await.unwrap();
    let bob = db.dir.add_client("Bob", "Ray", "bob@x.com", Some("+5".into())).await.unwrap();

    let changes = ClientChanges::new().first_name("Robert").email("ann@x.com").phones(["+6"]);
    let err = db.dir.change_client(bob, &changes).await.unwrap_err();
    assert!(err.is_unique_violation(), "{:?}", err);

    let stored = db.dir.get_client(bob).await.unwrap().unwrap();
    assert_eq!(stored, client(bob, "Bob", "Ray", "bob@x.com"));
    assert_eq!(db.phones_of(bob).await, vec!["+5"]);

    db.finish().await;
}

#[tokio::test]
async fn changing_unknown_client_is_a_no_op() {
    let Some(mut db) = TestDb::open().await else { return };

    db.dir
        .change_client(99, &ClientChanges::new().last_name("Nobody"))
        .await
        .unwrap();
    assert!(db.dir.get_client(99).await.unwrap().is_none());

    db.finish().await;
}

#[tokio::test]
async fn delete_phone_removes_every_match() {
    let Some(mut db) = TestDb::open().await else { return };

    let id = db
        .dir
        .add_client("Ann", "Lee", "ann@x.com", Some(["+1", "+2", "+1"].into()))
        .await
        .unwrap();

    assert_eq!(db.dir.delete_phone(id, "+9").await.unwrap(), 0);
    assert_eq!(db.dir.delete_phone(id, "+1").await.unwrap(), 2);
    assert_eq!(db.phones_of(id).await, vec!["+2"]);

    db.finish().await;
}

#[tokio::test]
async fn delete_client_cascades_to_phones() {
    let Some(mut db) = TestDb::open().await else { return };

    let ann = db
        .dir
        .add_client("Ann", "Lee", "ann@x.com", Some(["+1", "+2"].into()))
        .await
        .unwrap();
    let bob = db.dir.add_client("Bob", "Ray", "bob@x.com", Some("+3".into())).await.unwrap();

    assert_eq!(db.dir.delete_client(ann).await.unwrap(), 1);
    assert!(db.phones_of(ann).await.is_empty());
    assert!(db.dir.get_client(ann).await.unwrap().is_none());
    assert_eq!(db.phones_of(bob).await, vec!["+3"]);

    assert_eq!(db.dir.delete_client(ann).await.unwrap(), 0);

    db.finish().await;
}
