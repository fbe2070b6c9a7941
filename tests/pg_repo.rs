#![cfg(feature = "postgres-store")]

//! Runs against a live database; every test returns early when `DATABASE_URL` is unset.

use chrono::{DateTime, Utc};
use forum::domain_error::Resource;
use forum::models::{nanoid, AddComment, AddReply, AddThread, LikeKey, DELETED_COMMENT_CONTENT};
use forum::repo::pg::PgRepo;
use forum::repo::{CommentRepo, LikeRepo, ReplyRepo, RepoError, ThreadRepo};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;

async fn repo() -> Option<PgRepo> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    Some(PgRepo::new(pool))
}

/// Inserts a user with a unique id and returns it.
async fn user(r: &PgRepo, username: &str) -> String {
    let id = format!("user-{}", nanoid());
    sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(&id)
        .bind(format!("{username}-{}", nanoid()))
        .execute(r.pool())
        .await
        .unwrap();
    id
}

async fn thread(r: &PgRepo, owner: &str) -> String {
    r.add_thread(AddThread { title: "A thread".into(), body: "Body".into(), owner: owner.into() })
        .await
        .unwrap()
        .id
}

async fn comment(r: &PgRepo, thread_id: &str, owner: &str) -> String {
    r.add_comment(AddComment { thread_id: thread_id.into(), content: "hi".into(), comment_id: None, owner: owner.into() })
        .await
        .unwrap()
        .id
}

async fn deleted_at(r: &PgRepo, table: &str, id: &str) -> Option<DateTime<Utc>> {
    sqlx::query_scalar::<_, Option<DateTime<Utc>>>(&format!("SELECT deleted_at FROM {table} WHERE id = $1"))
        .bind(id)
        .fetch_one(r.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn comment_is_scoped_to_its_thread() {
    let Some(r) = repo().await else { return };
    let owner = user(&r, "owner").await;
    let t1 = thread(&r, &owner).await;
    let t2 = thread(&r, &owner).await;
    let c = comment(&r, &t1, &owner).await;

    r.verify_comment_in_thread(&c, &t1).await.unwrap();
    assert!(matches!(
        r.verify_comment_in_thread(&c, &t2).await.unwrap_err(),
        RepoError::NotFound(Resource::Comment, _)
    ));
}

#[tokio::test]
#[serial]
async fn thread_detail_reads_back() {
    let Some(r) = repo().await else { return };
    let owner = user(&r, "dicoding").await;
    let t = thread(&r, &owner).await;
    assert!(t.starts_with("thread-"));

    let found = r.get_thread_by_id(&t).await.unwrap().unwrap();
    assert!(found.username.starts_with("dicoding-"));
    r.verify_thread_availability(&t).await.unwrap();
    assert!(matches!(
        r.verify_thread_availability("thread-missing").await.unwrap_err(),
        RepoError::NotFound(Resource::Thread, _)
    ));
}

#[tokio::test]
#[serial]
async fn comment_soft_delete_and_ownership() {
    let Some(r) = repo().await else { return };
    let owner = user(&r, "owner").await;
    let t = thread(&r, &owner).await;
    let c = comment(&r, &t, &owner).await;

    assert!(matches!(
        r.verify_comment_owner(&c, "user-stranger").await.unwrap_err(),
        RepoError::Forbidden { resource: Resource::Comment, .. }
    ));
    r.verify_comment_owner(&c, &owner).await.unwrap();

    r.delete_comment_by_id(&c).await.unwrap();
    let first = deleted_at(&r, "comments", &c).await;
    assert!(first.is_some());
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    r.delete_comment_by_id(&c).await.unwrap();
    assert_eq!(deleted_at(&r, "comments", &c).await, first);
    assert!(r.verify_comment_availability(&c).await.is_err());
    assert!(r.get_comment_by_id(&c).await.unwrap().is_none());

    let listed = r.get_comments_by_thread(&t).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, DELETED_COMMENT_CONTENT);
}

#[tokio::test]
#[serial]
async fn replies_nest_under_their_comment() {
    let Some(r) = repo().await else { return };
    let owner = user(&r, "owner").await;
    let replier = user(&r, "replier").await;
    let t = thread(&r, &owner).await;
    let c = comment(&r, &t, &owner).await;

    let added = r
        .add_reply(AddReply { thread_id: t.clone(), comment_id: c.clone(), content: "r".into(), user_id: replier.clone() })
        .await
        .unwrap();
    assert_eq!(added.owner, replier);
    r.verify_reply_owner(&added.id, &replier).await.unwrap();
    r.verify_reply_in_comment(&added.id, &c).await.unwrap();
    assert!(matches!(
        r.verify_reply_in_comment(&added.id, "comment-elsewhere").await.unwrap_err(),
        RepoError::NotFound(Resource::Reply, _)
    ));

    r.delete_reply(&added.id).await.unwrap();
    let first = deleted_at(&r, "replies", &added.id).await;
    assert!(first.is_some());
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    r.delete_reply(&added.id).await.unwrap();
    assert_eq!(deleted_at(&r, "replies", &added.id).await, first);
    assert!(r.verify_reply_availability(&added.id).await.is_err());

    let listed = r.get_comments_by_thread(&t).await.unwrap();
    assert_eq!(listed[0].replies.len(), 1);
    assert_eq!(listed[0].replies[0].content, "**balasan telah dihapus**");
}

#[tokio::test]
#[serial]
async fn reverse_is_an_atomic_toggle() {
    let Some(r) = repo().await else { return };
    let owner = user(&r, "owner").await;
    let t = thread(&r, &owner).await;
    let c = comment(&r, &t, &owner).await;
    let key = LikeKey { comment_id: c.clone(), user_id: owner.clone() };

    let mut states = Vec::new();
    for _ in 0..3 {
        states.push(r.reverse(&key).await.unwrap().is_liked);
    }
    assert_eq!(states, vec![true, false, true]);
    assert!(r.exist(&key).await.unwrap());
    assert_eq!(r.get_comments_by_thread(&t).await.unwrap()[0].like_count, 1);
}
