use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tracing::{debug, error};

use super::*;

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.code().as_deref() == Some("23505") {
                return RepoError::Conflict(db.message().to_string());
            }
        }
        error!("postgres error: {e}");
        RepoError::Internal(e.to_string())
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Id,
    username: String,
    date: DateTime<Utc>,
    content: String,
    is_deleted: bool,
    like_count: i64,
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: Id,
    comment_id: Id,
    username: String,
    date: DateTime<Utc>,
    content: String,
    is_deleted: bool,
}

impl ReplyRow {
    fn into_reply(self) -> Reply {
        Reply::new(self.id, self.username, self.date, self.content, self.is_deleted)
    }
}

const LIKE_COLUMNS: &str = "id, comment_id, user_id, is_liked, updated_at";

#[derive(Clone)]
pub struct PgRepo {
    pool: Pool<Postgres>,
    ids: IdGenerator,
}

impl PgRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_id_generator(pool, default_id_generator())
    }

    pub fn with_id_generator(pool: Pool<Postgres>, ids: IdGenerator) -> Self {
        Self { pool, ids }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    fn next_id(&self, prefix: &str) -> Id {
        format!("{prefix}-{}", (self.ids)())
    }
}

#[async_trait]
impl ThreadRepo for PgRepo {
    async fn add_thread(&self, new: AddThread) -> RepoResult<AddedThread> {
        let rec = sqlx::query_as::<_, AddedThread>(
            "INSERT INTO threads (id, title, body, owner) VALUES ($1,$2,$3,$4) RETURNING id, title, owner",
        )
        .bind(self.next_id("thread"))
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn get_thread_by_id(&self, id: &str) -> RepoResult<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(r#"
            SELECT t.id, t.title, t.body, t.date, COALESCE(u.username, t.owner) AS username
            FROM threads t
            LEFT JOIN users u ON u.id = t.owner
            WHERE t.id = $1
        "#)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(thread)
    }

    async fn verify_thread_availability(&self, id: &str) -> RepoResult<()> {
        sqlx::query_scalar::<_, String>("SELECT id FROM threads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(Resource::Thread, id.to_string()))
    }
}

#[async_trait]
impl CommentRepo for PgRepo {
    async fn add_comment(&self, new: AddComment) -> RepoResult<AddedComment> {
        let rec = sqlx::query_as::<_, AddedComment>(
            "INSERT INTO comments (id, thread_id, content, comment_id, owner) VALUES ($1,$2,$3,$4,$5) RETURNING id, content, owner",
        )
        .bind(self.next_id("comment"))
        .bind(&new.thread_id)
        .bind(&new.content)
        .bind(new.comment_id.as_ref())
        .bind(&new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn get_comment_by_id(&self, id: &str) -> RepoResult<Option<CommentRecord>> {
        let rec = sqlx::query_as::<_, CommentRecord>(r#"
            SELECT c.id, c.content, c.owner, COALESCE(u.username, c.owner) AS username, c.date
            FROM comments c
            LEFT JOIN users u ON u.id = c.owner
            WHERE c.deleted_at IS NULL AND c.id = $1
        "#)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn get_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, CommentRow>(r#"
            SELECT c.id, COALESCE(u.username, c.owner) AS username, c.date, c.content,
                   c.deleted_at IS NOT NULL AS is_deleted,
                   (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id AND l.is_liked) AS like_count
            FROM comments c
            LEFT JOIN users u ON u.id = c.owner
            WHERE c.thread_id = $1
            ORDER BY c.date ASC, c.id ASC
        "#)
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        let replies = sqlx::query_as::<_, ReplyRow>(r#"
            SELECT r.id, r.comment_id, COALESCE(u.username, r.user_id) AS username,
                   r.created_at AS date, r.content, r.deleted_at IS NOT NULL AS is_deleted
            FROM replies r
            JOIN comments c ON c.id = r.comment_id
            LEFT JOIN users u ON u.id = r.user_id
            WHERE c.thread_id = $1
            ORDER BY r.created_at ASC, r.id ASC
        "#)
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_comment: HashMap<Id, Vec<Reply>> = HashMap::new();
        for row in replies {
            by_comment.entry(row.comment_id.clone()).or_default().push(row.into_reply());
        }

        Ok(comments
            .into_iter()
            .map(|c| {
                let replies = by_comment.remove(&c.id).unwrap_or_default();
                Comment::new(c.id, c.username, c.date, c.content, c.is_deleted, c.like_count).with_replies(replies)
            })
            .collect())
    }

    async fn delete_comment_by_id(&self, id: &str) -> RepoResult<()> {
        let res = sqlx::query("UPDATE comments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(comment_id = id, rows = res.rows_affected(), "comment soft-delete");
        Ok(())
    }

    async fn verify_comment_availability(&self, id: &str) -> RepoResult<()> {
        sqlx::query_scalar::<_, String>("SELECT id FROM comments WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(Resource::Comment, id.to_string()))
    }

    async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
        let actual = sqlx::query_scalar::<_, String>("SELECT owner FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::NotFound(Resource::Comment, id.to_string()))?;
        if actual != owner {
            return Err(RepoError::Forbidden { resource: Resource::Comment, id: id.to_string(), actor: owner.to_string() });
        }
        Ok(())
    }

    async fn verify_comment_in_thread(&self, id: &str, thread_id: &str) -> RepoResult<()> {
        sqlx::query_scalar::<_, String>("SELECT id FROM comments WHERE id = $1 AND thread_id = $2")
            .bind(id)
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(Resource::Comment, id.to_string()))
    }
}

#[async_trait]
impl ReplyRepo for PgRepo {
    async fn add_reply(&self, new: AddReply) -> RepoResult<AddedReply> {
        let rec = sqlx::query_as::<_, AddedReply>(
            "INSERT INTO replies (id, comment_id, user_id, content) VALUES ($1,$2,$3,$4) RETURNING id, content, user_id AS owner",
        )
        .bind(self.next_id("reply"))
        .bind(&new.comment_id)
        .bind(&new.user_id)
        .bind(&new.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn find_replies_by_comment(&self, lookup: &ReplyLookup) -> RepoResult<Vec<Reply>> {
        let rows = sqlx::query_as::<_, ReplyRow>(r#"
            SELECT r.id, r.comment_id, COALESCE(u.username, r.user_id) AS username,
                   r.created_at AS date, r.content, r.deleted_at IS NOT NULL AS is_deleted
            FROM replies r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.comment_id = $1 AND r.user_id = $2
            ORDER BY r.created_at ASC, r.id ASC
        "#)
        .bind(&lookup.comment_id)
        .bind(&lookup.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ReplyRow::into_reply).collect())
    }

    async fn delete_reply(&self, id: &str) -> RepoResult<()> {
        sqlx::query("UPDATE replies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn verify_reply_availability(&self, id: &str) -> RepoResult<()> {
        sqlx::query_scalar::<_, String>("SELECT id FROM replies WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(Resource::Reply, id.to_string()))
    }

    async fn verify_reply_owner(&self, id: &str, user_id: &str) -> RepoResult<()> {
        let actual = sqlx::query_scalar::<_, String>("SELECT user_id FROM replies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::NotFound(Resource::Reply, id.to_string()))?;
        if actual != user_id {
            return Err(RepoError::Forbidden { resource: Resource::Reply, id: id.to_string(), actor: user_id.to_string() });
        }
        Ok(())
    }

    async fn verify_reply_in_comment(&self, id: &str, comment_id: &str) -> RepoResult<()> {
        sqlx::query_scalar::<_, String>("SELECT id FROM replies WHERE id = $1 AND comment_id = $2")
            .bind(id)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(Resource::Reply, id.to_string()))
    }
}

#[async_trait]
impl LikeRepo for PgRepo {
    async fn add_like(&self, new: AddLike) -> RepoResult<AddedLike> {
        let rec = sqlx::query_as::<_, AddedLike>(&format!(
            "INSERT INTO likes (id, comment_id, user_id) VALUES ($1,$2,$3) RETURNING {LIKE_COLUMNS}"
        ))
        .bind(self.next_id("like"))
        .bind(&new.comment_id)
        .bind(&new.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn update_like(&self, upd: UpdateLike) -> RepoResult<UpdatedLike> {
        sqlx::query_as::<_, UpdatedLike>(&format!(
            "UPDATE likes SET comment_id = $2, user_id = $3, is_liked = $4, updated_at = NOW() WHERE id = $1 RETURNING {LIKE_COLUMNS}"
        ))
        .bind(&upd.id)
        .bind(&upd.comment_id)
        .bind(&upd.user_id)
        .bind(upd.is_liked)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(Resource::Like, upd.id.clone()))
    }

    async fn exist(&self, key: &LikeKey) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE comment_id = $1 AND user_id = $2)",
        )
        .bind(&key.comment_id)
        .bind(&key.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn find_like_by_comment(&self, key: &LikeKey) -> RepoResult<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(&format!(
            "SELECT {LIKE_COLUMNS} FROM likes WHERE comment_id = $1 AND user_id = $2"
        ))
        .bind(&key.comment_id)
        .bind(&key.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(like)
    }

    async fn reverse(&self, key: &LikeKey) -> RepoResult<Like> {
        // likes_comment_user_key makes this a single atomic toggle-or-insert
        let like = sqlx::query_as::<_, Like>(&format!(r#"
            INSERT INTO likes (id, comment_id, user_id) VALUES ($1, $2, $3)
            ON CONFLICT (comment_id, user_id)
            DO UPDATE SET is_liked = NOT likes.is_liked, updated_at = NOW()
            RETURNING {LIKE_COLUMNS}
        "#))
        .bind(self.next_id("like"))
        .bind(&key.comment_id)
        .bind(&key.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(like)
    }
}
