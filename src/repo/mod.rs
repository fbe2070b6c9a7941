use std::sync::Arc;

use async_trait::async_trait;

use crate::domain_error::Resource;
use crate::models::*;

#[cfg(feature = "inmem-store")]
pub mod inmem;
#[cfg(feature = "postgres-store")]
pub mod pg;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("{0} '{1}' not found")]
    NotFound(Resource, Id),
    #[error("'{actor}' does not own {resource} '{id}'")]
    Forbidden { resource: Resource, id: Id, actor: Id },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Produces the random part of new ids; adapters prefix it with the entity kind.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

pub fn default_id_generator() -> IdGenerator {
    Arc::new(nanoid)
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn add_thread(&self, new: AddThread) -> RepoResult<AddedThread>;
    async fn get_thread_by_id(&self, id: &str) -> RepoResult<Option<Thread>>;
    /// `NotFound` when no such thread exists.
    async fn verify_thread_availability(&self, id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn add_comment(&self, new: AddComment) -> RepoResult<AddedComment>;
    /// Only returns comments that have not been deleted.
    async fn get_comment_by_id(&self, id: &str) -> RepoResult<Option<CommentRecord>>;
    /// Oldest first, deleted comments included but masked, replies nested.
    async fn get_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>>;
    /// Sets `deleted_at` once; repeated calls are no-ops.
    async fn delete_comment_by_id(&self, id: &str) -> RepoResult<()>;
    /// `NotFound` when the comment is absent or already deleted.
    async fn verify_comment_availability(&self, id: &str) -> RepoResult<()>;
    /// `NotFound` when absent, `Forbidden` when `owner` did not write it.
    async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()>;
    /// `NotFound` unless the comment exists and was posted on `thread_id`.
    async fn verify_comment_in_thread(&self, id: &str, thread_id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait ReplyRepo: Send + Sync {
    async fn add_reply(&self, new: AddReply) -> RepoResult<AddedReply>;
    /// Replies one user left on one comment, oldest first.
    async fn find_replies_by_comment(&self, lookup: &ReplyLookup) -> RepoResult<Vec<Reply>>;
    async fn delete_reply(&self, id: &str) -> RepoResult<()>;
    async fn verify_reply_availability(&self, id: &str) -> RepoResult<()>;
    async fn verify_reply_owner(&self, id: &str, user_id: &str) -> RepoResult<()>;
    /// `NotFound` unless the reply exists and answers `comment_id`.
    async fn verify_reply_in_comment(&self, id: &str, comment_id: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait LikeRepo: Send + Sync {
    async fn add_like(&self, new: AddLike) -> RepoResult<AddedLike>;
    async fn update_like(&self, upd: UpdateLike) -> RepoResult<UpdatedLike>;
    async fn exist(&self, key: &LikeKey) -> RepoResult<bool>;
    async fn find_like_by_comment(&self, key: &LikeKey) -> RepoResult<Option<Like>>;
    /// Flips `is_liked` on the existing row or inserts a liked one, atomically.
    async fn reverse(&self, key: &LikeKey) -> RepoResult<Like>;
}

pub trait Repo: ThreadRepo + CommentRepo + ReplyRepo + LikeRepo {}

impl<T> Repo for T where T: ThreadRepo + CommentRepo + ReplyRepo + LikeRepo {}
