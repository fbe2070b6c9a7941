use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainResult, Scope};
use crate::models::{Like, LikeKey, Payload};
use crate::repo::{CommentRepo, LikeRepo, ThreadRepo};

/// Flips the caller's like on a comment. The first call creates a liked row.
pub struct ReverseLikeOfCommentUseCase {
    thread_repo: Arc<dyn ThreadRepo>,
    comment_repo: Arc<dyn CommentRepo>,
    like_repo: Arc<dyn LikeRepo>,
}

impl ReverseLikeOfCommentUseCase {
    pub fn new(
        thread_repo: Arc<dyn ThreadRepo>,
        comment_repo: Arc<dyn CommentRepo>,
        like_repo: Arc<dyn LikeRepo>,
    ) -> Self {
        Self { thread_repo, comment_repo, like_repo }
    }

    pub async fn execute(&self, payload: &Value) -> DomainResult<Like> {
        let p = Payload::new(Scope::ReverseLikeOfCommentUseCase, payload);
        p.require(&["threadId", "commentId", "userId"])?;
        let thread_id = p.string("threadId")?;
        let key = LikeKey { comment_id: p.string("commentId")?, user_id: p.string("userId")? };

        self.thread_repo.verify_thread_availability(&thread_id).await?;
        self.comment_repo.verify_comment_availability(&key.comment_id).await?;
        self.comment_repo.verify_comment_in_thread(&key.comment_id, &thread_id).await?;
        // a single atomic toggle; concurrent first likes cannot create two rows
        let like = self.like_repo.reverse(&key).await?;
        info!(comment_id = %like.comment_id, user_id = %like.user_id, is_liked = like.is_liked, "like reversed");
        Ok(like)
    }
}
