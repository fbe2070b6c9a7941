use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainResult, Scope};
use crate::models::{AddComment, AddedComment, FromPayload, Payload};
use crate::repo::{CommentRepo, ThreadRepo};

pub struct AddCommentUseCase {
    comment_repo: Arc<dyn CommentRepo>,
    thread_repo: Arc<dyn ThreadRepo>,
}

impl AddCommentUseCase {
    pub fn new(comment_repo: Arc<dyn CommentRepo>, thread_repo: Arc<dyn ThreadRepo>) -> Self {
        Self { comment_repo, thread_repo }
    }

    pub async fn execute(&self, payload: &Value) -> DomainResult<AddedComment> {
        let p = Payload::new(Scope::AddCommentUseCase, payload);
        p.require(&["threadId", "content", "owner"])?;
        let thread_id = p.string("threadId")?;
        p.string("content")?;
        p.string("owner")?;

        // the thread must exist before anything is written
        self.thread_repo.verify_thread_availability(&thread_id).await?;
        let new = AddComment::from_payload(payload)?;
        let added = self.comment_repo.add_comment(new).await?;
        info!(comment_id = %added.id, thread_id = %thread_id, "comment added");
        Ok(added)
    }
}
