use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainResult, Scope};
use crate::models::{AddReply, AddedReply, FromPayload, Payload};
use crate::repo::{CommentRepo, ReplyRepo, ThreadRepo};

pub struct AddReplyUseCase {
    thread_repo: Arc<dyn ThreadRepo>,
    comment_repo: Arc<dyn CommentRepo>,
    reply_repo: Arc<dyn ReplyRepo>,
}

impl AddReplyUseCase {
    pub fn new(
        thread_repo: Arc<dyn ThreadRepo>,
        comment_repo: Arc<dyn CommentRepo>,
        reply_repo: Arc<dyn ReplyRepo>,
    ) -> Self {
        Self { thread_repo, comment_repo, reply_repo }
    }

    pub async fn execute(&self, payload: &Value) -> DomainResult<AddedReply> {
        let p = Payload::new(Scope::AddReplyUseCase, payload);
        p.require(&["threadId", "commentId", "content", "userId"])?;
        let thread_id = p.string("threadId")?;
        let comment_id = p.string("commentId")?;
        p.string("content")?;
        p.string("userId")?;

        self.thread_repo.verify_thread_availability(&thread_id).await?;
        self.comment_repo.verify_comment_availability(&comment_id).await?;
        self.comment_repo.verify_comment_in_thread(&comment_id, &thread_id).await?;
        let new = AddReply::from_payload(payload)?;
        let added = self.reply_repo.add_reply(new).await?;
        info!(reply_id = %added.id, comment_id = %comment_id, "reply added");
        Ok(added)
    }
}
