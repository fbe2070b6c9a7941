use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainError, DomainResult, Scope, ValidationReason};
use crate::models::Payload;
use crate::repo::{CommentRepo, ThreadRepo};

const SCOPE: Scope = Scope::DeleteCommentUseCase;

pub struct DeleteCommentUseCase {
    comment_repo: Arc<dyn CommentRepo>,
    thread_repo: Arc<dyn ThreadRepo>,
}

impl DeleteCommentUseCase {
    pub fn new(comment_repo: Arc<dyn CommentRepo>, thread_repo: Arc<dyn ThreadRepo>) -> Self {
        Self { comment_repo, thread_repo }
    }

    pub async fn execute(&self, payload: &Value) -> DomainResult<()> {
        let p = Payload::new(SCOPE, payload);
        if p.is_absent() {
            return Err(DomainError::validation(SCOPE, ValidationReason::NotContainAnyProperty));
        }
        p.require(&["commentId"])
            .map_err(|e| e.with_reason(ValidationReason::NotContainCommentId))?;
        p.require(&["threadId"])
            .map_err(|e| e.with_reason(ValidationReason::NotContainThreadId))?;
        p.require(&["owner"])
            .map_err(|e| e.with_reason(ValidationReason::NotContainOwner))?;

        let typed = |key: &'static str| {
            p.string(key).map_err(|e| e.with_reason(ValidationReason::PayloadNotMeetDataTypeSpecification))
        };
        let comment_id = typed("commentId")?;
        let thread_id = typed("threadId")?;
        let owner = typed("owner")?;

        self.thread_repo.verify_thread_availability(&thread_id).await?;
        self.comment_repo.verify_comment_availability(&comment_id).await?;
        self.comment_repo.verify_comment_in_thread(&comment_id, &thread_id).await?;
        self.comment_repo.verify_comment_owner(&comment_id, &owner).await?;
        self.comment_repo.delete_comment_by_id(&comment_id).await?;
        info!(comment_id = %comment_id, owner = %owner, "comment deleted");
        Ok(())
    }
}
