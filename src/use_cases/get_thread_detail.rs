use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain_error::{DomainError, DomainResult, Resource, Scope, ValidationReason};
use crate::models::ThreadDetail;
use crate::repo::{CommentRepo, ThreadRepo};

const SCOPE: Scope = Scope::GetThreadDetailUseCase;

pub struct GetThreadDetailUseCase {
    thread_repo: Arc<dyn ThreadRepo>,
    comment_repo: Arc<dyn CommentRepo>,
}

impl GetThreadDetailUseCase {
    pub fn new(thread_repo: Arc<dyn ThreadRepo>, comment_repo: Arc<dyn CommentRepo>) -> Self {
        Self { thread_repo, comment_repo }
    }

    /// The payload is the bare thread id.
    pub async fn execute(&self, payload: &Value) -> DomainResult<ThreadDetail> {
        let thread_id = match payload {
            Value::Null => return Err(DomainError::validation(SCOPE, ValidationReason::NotContainNeededProperty)),
            Value::String(s) if s.is_empty() => {
                return Err(DomainError::validation(SCOPE, ValidationReason::NotContainNeededProperty))
            }
            Value::String(s) => s.as_str(),
            _ => return Err(DomainError::validation(SCOPE, ValidationReason::PayloadNotMeetDataTypeSpecification)),
        };

        self.thread_repo.verify_thread_availability(thread_id).await?;
        let thread = self
            .thread_repo
            .get_thread_by_id(thread_id)
            .await?
            .ok_or_else(|| DomainError::NotFound { resource: Resource::Thread, id: thread_id.to_string() })?;
        let comments = self.comment_repo.get_comments_by_thread(thread_id).await?;
        debug!(thread_id, comments = comments.len(), "thread detail assembled");
        Ok(ThreadDetail::new(thread, comments))
    }
}
