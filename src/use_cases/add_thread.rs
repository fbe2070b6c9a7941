use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainError, DomainResult, Scope, ValidationReason};
use crate::models::{AddThread, AddedThread, FromPayload, Payload};
use crate::repo::ThreadRepo;

pub struct AddThreadUseCase {
    thread_repo: Arc<dyn ThreadRepo>,
}

impl AddThreadUseCase {
    pub fn new(thread_repo: Arc<dyn ThreadRepo>) -> Self {
        Self { thread_repo }
    }

    pub async fn execute(&self, payload: &Value) -> DomainResult<AddedThread> {
        if Payload::new(Scope::AddThreadUseCase, payload).is_absent() {
            return Err(DomainError::validation(Scope::AddThreadUseCase, ValidationReason::NotContainNeededProperty));
        }
        let new = AddThread::from_payload(payload)?;
        let added = self.thread_repo.add_thread(new).await?;
        info!(thread_id = %added.id, owner = %added.owner, "thread created");
        Ok(added)
    }
}
