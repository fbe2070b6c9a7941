use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain_error::{DomainResult, Scope};
use crate::models::Payload;
use crate::repo::{CommentRepo, ReplyRepo, ThreadRepo};

pub struct DeleteReplyUseCase {
    thread_repo: Arc<dyn ThreadRepo>,
    comment_repo: Arc<dyn CommentRepo>,
    reply_repo: Arc<dyn ReplyRepo>,
}

impl DeleteReplyUseCase {
    pub fn new(
        thread_repo: Arc<dyn ThreadRepo>,
        comment_repo: Arc<dyn CommentRepo>,
        reply_repo: Arc<dyn ReplyRepo>,
    ) -> Self {
        Self { thread_repo, comment_repo, reply_repo }
    }

    /// Soft-deletes reply `id` on behalf of `userId`. When the payload also names
    /// its thread and comment, those are checked first and the reply must sit
    /// under them.
    pub async fn execute(&self, payload: &Value) -> DomainResult<()> {
        let p = Payload::new(Scope::DeleteReplyUseCase, payload);
        p.require(&["id", "userId"])?;
        let id = p.string("id")?;
        let user_id = p.string("userId")?;
        let thread_id = p.optional_string("threadId")?;
        let comment_id = p.optional_string("commentId")?;

        if let Some(thread_id) = &thread_id {
            self.thread_repo.verify_thread_availability(thread_id).await?;
        }
        if let Some(comment_id) = &comment_id {
            self.comment_repo.verify_comment_availability(comment_id).await?;
            if let Some(thread_id) = &thread_id {
                self.comment_repo.verify_comment_in_thread(comment_id, thread_id).await?;
            }
        }
        self.reply_repo.verify_reply_availability(&id).await?;
        if let Some(comment_id) = &comment_id {
            self.reply_repo.verify_reply_in_comment(&id, comment_id).await?;
        }
        self.reply_repo.verify_reply_owner(&id, &user_id).await?;
        self.reply_repo.delete_reply(&id).await?;
        info!(reply_id = %id, user_id = %user_id, "reply deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_error::{DomainError, Resource};
    use crate::use_cases::mock::MockRepo;
    use serde_json::json;

    fn use_case(repo: &Arc<MockRepo>) -> DeleteReplyUseCase {
        DeleteReplyUseCase::new(repo.clone(), repo.clone(), repo.clone())
    }

    fn seeded() -> Arc<MockRepo> {
        Arc::new(
            MockRepo::new()
                .with_thread("thread-123")
                .with_comment("comment-123", "user-123")
                .with_reply("reply-123", "user-123")
                .with_parent("comment-123", "thread-123")
                .with_parent("reply-123", "comment-123"),
        )
    }

    #[tokio::test]
    async fn full_payload_checks_every_parent() {
        let repo = seeded();
        use_case(&repo)
            .execute(&json!({
                "threadId": "thread-123",
                "commentId": "comment-123",
                "id": "reply-123",
                "userId": "user-123",
            }))
            .await
            .unwrap();

        assert_eq!(
            repo.calls(),
            vec![
                "verify_thread_availability(thread-123)",
                "verify_comment_availability(comment-123)",
                "verify_comment_in_thread(comment-123, thread-123)",
                "verify_reply_availability(reply-123)",
                "verify_reply_in_comment(reply-123, comment-123)",
                "verify_reply_owner(reply-123, user-123)",
                "delete_reply(reply-123)",
            ]
        );
    }

    #[tokio::test]
    async fn bare_payload_only_touches_the_reply() {
        let repo = seeded();
        use_case(&repo).execute(&json!({ "id": "reply-123", "userId": "user-123" })).await.unwrap();
        assert_eq!(repo.calls().len(), 3);
    }

    #[tokio::test]
    async fn validation_codes() {
        let repo = seeded();
        let err = use_case(&repo).execute(&json!({ "id": "reply-123" })).await.unwrap_err();
        assert_eq!(err.code().unwrap(), "DELETE_REPLY_USE_CASE.NOT_CONTAIN_NEEDED_PROPERTY");

        let err = use_case(&repo)
            .execute(&json!({ "id": "reply-123", "userId": "user-123", "threadId": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.code().unwrap(), "DELETE_REPLY_USE_CASE.NOT_MEET_DATA_TYPE_SPECIFICATION");
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_delete() {
        let repo = seeded();
        let err = use_case(&repo)
            .execute(&json!({ "id": "reply-123", "userId": "user-999" }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Authorization { resource: Resource::Reply, id: "reply-123".into(), actor: "user-999".into() }
        );
        assert!(!repo.calls().iter().any(|c| c.starts_with("delete_reply")));
    }

    #[tokio::test]
    async fn unknown_reply_is_not_found() {
        let repo = seeded();
        let err = use_case(&repo)
            .execute(&json!({ "id": "reply-404", "userId": "user-123" }))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound { resource: Resource::Reply, id: "reply-404".into() });
    }

    #[tokio::test]
    async fn reply_cannot_be_reached_through_another_comment() {
        // reply-123 lives under thread-123/comment-123; the caller owns it but
        // names a different, valid thread and comment
        let repo = Arc::new(
            MockRepo::new()
                .with_thread("thread-123")
                .with_thread("thread-456")
                .with_comment("comment-123", "user-123")
                .with_comment("comment-456", "user-456")
                .with_reply("reply-123", "user-123")
                .with_parent("comment-123", "thread-123")
                .with_parent("comment-456", "thread-456")
                .with_parent("reply-123", "comment-123"),
        );
        let err = use_case(&repo)
            .execute(&json!({
                "threadId": "thread-456",
                "commentId": "comment-456",
                "id": "reply-123",
                "userId": "user-123",
            }))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::NotFound { resource: Resource::Reply, id: "reply-123".into() });
        assert!(!repo.calls().iter().any(|c| c.starts_with("delete_reply")));
    }

    #[tokio::test]
    async fn comment_from_another_thread_is_not_found() {
        let repo = Arc::new(
            MockRepo::new()
                .with_thread("thread-123")
                .with_thread("thread-456")
                .with_comment("comment-123", "user-123")
                .with_reply("reply-123", "user-123")
                .with_parent("comment-123", "thread-123")
                .with_parent("reply-123", "comment-123"),
        );
        let err = use_case(&repo)
            .execute(&json!({
                "threadId": "thread-456",
                "commentId": "comment-123",
                "id": "reply-123",
                "userId": "user-123",
            }))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::NotFound { resource: Resource::Comment, id: "comment-123".into() });
        assert!(!repo.calls().iter().any(|c| c.starts_with("verify_reply")));
    }
}
