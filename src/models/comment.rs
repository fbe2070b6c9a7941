use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{FromPayload, Id, Payload, Reply, DELETED_COMMENT_CONTENT};
use crate::domain_error::{DomainResult, Scope};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddComment {
    pub thread_id: Id,
    pub content: String,
    /// Parent comment; kept for schema compatibility, always `None` from the HTTP surface.
    pub comment_id: Option<Id>,
    pub owner: Id,
}

impl FromPayload for AddComment {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddComment, payload);
        p.require(&["threadId", "content", "owner"])?;
        p.require_keys(&["commentId"])?;
        Ok(Self {
            thread_id: p.string("threadId")?,
            content: p.string("content")?,
            comment_id: p.nullable_string("commentId")?,
            owner: p.string("owner")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct AddedComment {
    pub id: Id,
    pub content: String,
    pub owner: Id,
}

impl FromPayload for AddedComment {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddedComment, payload);
        p.require(&["id", "content", "owner"])?;
        Ok(Self {
            id: p.string("id")?,
            content: p.string("content")?,
            owner: p.string("owner")?,
        })
    }
}

/// Raw, non-deleted comment row as returned by a point lookup.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Id,
    pub content: String,
    pub owner: Id,
    pub username: String,
    pub date: DateTime<Utc>,
}

/// A comment as rendered inside a thread detail.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub username: String,
    pub date: DateTime<Utc>,
    pub content: String,
    pub like_count: i64,
    pub replies: Vec<Reply>,
}

impl Comment {
    /// Deleted comments keep their slot in the thread but not their text.
    pub fn new(
        id: Id,
        username: String,
        date: DateTime<Utc>,
        content: String,
        is_deleted: bool,
        like_count: i64,
    ) -> Self {
        Self {
            id,
            username,
            date,
            content: if is_deleted { DELETED_COMMENT_CONTENT.to_string() } else { content },
            like_count,
            replies: Vec::new(),
        }
    }

    pub fn with_replies(mut self, replies: Vec<Reply>) -> Self {
        self.replies = replies;
        self
    }
}

impl FromPayload for Comment {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::Comment, payload);
        p.require(&["id", "content", "date", "username"])?;
        p.require_defined(&["isDeleted", "likeCount"])?;
        let comment = Comment::new(
            p.string("id")?,
            p.string("username")?,
            p.timestamp("date")?,
            p.string("content")?,
            p.boolean("isDeleted")?,
            p.count("likeCount")?,
        );
        Ok(comment.with_replies(p.list("replies")?))
    }
}
