use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{FromPayload, Id, Payload, DELETED_REPLY_CONTENT};
use crate::domain_error::{DomainResult, Scope};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddReply {
    pub thread_id: Id,
    pub comment_id: Id,
    pub content: String,
    pub user_id: Id,
}

impl FromPayload for AddReply {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddReply, payload);
        p.require(&["threadId", "commentId", "content", "userId"])?;
        Ok(Self {
            thread_id: p.string("threadId")?,
            comment_id: p.string("commentId")?,
            content: p.string("content")?,
            user_id: p.string("userId")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct AddedReply {
    pub id: Id,
    pub content: String,
    pub owner: Id,
}

impl FromPayload for AddedReply {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddedReply, payload);
        p.require(&["id", "content", "owner"])?;
        Ok(Self {
            id: p.string("id")?,
            content: p.string("content")?,
            owner: p.string("owner")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLookup {
    pub comment_id: Id,
    pub user_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Reply {
    pub id: Id,
    pub content: String,
    pub date: DateTime<Utc>,
    pub username: String,
}

impl Reply {
    pub fn new(id: Id, username: String, date: DateTime<Utc>, content: String, is_deleted: bool) -> Self {
        Self {
            id,
            content: if is_deleted { DELETED_REPLY_CONTENT.to_string() } else { content },
            date,
            username,
        }
    }
}

impl FromPayload for Reply {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::Reply, payload);
        p.require(&["id", "content", "date", "username"])?;
        p.require_defined(&["isDeleted"])?;
        Ok(Reply::new(
            p.string("id")?,
            p.string("username")?,
            p.timestamp("date")?,
            p.string("content")?,
            p.boolean("isDeleted")?,
        ))
    }
}
