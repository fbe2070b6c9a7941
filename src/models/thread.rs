use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{Comment, FromPayload, Id, Payload};
use crate::domain_error::{DomainResult, Scope};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AddThread {
    pub title: String,
    pub body: String,
    pub owner: Id,
}

impl FromPayload for AddThread {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddThread, payload);
        p.require(&["title", "body", "owner"])?;
        Ok(Self {
            title: p.string("title")?,
            body: p.string("body")?,
            owner: p.string("owner")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct AddedThread {
    pub id: Id,
    pub title: String,
    pub owner: Id,
}

impl FromPayload for AddedThread {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddedThread, payload);
        p.require(&["id", "title", "owner"])?;
        Ok(Self {
            id: p.string("id")?,
            title: p.string("title")?,
            owner: p.string("owner")?,
        })
    }
}

/// A thread as rendered to readers: owner resolved to a username.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
pub struct Thread {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub username: String,
}

impl FromPayload for Thread {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::Thread, payload);
        p.require(&["id", "title", "body", "date", "username"])?;
        Ok(Self {
            id: p.string("id")?,
            title: p.string("title")?,
            body: p.string("body")?,
            date: p.timestamp("date")?,
            username: p.string("username")?,
        })
    }
}

/// Thread plus its comments, each with nested replies.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ThreadDetail {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub username: String,
    pub comments: Vec<Comment>,
}

impl ThreadDetail {
    pub fn new(thread: Thread, comments: Vec<Comment>) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            body: thread.body,
            date: thread.date,
            username: thread.username,
            comments,
        }
    }
}
