use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{FromPayload, Id, Payload};
use crate::domain_error::{DomainResult, Scope};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLike {
    pub comment_id: Id,
    pub user_id: Id,
}

impl FromPayload for AddLike {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::AddLike, payload);
        p.require(&["commentId", "userId"])?;
        Ok(Self {
            comment_id: p.string("commentId")?,
            user_id: p.string("userId")?,
        })
    }
}

/// Identifies the single like row a user may hold on a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikeKey {
    pub comment_id: Id,
    pub user_id: Id,
}

impl From<AddLike> for LikeKey {
    fn from(a: AddLike) -> Self {
        Self { comment_id: a.comment_id, user_id: a.user_id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLike {
    pub id: Id,
    pub comment_id: Id,
    pub user_id: Id,
    pub is_liked: bool,
}

impl FromPayload for UpdateLike {
    fn from_payload(payload: &Value) -> DomainResult<Self> {
        let p = Payload::new(Scope::UpdateLike, payload);
        p.require(&["id", "commentId", "userId"])?;
        p.require_defined(&["isLiked"])?;
        Ok(Self {
            id: p.string("id")?,
            comment_id: p.string("commentId")?,
            user_id: p.string("userId")?,
            is_liked: p.boolean("isLiked")?,
        })
    }
}

// Full like state; the three names only differ in the scope reported on bad input.
macro_rules! like_state {
    ($($(#[$meta:meta])* $name:ident => $scope:expr;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub id: Id,
            pub comment_id: Id,
            pub user_id: Id,
            pub is_liked: bool,
            pub updated_at: DateTime<Utc>,
        }

        impl FromPayload for $name {
            fn from_payload(payload: &Value) -> DomainResult<Self> {
                let p = Payload::new($scope, payload);
                p.require(&["id", "commentId", "userId", "updatedAt"])?;
                p.require_defined(&["isLiked"])?;
                Ok(Self {
                    id: p.string("id")?,
                    comment_id: p.string("commentId")?,
                    user_id: p.string("userId")?,
                    is_liked: p.boolean("isLiked")?,
                    updated_at: p.timestamp("updatedAt")?,
                })
            }
        }
    )+};
}

like_state! {
    /// Row created by an explicit insert.
    AddedLike => Scope::AddedLike;
    Like => Scope::Like;
    UpdatedLike => Scope::UpdatedLike;
}

impl From<AddedLike> for Like {
    fn from(a: AddedLike) -> Self {
        Self { id: a.id, comment_id: a.comment_id, user_id: a.user_id, is_liked: a.is_liked, updated_at: a.updated_at }
    }
}

impl From<UpdatedLike> for Like {
    fn from(u: UpdatedLike) -> Self {
        Self { id: u.id, comment_id: u.comment_id, user_id: u.user_id, is_liked: u.is_liked, updated_at: u.updated_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_like_validation() {
        let err = AddLike::from_payload(&json!({})).unwrap_err();
        assert_eq!(err.code().unwrap(), "ADD_LIKE.NOT_CONTAIN_NEEDED_PROPERTY");
        let err = AddLike::from_payload(&json!({ "commentId": 123, "userId": {} })).unwrap_err();
        assert_eq!(err.code().unwrap(), "ADD_LIKE.NOT_MEET_DATA_TYPE_SPECIFICATION");

        let key: LikeKey = AddLike::from_payload(&json!({ "commentId": "comment-123", "userId": "user-123" }))
            .unwrap()
            .into();
        assert_eq!(key, LikeKey { comment_id: "comment-123".into(), user_id: "user-123".into() });
    }

    #[test]
    fn like_states_report_their_own_scope() {
        let bad = json!({
            "id": 123, "commentId": 123, "userId": {}, "isLiked": "true",
            "updatedAt": "2021-08-08T07:22:53.000Z"
        });
        assert_eq!(AddedLike::from_payload(&bad).unwrap_err().code().unwrap(), "ADDED_LIKE.NOT_MEET_DATA_TYPE_SPECIFICATION");
        assert_eq!(Like::from_payload(&bad).unwrap_err().code().unwrap(), "LIKE.NOT_MEET_DATA_TYPE_SPECIFICATION");
        assert_eq!(UpdatedLike::from_payload(&json!({})).unwrap_err().code().unwrap(), "UPDATED_LIKE.NOT_CONTAIN_NEEDED_PROPERTY");
    }

    #[test]
    fn unliked_state_is_still_defined() {
        let like = Like::from_payload(&json!({
            "id": "like-123", "commentId": "comment-123", "userId": "user-123",
            "isLiked": false, "updatedAt": "2021-08-08T07:22:53.000Z"
        }))
        .unwrap();
        assert!(!like.is_liked);
        assert_eq!(serde_json::to_value(&like).unwrap()["isLiked"], false);
    }

    #[test]
    fn update_like_requires_flag() {
        let err = UpdateLike::from_payload(&json!({
            "id": "like-123", "commentId": "comment-123", "userId": "user-123", "isLiked": null
        }))
        .unwrap_err();
        assert_eq!(err.code().unwrap(), "UPDATE_LIKE.NOT_CONTAIN_NEEDED_PROPERTY");
        let ok = UpdateLike::from_payload(&json!({
            "id": "like-123", "commentId": "comment-123", "userId": "user-123", "isLiked": false
        }))
        .unwrap();
        assert!(!ok.is_liked);
    }
}
