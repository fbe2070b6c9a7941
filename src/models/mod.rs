//! Value objects for threads, comments, replies and likes.
//!
//! Every entity is built from an untyped JSON payload through [`FromPayload`];
//! that is the only place field presence and primitive types are checked.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain_error::{DomainError, DomainResult, Scope};

mod comment;
mod like;
mod reply;
mod thread;

pub use comment::*;
pub use like::*;
pub use reply::*;
pub use thread::*;

pub type Id = String;

/// Shown in place of a soft-deleted comment's content.
pub const DELETED_COMMENT_CONTENT: &str = "**komentar telah dihapus**";
/// Shown in place of a soft-deleted reply's content.
pub const DELETED_REPLY_CONTENT: &str = "**balasan telah dihapus**";

pub trait FromPayload: Sized {
    fn from_payload(payload: &Value) -> DomainResult<Self>;
}

/// Read-only view over a JSON object that reports failures under one [`Scope`].
///
/// Presence checks follow JSON truthiness: `null`, `false`, `0` and `""`
/// count as missing for [`Payload::require`].
pub struct Payload<'a> {
    scope: Scope,
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Payload<'a> {
    pub fn new(scope: Scope, value: &'a Value) -> Self {
        Self { scope, fields: value.as_object() }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// True when there is no payload at all (`null` or a non-object).
    pub fn is_absent(&self) -> bool {
        self.fields.is_none()
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|m| m.get(key))
    }

    /// Every key must carry a truthy value.
    pub fn require(&self, keys: &[&'static str]) -> DomainResult<()> {
        match keys.iter().find(|k| self.get(k).map_or(true, is_falsy)) {
            Some(k) => Err(DomainError::missing(self.scope, *k)),
            None => Ok(()),
        }
    }

    /// Every key must be present and non-null; `false` and `0` are accepted.
    pub fn require_defined(&self, keys: &[&'static str]) -> DomainResult<()> {
        match keys.iter().find(|k| self.get(k).map_or(true, Value::is_null)) {
            Some(k) => Err(DomainError::missing(self.scope, *k)),
            None => Ok(()),
        }
    }

    /// Every key must be present; an explicit `null` is accepted.
    pub fn require_keys(&self, keys: &[&'static str]) -> DomainResult<()> {
        match keys.iter().find(|k| self.get(k).is_none()) {
            Some(k) => Err(DomainError::missing(self.scope, *k)),
            None => Ok(()),
        }
    }

    pub fn string(&self, key: &'static str) -> DomainResult<String> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(DomainError::wrong_type(self.scope, key)),
        }
    }

    pub fn nullable_string(&self, key: &'static str) -> DomainResult<Option<String>> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Null) => Ok(None),
            _ => Err(DomainError::wrong_type(self.scope, key)),
        }
    }

    /// Absent or `null` yields `None`; anything else must be a string.
    pub fn optional_string(&self, key: &'static str) -> DomainResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(_) => self.nullable_string(key),
        }
    }

    pub fn boolean(&self, key: &'static str) -> DomainResult<bool> {
        match self.get(key) {
            Some(Value::Bool(b)) => Ok(*b),
            _ => Err(DomainError::wrong_type(self.scope, key)),
        }
    }

    pub fn count(&self, key: &'static str) -> DomainResult<i64> {
        self.get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| DomainError::wrong_type(self.scope, key))
    }

    /// RFC 3339 string.
    pub fn timestamp(&self, key: &'static str) -> DomainResult<DateTime<Utc>> {
        self.get(key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| DomainError::wrong_type(self.scope, key))
    }

    /// Absent or `null` yields an empty list; otherwise an array of entities.
    pub fn list<T: FromPayload>(&self, key: &'static str) -> DomainResult<Vec<T>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(T::from_payload).collect(),
            Some(_) => Err(DomainError::wrong_type(self.scope, key)),
        }
    }
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Random 16 character alphanumeric suffix used for every generated id.
pub fn nanoid() -> String {
    use rand::distributions::{Alphanumeric, DistString};
    Alphanumeric.sample_string(&mut rand::thread_rng(), 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_error::ValidationReason;
    use serde_json::json;

    fn reason(err: DomainError) -> ValidationReason {
        match err {
            DomainError::Validation { reason, .. } => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn require_treats_falsy_values_as_missing() {
        for v in [json!(null), json!(""), json!(0), json!(false)] {
            let body = json!({ "a": v });
            let p = Payload::new(Scope::AddThread, &body);
            assert_eq!(reason(p.require(&["a"]).unwrap_err()), ValidationReason::NotContainNeededProperty);
        }
        let body = json!({ "a": "x", "b": [] });
        assert!(Payload::new(Scope::AddThread, &body).require(&["a", "b"]).is_ok());
    }

    #[test]
    fn require_keys_accepts_null_but_not_absence() {
        let body = json!({ "commentId": null });
        let p = Payload::new(Scope::AddComment, &body);
        assert!(p.require_keys(&["commentId"]).is_ok());
        assert!(p.require_keys(&["owner"]).is_err());
        assert_eq!(p.nullable_string("commentId").unwrap(), None);
    }

    #[test]
    fn require_defined_accepts_false_and_zero() {
        let body = json!({ "isDeleted": false, "likeCount": 0, "gone": null });
        let p = Payload::new(Scope::Comment, &body);
        assert!(p.require_defined(&["isDeleted", "likeCount"]).is_ok());
        assert!(p.require_defined(&["gone"]).is_err());
    }

    #[test]
    fn non_object_payload_is_absent() {
        let body = json!("thread-123");
        let p = Payload::new(Scope::AddThread, &body);
        assert!(p.is_absent());
        let err = p.require(&["title"]).unwrap_err();
        assert_eq!(err, DomainError::missing(Scope::AddThread, "title"));
    }

    #[test]
    fn typed_getters_reject_wrong_types() {
        let body = json!({ "s": 1, "b": "true", "n": "3", "t": "yesterday", "l": {} });
        let p = Payload::new(Scope::Like, &body);
        assert!(p.string("s").is_err());
        assert!(p.boolean("b").is_err());
        assert!(p.count("n").is_err());
        assert!(p.timestamp("t").is_err());
        assert!(p.list::<Reply>("l").is_err());
        assert!(p.optional_string("missing").unwrap().is_none());
        assert!(p.optional_string("s").is_err());
    }

    #[test]
    fn nanoid_is_sixteen_alphanumerics() {
        let id = nanoid();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
