use std::fmt;

use crate::repo::RepoError;

/// Which entity or use case rejected a payload. Renders as the code prefix
/// clients see, e.g. `ADD_COMMENT_USE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    AddThread,
    AddedThread,
    Thread,
    AddComment,
    AddedComment,
    Comment,
    AddReply,
    AddedReply,
    Reply,
    AddLike,
    AddedLike,
    Like,
    UpdateLike,
    UpdatedLike,
    AddThreadUseCase,
    AddCommentUseCase,
    AddReplyUseCase,
    DeleteCommentUseCase,
    DeleteReplyUseCase,
    GetThreadDetailUseCase,
    ReverseLikeOfCommentUseCase,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::AddThread => "ADD_THREAD",
            Scope::AddedThread => "ADDED_THREAD",
            Scope::Thread => "THREAD",
            Scope::AddComment => "ADD_COMMENT",
            Scope::AddedComment => "ADDED_COMMENT",
            Scope::Comment => "COMMENT",
            Scope::AddReply => "ADD_REPLY",
            Scope::AddedReply => "ADDED_REPLY",
            Scope::Reply => "REPLY",
            Scope::AddLike => "ADD_LIKE",
            Scope::AddedLike => "ADDED_LIKE",
            Scope::Like => "LIKE",
            Scope::UpdateLike => "UPDATE_LIKE",
            Scope::UpdatedLike => "UPDATED_LIKE",
            Scope::AddThreadUseCase => "ADD_THREAD_USE_CASE",
            Scope::AddCommentUseCase => "ADD_COMMENT_USE_CASE",
            Scope::AddReplyUseCase => "ADD_REPLY_USE_CASE",
            Scope::DeleteCommentUseCase => "DELETE_COMMENT_USE_CASE",
            Scope::DeleteReplyUseCase => "DELETE_REPLY_USE_CASE",
            Scope::GetThreadDetailUseCase => "GET_THREAD_DETAIL_USE_CASE",
            Scope::ReverseLikeOfCommentUseCase => "REVERSE_LIKE_OF_COMMENT_USE_CASE",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationReason {
    NotContainAnyProperty,
    NotContainNeededProperty,
    NotContainCommentId,
    NotContainThreadId,
    NotContainOwner,
    NotMeetDataTypeSpecification,
    PayloadNotMeetDataTypeSpecification,
}

impl ValidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationReason::NotContainAnyProperty => "NOT_CONTAIN_ANY_PROPERTY",
            ValidationReason::NotContainNeededProperty => "NOT_CONTAIN_NEEDED_PROPERTY",
            ValidationReason::NotContainCommentId => "NOT_CONTAIN_COMMENT_ID",
            ValidationReason::NotContainThreadId => "NOT_CONTAIN_THREAD_ID",
            ValidationReason::NotContainOwner => "NOT_CONTAIN_OWNER",
            ValidationReason::NotMeetDataTypeSpecification => "NOT_MEET_DATA_TYPE_SPECIFICATION",
            ValidationReason::PayloadNotMeetDataTypeSpecification => {
                "PAYLOAD_NOT_MEET_DATA_TYPE_SPECIFICATION"
            }
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Thread,
    Comment,
    Reply,
    Like,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Thread => "thread",
            Resource::Comment => "comment",
            Resource::Reply => "reply",
            Resource::Like => "like",
        })
    }
}

/// Every way a use case can reject a request.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{scope}.{reason}")]
    Validation {
        scope: Scope,
        reason: ValidationReason,
        /// First offending field, when one can be named.
        field: Option<&'static str>,
    },
    #[error("{resource} '{id}' not found")]
    NotFound { resource: Resource, id: String },
    #[error("'{actor}' does not own {resource} '{id}'")]
    Authorization { resource: Resource, id: String, actor: String },
    #[error("internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(scope: Scope, reason: ValidationReason) -> Self {
        DomainError::Validation { scope, reason, field: None }
    }

    pub fn missing(scope: Scope, field: &'static str) -> Self {
        DomainError::Validation {
            scope,
            reason: ValidationReason::NotContainNeededProperty,
            field: Some(field),
        }
    }

    pub fn wrong_type(scope: Scope, field: &'static str) -> Self {
        DomainError::Validation {
            scope,
            reason: ValidationReason::NotMeetDataTypeSpecification,
            field: Some(field),
        }
    }

    /// Machine readable `<SCOPE>.<REASON>` code; `None` for non-validation errors.
    pub fn code(&self) -> Option<String> {
        match self {
            DomainError::Validation { scope, reason, .. } => Some(format!("{scope}.{reason}")),
            _ => None,
        }
    }

    /// Rewrites the reason of a validation error, leaving other kinds alone.
    pub(crate) fn with_reason(self, reason: ValidationReason) -> Self {
        match self {
            DomainError::Validation { scope, field, .. } => DomainError::Validation { scope, reason, field },
            other => other,
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(resource, id) => DomainError::NotFound { resource, id },
            RepoError::Forbidden { resource, id, actor } => DomainError::Authorization { resource, id, actor },
            RepoError::Conflict(what) => DomainError::Internal(format!("conflict: {what}")),
            RepoError::Internal(msg) => DomainError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_code_is_scope_dot_reason() {
        let err = DomainError::missing(Scope::AddCommentUseCase, "owner");
        assert_eq!(err.code().as_deref(), Some("ADD_COMMENT_USE_CASE.NOT_CONTAIN_NEEDED_PROPERTY"));
        assert_eq!(err.to_string(), "ADD_COMMENT_USE_CASE.NOT_CONTAIN_NEEDED_PROPERTY");
    }

    #[test]
    fn repo_errors_map_onto_domain_kinds() {
        let nf: DomainError = RepoError::NotFound(Resource::Thread, "thread-1".into()).into();
        assert_eq!(nf, DomainError::NotFound { resource: Resource::Thread, id: "thread-1".into() });
        assert!(nf.code().is_none());

        let forbidden: DomainError = RepoError::Forbidden {
            resource: Resource::Comment,
            id: "comment-1".into(),
            actor: "user-2".into(),
        }
        .into();
        assert!(matches!(forbidden, DomainError::Authorization { resource: Resource::Comment, .. }));
    }

    #[test]
    fn with_reason_only_touches_validation() {
        let err = DomainError::wrong_type(Scope::GetThreadDetailUseCase, "threadId")
            .with_reason(ValidationReason::PayloadNotMeetDataTypeSpecification);
        assert_eq!(
            err.code().as_deref(),
            Some("GET_THREAD_DETAIL_USE_CASE.PAYLOAD_NOT_MEET_DATA_TYPE_SPECIFICATION")
        );
        let internal = DomainError::Internal("x".into()).with_reason(ValidationReason::NotContainOwner);
        assert_eq!(internal, DomainError::Internal("x".into()));
    }
}
