use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain_error::{DomainError, Resource, Scope, ValidationReason};

pub const SERVER_FAILURE_MESSAGE: &str = "terjadi kegagalan pada server kami";

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{}", SERVER_FAILURE_MESSAGE)]
    Internal,
}

/// Client-facing message for a validation code, if it is one clients may see.
fn validation_message(scope: Scope, reason: ValidationReason) -> Option<&'static str> {
    use ValidationReason::*;
    let msg = match (scope, reason) {
        (Scope::AddThreadUseCase, NotContainNeededProperty) => {
            "tidak dapat membuat thread baru karena properti yang dibutuhkan tidak ada"
        }
        (Scope::AddThread, NotContainNeededProperty) => {
            "tidak dapat membuat thread baru karena properti yang dibutuhkan tidak lengkap"
        }
        (Scope::AddThread, NotMeetDataTypeSpecification) => {
            "tidak dapat membuat thread baru karena tipe data tidak sesuai"
        }
        (Scope::AddComment | Scope::AddCommentUseCase, NotContainNeededProperty) => {
            "tidak dapat membuat comment baru karena properti yang dibutuhkan tidak ada"
        }
        (Scope::AddComment | Scope::AddCommentUseCase, NotMeetDataTypeSpecification) => {
            "tidak dapat membuat comment baru karena tipe data tidak sesuai"
        }
        (Scope::DeleteCommentUseCase, NotContainAnyProperty) => {
            "tidak dapat menghapus comment karena tidak ada properti yang dikirimkan"
        }
        (Scope::DeleteCommentUseCase, NotContainCommentId) => {
            "tidak dapat menghapus comment karena tidak ada properti commentId"
        }
        (Scope::DeleteCommentUseCase, NotContainThreadId) => {
            "tidak dapat menghapus comment karena tidak ada properti threadId"
        }
        (Scope::DeleteCommentUseCase, NotContainOwner) => {
            "tidak dapat menghapus comment karena tidak ada properti owner"
        }
        (Scope::DeleteCommentUseCase, PayloadNotMeetDataTypeSpecification) => {
            "tidak dapat menghapus comment karena tipe data tidak sesuai"
        }
        (Scope::AddReply | Scope::AddReplyUseCase, NotContainNeededProperty) => {
            "tidak dapat membuat balasan baru karena properti yang dibutuhkan tidak ada"
        }
        (Scope::AddReply | Scope::AddReplyUseCase, NotMeetDataTypeSpecification) => {
            "tidak dapat membuat balasan baru karena tipe data tidak sesuai"
        }
        (Scope::DeleteReplyUseCase, NotContainNeededProperty) => {
            "tidak dapat menghapus balasan karena properti yang dibutuhkan tidak ada"
        }
        (Scope::DeleteReplyUseCase, NotMeetDataTypeSpecification) => {
            "tidak dapat menghapus balasan karena tipe data tidak sesuai"
        }
        (Scope::GetThreadDetailUseCase, NotContainNeededProperty) => "harus mengirimkan threadId",
        (Scope::GetThreadDetailUseCase, PayloadNotMeetDataTypeSpecification) => "threadId harus string",
        (Scope::ReverseLikeOfCommentUseCase, NotContainNeededProperty) => {
            "tidak dapat menyukai komentar karena properti yang dibutuhkan tidak ada"
        }
        (Scope::ReverseLikeOfCommentUseCase, NotMeetDataTypeSpecification) => {
            "tidak dapat menyukai komentar karena tipe data tidak sesuai"
        }
        _ => return None,
    };
    Some(msg)
}

fn not_found_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Thread => "thread tidak ditemukan",
        Resource::Comment => "komentar tidak ditemukan",
        Resource::Reply => "balasan tidak ditemukan",
        Resource::Like => "like tidak ditemukan",
    }
}

fn forbidden_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Comment => "anda tidak berhak menghapus komentar ini",
        Resource::Reply => "anda tidak berhak menghapus balasan ini",
        Resource::Thread => "anda tidak berhak mengubah thread ini",
        Resource::Like => "anda tidak berhak mengubah like ini",
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { scope, reason, field } => match validation_message(scope, reason) {
                Some(msg) => {
                    warn!(code = %format_args!("{scope}.{reason}"), field, "request rejected");
                    ApiError::BadRequest(msg.to_string())
                }
                None => {
                    error!(code = %format_args!("{scope}.{reason}"), field, "untranslated validation failure");
                    ApiError::Internal
                }
            },
            DomainError::NotFound { resource, id } => {
                warn!(%resource, %id, "not found");
                ApiError::NotFound(not_found_message(resource).to_string())
            }
            DomainError::Authorization { resource, id, actor } => {
                warn!(%resource, %id, %actor, "ownership check failed");
                ApiError::Forbidden(forbidden_message(resource).to_string())
            }
            DomainError::Internal(msg) => {
                error!(error = %msg, "internal failure");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = ApiErrorBody {
            status: if status.is_server_error() { "error" } else { "fail" },
            message: self.to_string(),
        };
        HttpResponse::build(status).json(body)
    }
}
