//! Request-scoped orchestration: validate the payload, walk the existence and
//! ownership checks in order, then write. The first failing step ends the request.

use std::sync::Arc;

use crate::repo::Repo;

mod add_comment;
mod add_reply;
mod add_thread;
mod delete_comment;
mod delete_reply;
mod get_thread_detail;
mod reverse_like;

pub use add_comment::AddCommentUseCase;
pub use add_reply::AddReplyUseCase;
pub use add_thread::AddThreadUseCase;
pub use delete_comment::DeleteCommentUseCase;
pub use delete_reply::DeleteReplyUseCase;
pub use get_thread_detail::GetThreadDetailUseCase;
pub use reverse_like::ReverseLikeOfCommentUseCase;

/// Every use case wired over a single repository backend.
#[derive(Clone)]
pub struct UseCases {
    pub add_thread: Arc<AddThreadUseCase>,
    pub add_comment: Arc<AddCommentUseCase>,
    pub add_reply: Arc<AddReplyUseCase>,
    pub delete_comment: Arc<DeleteCommentUseCase>,
    pub delete_reply: Arc<DeleteReplyUseCase>,
    pub get_thread_detail: Arc<GetThreadDetailUseCase>,
    pub reverse_like: Arc<ReverseLikeOfCommentUseCase>,
}

impl UseCases {
    pub fn new<R: Repo + 'static>(repo: Arc<R>) -> Self {
        Self {
            add_thread: Arc::new(AddThreadUseCase::new(repo.clone())),
            add_comment: Arc::new(AddCommentUseCase::new(repo.clone(), repo.clone())),
            add_reply: Arc::new(AddReplyUseCase::new(repo.clone(), repo.clone(), repo.clone())),
            delete_comment: Arc::new(DeleteCommentUseCase::new(repo.clone(), repo.clone())),
            delete_reply: Arc::new(DeleteReplyUseCase::new(repo.clone(), repo.clone(), repo.clone())),
            get_thread_detail: Arc::new(GetThreadDetailUseCase::new(repo.clone(), repo.clone())),
            reverse_like: Arc::new(ReverseLikeOfCommentUseCase::new(repo.clone(), repo.clone(), repo)),
        }
    }
}
