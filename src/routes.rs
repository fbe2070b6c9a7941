use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};

use crate::auth::Auth;
use crate::error::ApiError;
#[allow(unused_imports)]
use crate::models::{AddedComment, AddedReply, AddedThread, Id, ThreadDetail};
use crate::repo::Repo;
use crate::use_cases::UseCases;

const INVALID_JSON_MESSAGE: &str = "body harus berupa JSON yang valid";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/threads").route(web::post().to(post_thread)))
        .service(web::resource("/threads/{thread_id}").route(web::get().to(get_thread)))
        .service(web::resource("/threads/{thread_id}/comments").route(web::post().to(post_comment)))
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}")
                .route(web::delete().to(delete_comment)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/replies")
                .route(web::post().to(post_reply)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/replies/{reply_id}")
                .route(web::delete().to(delete_reply)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/likes")
                .route(web::put().to(put_like)),
        );
}

#[derive(Clone)]
pub struct AppState {
    pub use_cases: UseCases,
}

impl AppState {
    pub fn new<R: Repo + 'static>(repo: Arc<R>) -> Self {
        Self { use_cases: UseCases::new(repo) }
    }
}

/// Parses the request body and overlays the route-derived fields on top of it.
/// An empty body counts as an empty object.
fn merge_body(body: &[u8], overrides: impl IntoIterator<Item = (&'static str, Value)>) -> Result<Value, ApiError> {
    let mut fields = match body.iter().all(u8::is_ascii_whitespace) {
        true => Map::new(),
        false => match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(m)) => m,
            Ok(_) => Map::new(),
            Err(_) => return Err(ApiError::BadRequest(INVALID_JSON_MESSAGE.into())),
        },
    };
    for (k, v) in overrides {
        fields.insert(k.to_string(), v);
    }
    Ok(Value::Object(fields))
}

fn success() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "success" }))
}

#[utoipa::path(
    post,
    path = "/threads",
    tag = "threads",
    request_body(content = Object, description = "`{ title, body }`"),
    responses(
        (status = 201, description = "`{ status, data: { addedThread } }`", body = AddedThread),
        (status = 400, description = "Missing or mistyped property"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn post_thread(auth: Auth, data: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let payload = merge_body(&body, [("owner", json!(auth.user_id()))])?;
    let added_thread = data.use_cases.add_thread.execute(&payload).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedThread": added_thread } })))
}

#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    tag = "threads",
    params(("thread_id" = Id, Path, description = "Thread id")),
    responses(
        (status = 200, description = "`{ status, data: { thread } }`", body = ThreadDetail),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread(data: web::Data<AppState>, path: web::Path<Id>) -> Result<HttpResponse, ApiError> {
    let thread = data.use_cases.get_thread_detail.execute(&Value::String(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": { "thread": thread } })))
}

#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments",
    tag = "comments",
    params(("thread_id" = Id, Path, description = "Thread id")),
    request_body(content = Object, description = "`{ content }`"),
    responses(
        (status = 201, description = "`{ status, data: { addedComment } }`", body = AddedComment),
        (status = 400, description = "Missing or mistyped property"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn post_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let payload = merge_body(
        &body,
        [("owner", json!(auth.user_id())), ("threadId", json!(path.into_inner())), ("commentId", Value::Null)],
    )?;
    let added_comment = data.use_cases.add_comment.execute(&payload).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedComment": added_comment } })))
}

#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("thread_id" = Id, Path, description = "Thread id"),
        ("comment_id" = Id, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment soft-deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller does not own the comment"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn delete_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(Id, Id)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let payload = json!({ "owner": auth.user_id(), "threadId": thread_id, "commentId": comment_id });
    data.use_cases.delete_comment.execute(&payload).await?;
    Ok(success())
}

#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments/{comment_id}/replies",
    tag = "replies",
    params(
        ("thread_id" = Id, Path, description = "Thread id"),
        ("comment_id" = Id, Path, description = "Comment id")
    ),
    request_body(content = Object, description = "`{ content }`"),
    responses(
        (status = 201, description = "`{ status, data: { addedReply } }`", body = AddedReply),
        (status = 400, description = "Missing or mistyped property"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn post_reply(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(Id, Id)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let payload = merge_body(
        &body,
        [("userId", json!(auth.user_id())), ("threadId", json!(thread_id)), ("commentId", json!(comment_id))],
    )?;
    let added_reply = data.use_cases.add_reply.execute(&payload).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedReply": added_reply } })))
}

#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/comments/{comment_id}/replies/{reply_id}",
    tag = "replies",
    params(
        ("thread_id" = Id, Path, description = "Thread id"),
        ("comment_id" = Id, Path, description = "Comment id"),
        ("reply_id" = Id, Path, description = "Reply id")
    ),
    responses(
        (status = 200, description = "Reply soft-deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller does not own the reply"),
        (status = 404, description = "Thread, comment or reply not found")
    )
)]
pub async fn delete_reply(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(Id, Id, Id)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id, reply_id) = path.into_inner();
    let payload = json!({
        "threadId": thread_id,
        "commentId": comment_id,
        "id": reply_id,
        "userId": auth.user_id(),
    });
    data.use_cases.delete_reply.execute(&payload).await?;
    Ok(success())
}

#[utoipa::path(
    put,
    path = "/threads/{thread_id}/comments/{comment_id}/likes",
    tag = "likes",
    params(
        ("thread_id" = Id, Path, description = "Thread id"),
        ("comment_id" = Id, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Like toggled"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn put_like(auth: Auth, data: web::Data<AppState>, path: web::Path<(Id, Id)>) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let payload = json!({ "threadId": thread_id, "commentId": comment_id, "userId": auth.user_id() });
    data.use_cases.reverse_like.execute(&payload).await?;
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_fields_override_the_body() {
        let merged = merge_body(br#"{"content":"hi","commentId":"comment-9","owner":"x"}"#, [
            ("owner", json!("user-1")),
            ("commentId", Value::Null),
        ])
        .unwrap();
        assert_eq!(merged, json!({ "content": "hi", "commentId": null, "owner": "user-1" }));
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(merge_body(b"", [("owner", json!("user-1"))]).unwrap(), json!({ "owner": "user-1" }));
        assert_eq!(merge_body(b"  \n", []).unwrap(), json!({}));
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        assert_eq!(
            merge_body(b"{not json", []).unwrap_err(),
            ApiError::BadRequest(INVALID_JSON_MESSAGE.into())
        );
    }
}
