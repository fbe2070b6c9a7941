use crate::models::{AddedComment, AddedReply, AddedThread, Comment, Reply, ThreadDetail};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::post_thread,
        crate::routes::get_thread,
        crate::routes::post_comment,
        crate::routes::delete_comment,
        crate::routes::post_reply,
        crate::routes::delete_reply,
        crate::routes::put_like,
    ),
    components(schemas(AddedThread, ThreadDetail, AddedComment, Comment, AddedReply, Reply)),
    tags(
        (name = "threads", description = "Thread operations"),
        (name = "comments", description = "Comment operations"),
        (name = "replies", description = "Reply operations"),
        (name = "likes", description = "Comment likes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for p in [
            "/threads",
            "/threads/{thread_id}",
            "/threads/{thread_id}/comments",
            "/threads/{thread_id}/comments/{comment_id}",
            "/threads/{thread_id}/comments/{comment_id}/replies",
            "/threads/{thread_id}/comments/{comment_id}/replies/{reply_id}",
            "/threads/{thread_id}/comments/{comment_id}/likes",
        ] {
            assert!(paths.iter().any(|k| k == p), "missing {p}");
        }
    }

    #[test]
    fn response_bodies_reference_model_schemas() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let body_ref = |path: &str, method: &str, status: &str| {
            doc["paths"][path][method]["responses"][status]["content"]["application/json"]["schema"]["$ref"].clone()
        };
        assert_eq!(body_ref("/threads", "post", "201"), "#/components/schemas/AddedThread");
        assert_eq!(body_ref("/threads/{thread_id}", "get", "200"), "#/components/schemas/ThreadDetail");
        assert_eq!(body_ref("/threads/{thread_id}/comments", "post", "201"), "#/components/schemas/AddedComment");
        assert_eq!(
            body_ref("/threads/{thread_id}/comments/{comment_id}/replies", "post", "201"),
            "#/components/schemas/AddedReply"
        );
    }
}
