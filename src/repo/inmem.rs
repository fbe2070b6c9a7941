//! Process-local store used by the test suite and for running without Postgres.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::*;

#[derive(Clone)]
struct StoredThread {
    id: Id,
    title: String,
    body: String,
    owner: Id,
    date: DateTime<Utc>,
}

#[derive(Clone)]
struct StoredComment {
    id: Id,
    thread_id: Id,
    content: String,
    #[allow(dead_code)]
    comment_id: Option<Id>, // legacy parent pointer, stored but never read
    owner: Id,
    date: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
struct StoredReply {
    id: Id,
    comment_id: Id,
    user_id: Id,
    content: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

// Vec fields keep insertion order, which doubles as chronological order.
#[derive(Default)]
struct State {
    users: HashMap<Id, String>,
    threads: HashMap<Id, StoredThread>,
    comments: Vec<StoredComment>,
    replies: Vec<StoredReply>,
    likes: Vec<Like>,
}

impl State {
    fn username(&self, user_id: &str) -> String {
        self.users.get(user_id).cloned().unwrap_or_else(|| user_id.to_string())
    }

    fn comment(&self, id: &str) -> Option<&StoredComment> {
        self.comments.iter().find(|c| c.id == id)
    }

    fn reply(&self, id: &str) -> Option<&StoredReply> {
        self.replies.iter().find(|r| r.id == id)
    }

    fn like_count(&self, comment_id: &str) -> i64 {
        self.likes.iter().filter(|l| l.comment_id == comment_id && l.is_liked).count() as i64
    }
}

#[derive(Clone)]
pub struct InMemRepo {
    state: Arc<RwLock<State>>,
    ids: IdGenerator,
}

impl InMemRepo {
    pub fn new() -> Self {
        Self::with_id_generator(default_id_generator())
    }

    pub fn with_id_generator(ids: IdGenerator) -> Self {
        Self { state: Arc::new(RwLock::new(State::default())), ids }
    }

    /// Registers a display name for a user id; unknown ids render as themselves.
    pub fn add_user(&self, id: &str, username: &str) -> RepoResult<()> {
        self.write()?.users.insert(id.to_string(), username.to_string());
        Ok(())
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| RepoError::Internal("state lock poisoned".into()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| RepoError::Internal("state lock poisoned".into()))
    }

    fn next_id(&self, prefix: &str) -> Id {
        format!("{prefix}-{}", (self.ids)())
    }
}

impl Default for InMemRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadRepo for InMemRepo {
    async fn add_thread(&self, new: AddThread) -> RepoResult<AddedThread> {
        let id = self.next_id("thread");
        let mut s = self.write()?;
        if s.threads.contains_key(&id) {
            return Err(RepoError::Conflict(id));
        }
        let thread = StoredThread { id: id.clone(), title: new.title, body: new.body, owner: new.owner, date: Utc::now() };
        let added = AddedThread { id: id.clone(), title: thread.title.clone(), owner: thread.owner.clone() };
        s.threads.insert(id, thread);
        Ok(added)
    }

    async fn get_thread_by_id(&self, id: &str) -> RepoResult<Option<Thread>> {
        let s = self.read()?;
        Ok(s.threads.get(id).map(|t| Thread {
            id: t.id.clone(),
            title: t.title.clone(),
            body: t.body.clone(),
            date: t.date,
            username: s.username(&t.owner),
        }))
    }

    async fn verify_thread_availability(&self, id: &str) -> RepoResult<()> {
        if self.read()?.threads.contains_key(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound(Resource::Thread, id.to_string()))
        }
    }
}

#[async_trait]
impl CommentRepo for InMemRepo {
    async fn add_comment(&self, new: AddComment) -> RepoResult<AddedComment> {
        let id = self.next_id("comment");
        let mut s = self.write()?;
        if !s.threads.contains_key(&new.thread_id) {
            return Err(RepoError::NotFound(Resource::Thread, new.thread_id));
        }
        if s.comment(&id).is_some() {
            return Err(RepoError::Conflict(id));
        }
        let added = AddedComment { id: id.clone(), content: new.content.clone(), owner: new.owner.clone() };
        s.comments.push(StoredComment {
            id,
            thread_id: new.thread_id,
            content: new.content,
            comment_id: new.comment_id,
            owner: new.owner,
            date: Utc::now(),
            deleted_at: None,
        });
        Ok(added)
    }

    async fn get_comment_by_id(&self, id: &str) -> RepoResult<Option<CommentRecord>> {
        let s = self.read()?;
        Ok(s.comment(id).filter(|c| c.deleted_at.is_none()).map(|c| CommentRecord {
            id: c.id.clone(),
            content: c.content.clone(),
            owner: c.owner.clone(),
            username: s.username(&c.owner),
            date: c.date,
        }))
    }

    async fn get_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>> {
        let s = self.read()?;
        let comments = s
            .comments
            .iter()
            .filter(|c| c.thread_id == thread_id)
            .map(|c| {
                let replies = s
                    .replies
                    .iter()
                    .filter(|r| r.comment_id == c.id)
                    .map(|r| {
                        Reply::new(r.id.clone(), s.username(&r.user_id), r.created_at, r.content.clone(), r.deleted_at.is_some())
                    })
                    .collect();
                Comment::new(
                    c.id.clone(),
                    s.username(&c.owner),
                    c.date,
                    c.content.clone(),
                    c.deleted_at.is_some(),
                    s.like_count(&c.id),
                )
                .with_replies(replies)
            })
            .collect();
        Ok(comments)
    }

    async fn delete_comment_by_id(&self, id: &str) -> RepoResult<()> {
        let mut s = self.write()?;
        if let Some(c) = s.comments.iter_mut().find(|c| c.id == id) {
            c.deleted_at.get_or_insert_with(Utc::now);
        }
        debug!(comment_id = id, "comment soft-deleted");
        Ok(())
    }

    async fn verify_comment_availability(&self, id: &str) -> RepoResult<()> {
        match self.read()?.comment(id) {
            Some(c) if c.deleted_at.is_none() => Ok(()),
            _ => Err(RepoError::NotFound(Resource::Comment, id.to_string())),
        }
    }

    async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
        let s = self.read()?;
        let c = s.comment(id).ok_or_else(|| RepoError::NotFound(Resource::Comment, id.to_string()))?;
        if c.owner != owner {
            return Err(RepoError::Forbidden { resource: Resource::Comment, id: id.to_string(), actor: owner.to_string() });
        }
        Ok(())
    }

    async fn verify_comment_in_thread(&self, id: &str, thread_id: &str) -> RepoResult<()> {
        match self.read()?.comment(id) {
            Some(c) if c.thread_id == thread_id => Ok(()),
            _ => Err(RepoError::NotFound(Resource::Comment, id.to_string())),
        }
    }
}

#[async_trait]
impl ReplyRepo for InMemRepo {
    async fn add_reply(&self, new: AddReply) -> RepoResult<AddedReply> {
        let id = self.next_id("reply");
        let mut s = self.write()?;
        if s.comment(&new.comment_id).is_none() {
            return Err(RepoError::NotFound(Resource::Comment, new.comment_id));
        }
        if s.reply(&id).is_some() {
            return Err(RepoError::Conflict(id));
        }
        let added = AddedReply { id: id.clone(), content: new.content.clone(), owner: new.user_id.clone() };
        s.replies.push(StoredReply {
            id,
            comment_id: new.comment_id,
            user_id: new.user_id,
            content: new.content,
            created_at: Utc::now(),
            deleted_at: None,
        });
        Ok(added)
    }

    async fn find_replies_by_comment(&self, lookup: &ReplyLookup) -> RepoResult<Vec<Reply>> {
        let s = self.read()?;
        Ok(s.replies
            .iter()
            .filter(|r| r.comment_id == lookup.comment_id && r.user_id == lookup.user_id)
            .map(|r| Reply::new(r.id.clone(), s.username(&r.user_id), r.created_at, r.content.clone(), r.deleted_at.is_some()))
            .collect())
    }

    async fn delete_reply(&self, id: &str) -> RepoResult<()> {
        let mut s = self.write()?;
        if let Some(r) = s.replies.iter_mut().find(|r| r.id == id) {
            r.deleted_at.get_or_insert_with(Utc::now);
        }
        debug!(reply_id = id, "reply soft-deleted");
        Ok(())
    }

    async fn verify_reply_availability(&self, id: &str) -> RepoResult<()> {
        match self.read()?.reply(id) {
            Some(r) if r.deleted_at.is_none() => Ok(()),
            _ => Err(RepoError::NotFound(Resource::Reply, id.to_string())),
        }
    }

    async fn verify_reply_owner(&self, id: &str, user_id: &str) -> RepoResult<()> {
        let s = self.read()?;
        let r = s.reply(id).ok_or_else(|| RepoError::NotFound(Resource::Reply, id.to_string()))?;
        if r.user_id != user_id {
            return Err(RepoError::Forbidden { resource: Resource::Reply, id: id.to_string(), actor: user_id.to_string() });
        }
        Ok(())
    }

    async fn verify_reply_in_comment(&self, id: &str, comment_id: &str) -> RepoResult<()> {
        match self.read()?.reply(id) {
            Some(r) if r.comment_id == comment_id => Ok(()),
            _ => Err(RepoError::NotFound(Resource::Reply, id.to_string())),
        }
    }
}

#[async_trait]
impl LikeRepo for InMemRepo {
    async fn add_like(&self, new: AddLike) -> RepoResult<AddedLike> {
        let id = self.next_id("like");
        let mut s = self.write()?;
        if s.comment(&new.comment_id).is_none() {
            return Err(RepoError::NotFound(Resource::Comment, new.comment_id));
        }
        if s.likes.iter().any(|l| l.comment_id == new.comment_id && l.user_id == new.user_id) {
            return Err(RepoError::Conflict(format!("{}:{}", new.comment_id, new.user_id)));
        }
        let like = Like { id, comment_id: new.comment_id, user_id: new.user_id, is_liked: true, updated_at: Utc::now() };
        s.likes.push(like.clone());
        Ok(AddedLike {
            id: like.id,
            comment_id: like.comment_id,
            user_id: like.user_id,
            is_liked: like.is_liked,
            updated_at: like.updated_at,
        })
    }

    async fn update_like(&self, upd: UpdateLike) -> RepoResult<UpdatedLike> {
        let mut s = self.write()?;
        let like = s
            .likes
            .iter_mut()
            .find(|l| l.id == upd.id)
            .ok_or_else(|| RepoError::NotFound(Resource::Like, upd.id.clone()))?;
        like.comment_id = upd.comment_id;
        like.user_id = upd.user_id;
        like.is_liked = upd.is_liked;
        like.updated_at = Utc::now();
        Ok(UpdatedLike {
            id: like.id.clone(),
            comment_id: like.comment_id.clone(),
            user_id: like.user_id.clone(),
            is_liked: like.is_liked,
            updated_at: like.updated_at,
        })
    }

    async fn exist(&self, key: &LikeKey) -> RepoResult<bool> {
        Ok(self.read()?.likes.iter().any(|l| l.comment_id == key.comment_id && l.user_id == key.user_id))
    }

    async fn find_like_by_comment(&self, key: &LikeKey) -> RepoResult<Option<Like>> {
        Ok(self
            .read()?
            .likes
            .iter()
            .find(|l| l.comment_id == key.comment_id && l.user_id == key.user_id)
            .cloned())
    }

    async fn reverse(&self, key: &LikeKey) -> RepoResult<Like> {
        let id = self.next_id("like");
        // one write guard covers the lookup and the mutation
        let mut s = self.write()?;
        if let Some(like) = s.likes.iter_mut().find(|l| l.comment_id == key.comment_id && l.user_id == key.user_id) {
            like.is_liked = !like.is_liked;
            like.updated_at = Utc::now();
            return Ok(like.clone());
        }
        let like = Like {
            id,
            comment_id: key.comment_id.clone(),
            user_id: key.user_id.clone(),
            is_liked: true,
            updated_at: Utc::now(),
        };
        s.likes.push(like.clone());
        Ok(like)
    }
}
