//! In-memory content store - used when no database is configured.
//!
//! All five tables sit behind a single async `RwLock`. Every write takes the
//! write guard once and performs its constraint checks and its mutation
//! under it, so a check can never be invalidated before the insert lands.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{
    Comment, Follow, Group, GroupFields, NewComment, NewPost, NewUser, Ordering, Page, Post,
    PostFilter, PostQuery, PostUpdate, User,
};
use yatube_core::error::{ConstraintViolation, RepoError};
use yatube_core::ports::{
    BaseRepository, CommentRepository, ContentStore, FollowRepository, GroupRepository,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    follows: HashMap<Uuid, Follow>,
}

impl Tables {
    fn require_user(&self, id: Uuid, relation: &'static str) -> Result<(), ConstraintViolation> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(ConstraintViolation::MissingRelation(relation))
        }
    }

    fn require_group(&self, id: Option<Uuid>) -> Result<(), ConstraintViolation> {
        match id {
            Some(id) if !self.groups.contains_key(&id) => {
                Err(ConstraintViolation::MissingRelation("group"))
            }
            _ => Ok(()),
        }
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.groups
            .values()
            .any(|g| g.slug == slug && Some(g.id) != except)
    }

    fn find_follow(&self, user_id: Uuid, author_id: Uuid) -> Option<Uuid> {
        self.follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .map(|f| f.id)
    }

    /// Remove a post and, with it, its comments.
    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

/// Content store keeping every table in process memory.
pub struct InMemoryContentStore {
    tables: RwLock<Tables>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn groups(&self) -> &dyn GroupRepository {
        self
    }

    fn posts(&self) -> &dyn PostRepository {
        self
    }

    fn comments(&self) -> &dyn CommentRepository {
        self
    }

    fn follows(&self) -> &dyn FollowRepository {
        self
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::not_found("user", id));
        }

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in &owned {
            tables.remove_post(*post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        tables
            .follows
            .retain(|_, f| f.user_id != id && f.author_id != id);

        tracing::debug!(user_id = %id, posts = owned.len(), "User deleted with cascade");
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryContentStore {
    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        new.validate()?;
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == new.username) {
            return Err(ConstraintViolation::DuplicateUsername(new.username).into());
        }

        let user = User::new(new.username, new.password_hash);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::not_found("group", id));
        }

        // Posts outlive their group.
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.groups.len() as u64)
    }
}

#[async_trait]
impl GroupRepository for InMemoryContentStore {
    async fn create(&self, fields: GroupFields) -> Result<Group, RepoError> {
        fields.validate()?;
        let mut tables = self.tables.write().await;

        if tables.slug_taken(&fields.slug, None) {
            return Err(ConstraintViolation::DuplicateSlug(fields.slug).into());
        }

        let group = Group::new(fields);
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.slug.cmp(&b.slug)));
        Ok(groups)
    }

    async fn update(&self, id: Uuid, fields: GroupFields) -> Result<Group, RepoError> {
        fields.validate()?;
        let mut tables = self.tables.write().await;

        if !tables.groups.contains_key(&id) {
            return Err(RepoError::not_found("group", id));
        }
        if tables.slug_taken(&fields.slug, Some(id)) {
            return Err(ConstraintViolation::DuplicateSlug(fields.slug).into());
        }

        let group = tables
            .groups
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("group", id))?;
        group.apply(fields);
        Ok(group.clone())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .remove_post(id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("post", id))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.posts.len() as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryContentStore {
    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        new.validate()?;
        let mut tables = self.tables.write().await;

        tables.require_user(new.author_id, "author")?;
        tables.require_group(new.group_id)?;

        let post = Post::new(new);
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list(&self, query: PostQuery) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;

        let followed: Vec<Uuid> = match query.filter {
            PostFilter::FollowedBy(user_id) => tables
                .follows
                .values()
                .filter(|f| f.user_id == user_id)
                .map(|f| f.author_id)
                .collect(),
            _ => Vec::new(),
        };

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| query.matches(p, &followed))
            .collect();
        matching.sort_by(|a, b| (a.pub_date, a.id).cmp(&(b.pub_date, b.id)));
        if query.ordering == Ordering::NewestFirst {
            matching.reverse();
        }

        let pagination = query.pagination;
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, pagination, total))
    }

    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post, RepoError> {
        update.validate()?;
        let mut tables = self.tables.write().await;

        tables.require_group(update.group_id)?;
        let post = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("post", id))?;
        post.apply(update);
        Ok(post.clone())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("comment", id))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.comments.len() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryContentStore {
    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        new.validate()?;
        let mut tables = self.tables.write().await;

        if !tables.posts.contains_key(&new.post_id) {
            return Err(ConstraintViolation::MissingRelation("post").into());
        }
        tables.require_user(new.author_id, "author")?;

        let comment = Comment::new(new);
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created, b.id).cmp(&(a.created, a.id)));
        Ok(comments)
    }

    async fn update(&self, id: Uuid, text: String) -> Result<Comment, RepoError> {
        Comment::validate_text(&text)?;
        let mut tables = self.tables.write().await;

        let comment = tables
            .comments
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("comment", id))?;
        comment.text = text;
        Ok(comment.clone())
    }
}

#[async_trait]
impl BaseRepository<Follow, Uuid> for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Follow>, RepoError> {
        Ok(self.tables.read().await.follows.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .follows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("follow", id))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.follows.len() as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryContentStore {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<Follow, RepoError> {
        let follow = Follow::new(user_id, author_id)?;
        let mut tables = self.tables.write().await;

        tables.require_user(user_id, "user")?;
        tables.require_user(author_id, "author")?;
        if tables.find_follow(user_id, author_id).is_some() {
            return Err(ConstraintViolation::DuplicateFollow.into());
        }

        tables.follows.insert(follow.id, follow.clone());
        Ok(follow)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        match tables.find_follow(user_id, author_id) {
            Some(id) => Ok(tables.follows.remove(&id).is_some()),
            None => Ok(false),
        }
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.find_follow(user_id, author_id).is_some())
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<Follow>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn followers(&self, author_id: Uuid) -> Result<Vec<Follow>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.author_id == author_id)
            .cloned()
            .collect())
    }
}
