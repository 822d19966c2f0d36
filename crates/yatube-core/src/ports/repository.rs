use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Comment, Follow, Group, GroupFields, NewComment, NewPost, NewUser, Page, Post, PostQuery,
    PostUpdate, User,
};
use crate::error::RepoError;

/// Generic repository trait defining the operations every entity shares.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID, applying the cascade and null-out rules
    /// of its dependents. Fails with `NotFound` if there is no such row.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// User repository with domain-specific methods.
///
/// Deleting a user removes their posts, their comments, and every follow
/// row that names them on either side.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Register a user. Fails with `DuplicateUsername` if the name is taken.
    async fn create(&self, new: NewUser) -> Result<User, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository. Deleting a group keeps its posts and clears their group.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    /// Fails with `DuplicateSlug` if another group owns the slug.
    async fn create(&self, fields: GroupFields) -> Result<Group, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups, ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    async fn update(&self, id: Uuid, fields: GroupFields) -> Result<Group, RepoError>;
}

/// Post repository. Deleting a post removes its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Publish a post; the store assigns its id and `pub_date`.
    async fn create(&self, new: NewPost) -> Result<Post, RepoError>;

    /// One page of posts matching the query, newest first by default.
    async fn list(&self, query: PostQuery) -> Result<Page<Post>, RepoError>;

    /// Replace text, group and image. Author and `pub_date` never change.
    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Attach a comment to an existing post; `created` is assigned here.
    async fn create(&self, new: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn update(&self, id: Uuid, text: String) -> Result<Comment, RepoError>;
}

/// Follow repository. Follows are created and deleted, never updated.
#[async_trait]
pub trait FollowRepository: BaseRepository<Follow, Uuid> {
    /// Subscribe `user_id` to `author_id`.
    ///
    /// Fails with `SelfFollow` when both are the same user and with
    /// `DuplicateFollow` when the pair already exists. The check and the
    /// insert are atomic: of two concurrent identical calls, one fails.
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<Follow, RepoError>;

    /// Remove the pair if present. Returns whether a row was deleted.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    /// Follows where `user_id` is the follower.
    async fn following(&self, user_id: Uuid) -> Result<Vec<Follow>, RepoError>;

    /// Follows where `author_id` is the one being followed.
    async fn followers(&self, author_id: Uuid) -> Result<Vec<Follow>, RepoError>;
}

/// The content store: every repository behind one handle.
pub trait ContentStore: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn groups(&self) -> &dyn GroupRepository;
    fn posts(&self) -> &dyn PostRepository;
    fn comments(&self) -> &dyn CommentRepository;
    fn follows(&self) -> &dyn FollowRepository;
}
