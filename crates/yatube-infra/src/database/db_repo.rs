//! SQL repository implementations.
//!
//! Uniqueness, the self-follow check and every cascade are enforced by the
//! schema. Operations that read before they write run in one transaction so
//! the read and the write see the same rows.

use async_trait::async_trait;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};
use uuid::Uuid;

use yatube_core::domain::{
    Comment, Follow, Group, GroupFields, NewComment, NewPost, NewUser, Ordering, Page, Post,
    PostFilter, PostQuery, PostUpdate, User,
};
use yatube_core::error::{ConstraintViolation, RepoError};
use yatube_core::ports::{
    CommentRepository, ContentStore, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};

use super::db_base::{DbRepository, query_error, write_error};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// SQL user repository.
pub type DbUserRepository = DbRepository<UserEntity>;

/// SQL group repository.
pub type DbGroupRepository = DbRepository<GroupEntity>;

/// SQL post repository.
pub type DbPostRepository = DbRepository<PostEntity>;

/// SQL comment repository.
pub type DbCommentRepository = DbRepository<CommentEntity>;

/// SQL follow repository.
pub type DbFollowRepository = DbRepository<FollowEntity>;

async fn ensure_exists<E, C>(conn: &C, id: Uuid, relation: &'static str) -> Result<(), RepoError>
where
    E: EntityTrait,
    E::PrimaryKey: sea_orm::PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait + Sync,
{
    let found = E::find_by_id(id).one(conn).await.map_err(query_error)?;
    if found.is_none() {
        return Err(ConstraintViolation::MissingRelation(relation).into());
    }
    Ok(())
}

#[async_trait]
impl UserRepository for DbUserRepository {
    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        new.validate()?;
        let user = User::new(new.username, new.password_hash);

        UserEntity::insert(user::ActiveModel::from(user.clone()))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Some(ConstraintViolation::DuplicateUsername(user.username.clone())),
                    "user",
                )
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for DbGroupRepository {
    async fn create(&self, fields: GroupFields) -> Result<Group, RepoError> {
        fields.validate()?;
        let group = Group::new(fields);

        GroupEntity::insert(group::ActiveModel::from(group.clone()))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Some(ConstraintViolation::DuplicateSlug(group.slug.clone())),
                    "group",
                )
            })?;

        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Slug)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, fields: GroupFields) -> Result<Group, RepoError> {
        fields.validate()?;
        let txn = self.db.begin().await.map_err(query_error)?;

        let mut group: Group = GroupEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_error)?
            .ok_or_else(|| RepoError::not_found("group", id))?
            .into();
        group.apply(fields);

        let active = group::ActiveModel {
            id: Unchanged(id),
            title: Set(group.title.clone()),
            slug: Set(group.slug.clone()),
            description: Set(group.description.clone()),
        };
        active.update(&txn).await.map_err(|e| {
            write_error(
                e,
                Some(ConstraintViolation::DuplicateSlug(group.slug.clone())),
                "group",
            )
        })?;

        txn.commit().await.map_err(query_error)?;
        Ok(group)
    }
}

#[async_trait]
impl PostRepository for DbPostRepository {
    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        new.validate()?;
        let txn = self.db.begin().await.map_err(query_error)?;

        ensure_exists::<UserEntity, _>(&txn, new.author_id, "author").await?;
        if let Some(group_id) = new.group_id {
            ensure_exists::<GroupEntity, _>(&txn, group_id, "group").await?;
        }

        let post = Post::new(new);
        PostEntity::insert(post::ActiveModel::from(post.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| write_error(e, None, "author"))?;

        txn.commit().await.map_err(query_error)?;
        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");
        Ok(post)
    }

    async fn list(&self, query: PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = PostEntity::find();

        select = match query.filter {
            PostFilter::All => select,
            PostFilter::Author(author_id) => select.filter(post::Column::AuthorId.eq(author_id)),
            PostFilter::Group(group_id) => select.filter(post::Column::GroupId.eq(group_id)),
            PostFilter::FollowedBy(user_id) => select.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(follow::Column::AuthorId)
                        .from(FollowEntity)
                        .and_where(follow::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            ),
        };

        select = match query.ordering {
            Ordering::NewestFirst => select
                .order_by_desc(post::Column::PubDate)
                .order_by_desc(post::Column::Id),
            Ordering::OldestFirst => select
                .order_by_asc(post::Column::PubDate)
                .order_by_asc(post::Column::Id),
        };

        let pagination = query.pagination;
        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(query_error)?;
        let items = select
            .offset(pagination.offset())
            .limit(pagination.per_page)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(Page::new(
            items.into_iter().map(Into::into).collect(),
            pagination,
            total,
        ))
    }

    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post, RepoError> {
        update.validate()?;
        let txn = self.db.begin().await.map_err(query_error)?;

        let mut post: Post = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_error)?
            .ok_or_else(|| RepoError::not_found("post", id))?
            .into();
        if let Some(group_id) = update.group_id {
            ensure_exists::<GroupEntity, _>(&txn, group_id, "group").await?;
        }
        post.apply(update);

        // author_id and pub_date stay NotSet so the UPDATE never touches them.
        let active = post::ActiveModel {
            id: Unchanged(id),
            text: Set(post.text.clone()),
            group_id: Set(post.group_id),
            image: Set(post.image.clone()),
            ..Default::default()
        };
        active
            .update(&txn)
            .await
            .map_err(|e| write_error(e, None, "group"))?;

        txn.commit().await.map_err(query_error)?;
        tracing::info!(post_id = %id, "Post updated");
        Ok(post)
    }
}

#[async_trait]
impl CommentRepository for DbCommentRepository {
    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        new.validate()?;
        let txn = self.db.begin().await.map_err(query_error)?;

        ensure_exists::<PostEntity, _>(&txn, new.post_id, "post").await?;
        ensure_exists::<UserEntity, _>(&txn, new.author_id, "author").await?;

        let comment = Comment::new(new);
        CommentEntity::insert(comment::ActiveModel::from(comment.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| write_error(e, None, "post"))?;

        txn.commit().await.map_err(query_error)?;
        tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, text: String) -> Result<Comment, RepoError> {
        Comment::validate_text(&text)?;
        let txn = self.db.begin().await.map_err(query_error)?;

        let mut comment: Comment = CommentEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_error)?
            .ok_or_else(|| RepoError::not_found("comment", id))?
            .into();
        comment.text = text;

        let active = comment::ActiveModel {
            id: Unchanged(id),
            text: Set(comment.text.clone()),
            ..Default::default()
        };
        active.update(&txn).await.map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(comment)
    }
}

#[async_trait]
impl FollowRepository for DbFollowRepository {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<Follow, RepoError> {
        let follow = Follow::new(user_id, author_id)?;

        // A single INSERT: the unique index and the check constraint decide.
        FollowEntity::insert(follow::ActiveModel::from(follow.clone()))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| write_error(e, Some(ConstraintViolation::DuplicateFollow), "user"))?;

        tracing::info!(%user_id, %author_id, "Follow created");
        Ok(follow)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let count = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(query_error)?;

        Ok(count > 0)
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn followers(&self, author_id: Uuid) -> Result<Vec<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::AuthorId.eq(author_id))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Content store backed by a SQL database.
pub struct DbContentStore {
    users: DbUserRepository,
    groups: DbGroupRepository,
    posts: DbPostRepository,
    comments: DbCommentRepository,
    follows: DbFollowRepository,
}

impl DbContentStore {
    pub fn new(db: DbConn) -> Self {
        Self {
            users: DbRepository::new(db.clone()),
            groups: DbRepository::new(db.clone()),
            posts: DbRepository::new(db.clone()),
            comments: DbRepository::new(db.clone()),
            follows: DbRepository::new(db),
        }
    }
}

impl ContentStore for DbContentStore {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn groups(&self) -> &dyn GroupRepository {
        &self.groups
    }

    fn posts(&self) -> &dyn PostRepository {
        &self.posts
    }

    fn comments(&self) -> &dyn CommentRepository {
        &self.comments
    }

    fn follows(&self) -> &dyn FollowRepository {
        &self.follows
    }
}
