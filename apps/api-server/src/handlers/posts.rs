//! Post and comment handlers.

use actix_web::{HttpResponse, http::header::ContentType, web};
use uuid::Uuid;

use yatube_core::domain::{Post, PostQuery};
use yatube_core::error::DomainError;
use yatube_core::ports::BaseRepository;
use yatube_shared::ApiResponse;
use yatube_shared::dto::{
    CommentRequest, CommentResponse, PageQuery, PostDetailResponse, PostRequest, PostResponse,
};

use super::{post_page, usernames};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Cache keys for rendered index pages start with this.
const INDEX_CACHE_PREFIX: &str = "index:page:";

async fn find_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .store
        .posts()
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound { entity_type: "post", id }.into())
}

/// Load a post the caller is about to change, refusing anyone but its author.
async fn own_post(state: &AppState, id: Uuid, identity: &Identity) -> AppResult<Post> {
    let post = find_post(state, id).await?;
    if post.author_id != identity.user_id {
        tracing::debug!(post_id = %id, user_id = %identity.user_id, "Edit by non-author refused");
        return Err(DomainError::Forbidden("post").into());
    }
    Ok(post)
}

async fn invalidate_index(state: &AppState) {
    if let Err(e) = state.cache.delete_prefix(INDEX_CACHE_PREFIX).await {
        tracing::warn!("Failed to invalidate index cache: {}", e);
    }
}

/// GET /api/posts?page=N - every post, newest first. Pages are cached briefly.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let pagination = query.pagination(state.posts_per_page);
    let key = format!("{}{}", INDEX_CACHE_PREFIX, pagination.page);

    if let Some(body) = state.cache.get(&key).await {
        return Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body));
    }

    let page = state
        .store
        .posts()
        .list(PostQuery::default().page(pagination))
        .await?;
    let body = serde_json::to_string(&ApiResponse::ok(post_page(&state, page).await?))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Err(e) = state
        .cache
        .set(&key, &body, Some(state.index_cache_ttl))
        .await
    {
        tracing::warn!("Failed to cache index page: {}", e);
    }

    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

/// GET /api/posts/{id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;

    let group = match post.group_id {
        Some(group_id) => state.store.groups().find_by_id(group_id).await?,
        None => None,
    };
    let comments = state.store.comments().list_for_post(post.id).await?;

    let names = usernames(
        &state,
        std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id)),
    )
    .await?;
    let name = |id: &Uuid| names.get(id).cloned().unwrap_or_default();

    let response = PostDetailResponse {
        post: PostResponse::new(post.clone(), name(&post.author_id)),
        group: group.map(Into::into),
        comments: comments
            .into_iter()
            .map(|c| {
                let author = name(&c.author_id);
                CommentResponse::new(c, author)
            })
            .collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let new = body.into_inner().into_new_post(identity.user_id);
    let post = state.store.posts().create(new).await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post published");

    invalidate_index(&state).await;

    Ok(HttpResponse::Created().json(ApiResponse::ok(PostResponse::new(
        post,
        identity.username,
    ))))
}

/// PUT /api/posts/{id} - author only.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = own_post(&state, path.into_inner(), &identity).await?;
    let post = state
        .store
        .posts()
        .update(post.id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse::new(
        post,
        identity.username,
    ))))
}

/// DELETE /api/posts/{id} - author only. Comments go with the post.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = own_post(&state, path.into_inner(), &identity).await?;
    state.store.posts().delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    invalidate_index(&state).await;

    Ok(HttpResponse::Ok().json(ApiResponse::done("Post deleted")))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;

    let new = body.into_inner().into_new_comment(post.id, identity.user_id);
    let comment = state.store.comments().create(new).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(CommentResponse::new(
        comment,
        identity.username,
    ))))
}
