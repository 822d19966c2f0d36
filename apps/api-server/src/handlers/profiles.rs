//! Author profiles, following and the follow feed.

use actix_web::{HttpResponse, web};

use yatube_core::domain::{PostFilter, PostQuery, User};
use yatube_core::error::{ConstraintViolation, RepoError};
use yatube_shared::ApiResponse;
use yatube_shared::dto::{FollowResponse, PageQuery, ProfileResponse, UserResponse};

use super::post_page;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn find_author(state: &AppState, username: &str) -> AppResult<User> {
    state
        .store
        .users()
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", username)))
}

/// GET /api/profiles/{username}/posts
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author = find_author(&state, &path).await?;

    let page = state
        .store
        .posts()
        .list(
            PostQuery::new(PostFilter::Author(author.id))
                .page(query.pagination(state.posts_per_page)),
        )
        .await?;

    let following = match viewer.0 {
        Some(viewer) => {
            state
                .store
                .follows()
                .is_following(viewer.user_id, author.id)
                .await?
        }
        None => false,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileResponse {
        author: UserResponse::from(&author),
        following,
        posts: post_page(&state, page).await?,
    })))
}

/// POST /api/profiles/{username}/follow
///
/// Following someone already followed is not an error.
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = find_author(&state, &path).await?;

    match state.store.follows().follow(identity.user_id, author.id).await {
        Ok(_) => {
            tracing::info!(user = %identity.username, author = %author.username, "Followed");
        }
        Err(RepoError::Constraint(ConstraintViolation::DuplicateFollow)) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(FollowResponse {
        user: identity.username,
        author: author.username,
        following: true,
    })))
}

/// DELETE /api/profiles/{username}/follow
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = find_author(&state, &path).await?;

    let removed = state
        .store
        .follows()
        .unfollow(identity.user_id, author.id)
        .await?;
    tracing::debug!(removed, author = %author.username, "Unfollow");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(FollowResponse {
        user: identity.username,
        author: author.username,
        following: false,
    })))
}

/// GET /api/follow?page=N - posts by every author the caller follows.
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .store
        .posts()
        .list(
            PostQuery::new(PostFilter::FollowedBy(identity.user_id))
                .page(query.pagination(state.posts_per_page)),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_page(&state, page).await?)))
}
