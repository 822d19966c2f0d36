//! Group handlers.

use actix_web::{HttpResponse, web};

use yatube_core::domain::{PostFilter, PostQuery};
use yatube_shared::ApiResponse;
use yatube_shared::dto::{GroupPostsResponse, GroupRequest, GroupResponse, PageQuery};

use super::post_page;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/groups
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups: Vec<GroupResponse> = state
        .store
        .groups()
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(groups)))
}

/// POST /api/groups
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<GroupRequest>,
) -> AppResult<HttpResponse> {
    let group = state.store.groups().create(body.into_inner().into()).await?;
    tracing::info!(group_id = %group.id, slug = %group.slug, by = %identity.username, "Group created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(GroupResponse::from(group))))
}

/// GET /api/groups/{slug}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .store
        .groups()
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group '{}' not found", slug)))?;

    let page = state
        .store
        .posts()
        .list(PostQuery::new(PostFilter::Group(group.id)).page(query.pagination(state.posts_per_page)))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(GroupPostsResponse {
        group: group.into(),
        posts: post_page(&state, page).await?,
    })))
}
