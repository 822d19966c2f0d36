//! HTTP handlers and route configuration.

mod auth;
mod groups;
mod health;
mod posts;
mod profiles;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use actix_web::{HttpResponse, error::InternalError, web};
use uuid::Uuid;

use yatube_core::domain::{Page, Post};
use yatube_core::ports::BaseRepository;
use yatube_shared::ErrorResponse;
use yatube_shared::dto::{PageResponse, PostResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::detail))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/groups")
                    .route("", web::get().to(groups::list))
                    .route("", web::post().to(groups::create))
                    .route("/{slug}/posts", web::get().to(groups::posts)),
            )
            .service(
                web::scope("/profiles/{username}")
                    .route("/posts", web::get().to(profiles::profile))
                    .route("/follow", web::post().to(profiles::follow))
                    .route("/follow", web::delete().to(profiles::unfollow)),
            )
            .route("/follow", web::get().to(profiles::follow_index)),
    );
}

/// Malformed JSON bodies answer with a problem document instead of plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        let body = ErrorResponse::bad_request(err.to_string()).with_instance(req.path());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Look up the username of every distinct author in `ids`.
async fn usernames(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, String>> {
    let mut names = HashMap::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        let user = state.store.users().find_by_id(id).await?;
        names.insert(id, user.map(|u| u.username).unwrap_or_default());
    }
    Ok(names)
}

/// Attach author names to a page of posts.
async fn post_page(state: &AppState, page: Page<Post>) -> AppResult<PageResponse<PostResponse>> {
    let names = usernames(state, page.items.iter().map(|p| p.author_id)).await?;
    let page = page.map(|post| {
        let author = names.get(&post.author_id).cloned().unwrap_or_default();
        PostResponse::new(post, author)
    });
    Ok(page.into())
}
