use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use yatube_core::domain::{NewPost, NewUser, User};
use yatube_core::ports::BaseRepository;
use yatube_infra::InMemoryContentStore;

use super::{configure_routes, json_config};
use crate::config::AppConfig;
use crate::state::AppState;

fn state() -> AppState {
    AppState::with_store(&AppConfig::default(), Arc::new(InMemoryContentStore::new()))
}

/// A stored user plus a bearer header for them. Skips password hashing.
async fn signed_in(state: &AppState, username: &str) -> (User, (header::HeaderName, String)) {
    let user = state
        .store
        .users()
        .create(NewUser::new(username, "unused"))
        .await
        .unwrap();
    let token = state.tokens.generate_token(user.id, username).unwrap();
    (user, (header::AUTHORIZATION, format!("Bearer {}", token)))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(json_config())
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_login_and_me() {
    let state = state();
    let app = app!(state);
    let creds = json!({ "username": "leo", "password": "password123" });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&creds)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&creds)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "leo", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&creds)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "leo");
}

#[actix_rt::test]
async fn test_register_rejects_short_password() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "leo", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "password");
}

#[actix_rt::test]
async fn test_malformed_json_is_a_problem_document() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"username\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["instance"], "/api/auth/login");
}

#[actix_rt::test]
async fn test_creating_post_requires_auth() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "text": "Hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_only_author_edits_and_deletes() {
    let state = state();
    let app = app!(state);
    let (_, author) = signed_in(&state, "auth").await;
    let (_, other) = signed_in(&state, "other").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(author.clone())
        .set_json(json!({ "text": "Тестовый пост" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let pub_date = body["data"]["pub_date"].clone();

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(other.clone())
        .set_json(json!({ "text": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(author.clone())
        .set_json(json!({ "text": "edited" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["text"], "edited");
    assert_eq!(body["data"]["author"], "auth");
    assert_eq!(body["data"]["pub_date"], pub_date);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(other)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(author)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_editing_text_keeps_the_image() {
    let state = state();
    let app = app!(state);
    let (_, author) = signed_in(&state, "auth").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(author.clone())
        .set_json(json!({ "text": "pic", "image": "small.gif" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["image"], "posts/small.gif");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(author.clone())
        .set_json(json!({ "text": "edited text only" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["text"], "edited text only");
    assert_eq!(body["data"]["image"], "posts/small.gif");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["post"]["image"], "posts/small.gif");

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", id))
        .insert_header(author)
        .set_json(json!({ "text": "no picture", "clear_image": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["image"], Value::Null);
}

#[actix_rt::test]
async fn test_index_is_cached_until_a_post_is_published() {
    let state = state();
    let app = app!(state);
    let (user, author) = signed_in(&state, "auth").await;

    state
        .store
        .posts()
        .create(NewPost::new(user.id, "first"))
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);

    // Written behind the API's back: the cached page does not see it.
    state
        .store
        .posts()
        .create(NewPost::new(user.id, "second"))
        .await
        .unwrap();
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(author)
        .set_json(json!({ "text": "third" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"][0]["text"], "third");
}

#[actix_rt::test]
async fn test_groups_and_group_posts() {
    let state = state();
    let app = app!(state);
    let (_, admin) = signed_in(&state, "admin").await;

    let group = json!({ "title": "Тестовая группа", "slug": "test-slug" });
    let req = test::TestRequest::post()
        .uri("/api/groups")
        .insert_header(admin.clone())
        .set_json(&group)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let group_id = body["data"]["id"].clone();

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .insert_header(admin.clone())
        .set_json(&group)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .insert_header(admin.clone())
        .set_json(json!({ "title": "No slug", "slug": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(admin)
        .set_json(json!({ "text": "Hello", "group_id": group_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/groups/test-slug/posts")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["group"]["title"], "Тестовая группа");
    assert_eq!(body["data"]["posts"]["items"][0]["text"], "Hello");

    let req = test::TestRequest::get()
        .uri("/api/groups/missing/posts")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_comments_show_on_post_detail() {
    let state = state();
    let app = app!(state);
    let (user, reader) = signed_in(&state, "leo").await;
    let post = state
        .store
        .posts()
        .create(NewPost::new(user.id, "post"))
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post.id))
        .insert_header(reader.clone())
        .set_json(json!({ "text": "Тестовый коментарий" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["comments"][0]["text"], "Тестовый коментарий");
    assert_eq!(body["data"]["comments"][0]["author"], "leo");

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", uuid::Uuid::new_v4()))
        .insert_header(reader)
        .set_json(json!({ "text": "lost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_follow_feed_and_profile_flag() {
    let state = state();
    let app = app!(state);
    let (author, _) = signed_in(&state, "auth").await;
    let (_, leo) = signed_in(&state, "leo").await;
    state
        .store
        .posts()
        .create(NewPost::new(author.id, "for followers"))
        .await
        .unwrap();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/profiles/auth/follow")
            .insert_header(leo.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(state.store.follows().count().await.unwrap(), 1);

    let req = test::TestRequest::get()
        .uri("/api/follow")
        .insert_header(leo.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"][0]["text"], "for followers");

    let req = test::TestRequest::get()
        .uri("/api/profiles/auth/posts")
        .insert_header(leo.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["following"], true);
    assert_eq!(body["data"]["posts"]["total"], 1);

    let req = test::TestRequest::post()
        .uri("/api/profiles/leo/follow")
        .insert_header(leo.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri("/api/profiles/auth/follow")
            .insert_header(leo.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["following"], false);
    }

    let req = test::TestRequest::get()
        .uri("/api/follow")
        .insert_header(leo)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 0);
}
