//! Authentication handlers.

use actix_web::{HttpResponse, web};

use yatube_core::domain::NewUser;
use yatube_core::ports::BaseRepository;
use yatube_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn token_response(state: &AppState, token: String) -> AuthResponse {
    AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Rejects passwords below the minimum length with a 422 on `password`.
    let password_hash = state.passwords.hash(&req.password)?;

    // Username rules and uniqueness are enforced by the store.
    let user = state
        .store
        .users()
        .create(NewUser::new(req.username, password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let token = state.tokens.generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Created().json(token_response(&state, token)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .store
        .users()
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = state.tokens.generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Ok().json(token_response(&state, token)))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    // The token may outlive its account.
    let user = state
        .store
        .users()
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
