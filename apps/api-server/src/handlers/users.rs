//! Author pages, follows and the caller's profile.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/users/{author_id}
pub async fn get_author_info<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    author_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let info = state.queries.get_author_info(&author_id).await?;
    Ok(HttpResponse::Ok().json(info))
}

/// POST /api/v1/users/{author_id}/follow
pub async fn follow_user<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    author_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let follow = state
        .engagement
        .follow_user(&author_id, &identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(follow))
}

/// DELETE /api/v1/users/{author_id}/follow
pub async fn unfollow_user<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    author_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let follow = state
        .engagement
        .unfollow_user(&author_id, &identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(follow))
}

/// GET /api/v1/me/profile
pub async fn get_profile<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let profile = state.queries.get_profile(&identity.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}
