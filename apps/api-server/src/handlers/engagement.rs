//! Comments, likes and bookmarks on a post.

use actix_web::{HttpResponse, web};

use blog_shared::dto::CreateCommentRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/posts/{slug}/comments
pub async fn create_comment<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .engagement
        .create_comment(
            &slug,
            &identity.user_id,
            &body.body,
            body.parent_id.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// POST /api/v1/posts/{slug}/likes
pub async fn toggle_like<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let like = state.engagement.toggle_like(&slug, &identity.user_id).await?;
    Ok(HttpResponse::Ok().json(like))
}

/// POST /api/v1/posts/{slug}/bookmarks
pub async fn bookmark_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let bookmark = state
        .engagement
        .bookmark_post(&slug, &identity.user_id)
        .await?;
    Ok(HttpResponse::Created().json(bookmark))
}

/// DELETE /api/v1/posts/{slug}/bookmarks
pub async fn unbookmark_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let bookmark = state
        .engagement
        .unbookmark_post(&slug, &identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(bookmark))
}
