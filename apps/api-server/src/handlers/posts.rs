//! Post endpoints - public reads and the author's own posts.

use actix_web::{HttpResponse, web};

use blog_core::ports::Direction;
use blog_core::services::{CreatePost, ListPostsQuery, UpdatePost};
use blog_shared::dto::{CreatePostRequest, DeleteResponse, ListQuery, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn listing(query: &ListQuery) -> ListPostsQuery {
    let params = query.normalise();
    ListPostsQuery {
        page: params.page,
        per_page: params.per_page,
        order: if params.ascending {
            Direction::Asc
        } else {
            Direction::Desc
        },
    }
}

/// GET /api/v1/posts
pub async fn list_posts<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = state.queries.list_posts(listing(&query)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/posts/{slug}
pub async fn get_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.queries.get_post_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/v1/me/posts
pub async fn list_my_posts<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .queries
        .list_my_posts(&identity.user_id, listing(&query))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/v1/me/posts
pub async fn create_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let post = state
        .posts
        .create(CreatePost {
            author_id: identity.user_id,
            title: body.title,
            slug: body.slug,
            raw_markdown: body.raw_markdown,
            publish: body.publish,
        })
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/v1/me/posts/{slug}
pub async fn update_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let post = state
        .posts
        .update(UpdatePost {
            slug: slug.into_inner(),
            user_id: identity.user_id,
            title: body.title,
            new_slug: body.slug,
            raw_markdown: body.raw_markdown,
            publish: body.publish,
        })
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/me/posts/{slug}
pub async fn delete_post<Tx: Send + Sync + 'static>(
    state: web::Data<AppState<Tx>>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&slug, &identity.user_id).await?;
    Ok(HttpResponse::Ok().json(DeleteResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}
