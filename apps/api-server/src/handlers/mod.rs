//! HTTP handlers and route configuration.

mod engagement;
mod health;
mod posts;
mod users;

use actix_web::web;

/// Configure all application routes for a store backend with transaction type `Tx`.
pub fn configure_routes<Tx: Send + Sync + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/v1")
                    // Public routes
                    .route("/posts", web::get().to(posts::list_posts::<Tx>))
                    .route("/posts/{slug}", web::get().to(posts::get_post::<Tx>))
                    .route(
                        "/users/{author_id}",
                        web::get().to(users::get_author_info::<Tx>),
                    )
                    // The caller's own content
                    .service(
                        web::scope("/me")
                            .route("/profile", web::get().to(users::get_profile::<Tx>))
                            .route("/posts", web::get().to(posts::list_my_posts::<Tx>))
                            .route("/posts", web::post().to(posts::create_post::<Tx>))
                            .route("/posts/{slug}", web::put().to(posts::update_post::<Tx>))
                            .route(
                                "/posts/{slug}",
                                web::delete().to(posts::delete_post::<Tx>),
                            ),
                    )
                    // Post interactions
                    .route(
                        "/posts/{slug}/comments",
                        web::post().to(engagement::create_comment::<Tx>),
                    )
                    .route(
                        "/posts/{slug}/likes",
                        web::post().to(engagement::toggle_like::<Tx>),
                    )
                    .route(
                        "/posts/{slug}/bookmarks",
                        web::post().to(engagement::bookmark_post::<Tx>),
                    )
                    .route(
                        "/posts/{slug}/bookmarks",
                        web::delete().to(engagement::unbookmark_post::<Tx>),
                    )
                    // User interactions
                    .route(
                        "/users/{author_id}/follow",
                        web::post().to(users::follow_user::<Tx>),
                    )
                    .route(
                        "/users/{author_id}/follow",
                        web::delete().to(users::unfollow_user::<Tx>),
                    ),
            ),
    );
}
