use axum::Router;
use axum::routing::{get, post};
use db::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Builds the HTTP API on top of a store.
pub fn build_app<D>(db: D) -> Router
where
    D: DatabaseConnection + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/anime/top", get(handlers::top_anime::<D>))
        .route("/anime/popular", get(handlers::popular_genres::<D>))
        .route(
            "/anime/{anime_id}/episodes",
            post(handlers::update_episodes::<D>),
        )
        .route("/users/top", get(handlers::top_users::<D>))
        .route("/users/active/{year}", get(handlers::active_users::<D>))
        .route(
            "/users/{username}/watched",
            get(handlers::watched_anime::<D>),
        )
        .route(
            "/users/{username}/similars",
            get(handlers::similar_users::<D>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
