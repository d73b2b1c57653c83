use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use db::DatabaseConnection;
use domain::queries::{DEFAULT_WATCHED_COUNT, TopUsersQuery};
use domain::views::{ActiveUser, GenreCount, SimilarUser, TopAnime, TopUser, WatchedAnime};
use serde::Deserialize;

use crate::error::Error;
use crate::service;

#[derive(Debug, Deserialize)]
pub struct WatchedParams {
    #[serde(default = "default_watched_count")]
    count: usize,
}

fn default_watched_count() -> usize {
    DEFAULT_WATCHED_COUNT
}

#[derive(Debug, Deserialize)]
pub struct EpisodeParams {
    #[serde(default = "default_episode_delta")]
    value: i32,
}

fn default_episode_delta() -> i32 {
    1
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn top_anime<D>(State(db): State<D>) -> Result<Json<Vec<TopAnime>>, Error>
where
    D: DatabaseConnection,
{
    service::top_anime(&db).await.map(Json)
}

pub async fn top_users<D>(
    State(db): State<D>,
    Query(query): Query<TopUsersQuery>,
) -> Result<Json<Vec<TopUser>>, Error>
where
    D: DatabaseConnection,
{
    service::top_users(&db, &query).await.map(Json)
}

pub async fn watched_anime<D>(
    State(db): State<D>,
    Path(username): Path<String>,
    Query(params): Query<WatchedParams>,
) -> Result<Json<Vec<WatchedAnime>>, Error>
where
    D: DatabaseConnection,
{
    service::watched_anime(&db, &username, params.count)
        .await
        .map(Json)
}

pub async fn popular_genres<D>(State(db): State<D>) -> Result<Json<Vec<GenreCount>>, Error>
where
    D: DatabaseConnection,
{
    service::popular_genres(&db).await.map(Json)
}

pub async fn active_users<D>(
    State(db): State<D>,
    Path(year): Path<i32>,
) -> Result<Json<Vec<ActiveUser>>, Error>
where
    D: DatabaseConnection,
{
    service::active_users(&db, year).await.map(Json)
}

pub async fn similar_users<D>(
    State(db): State<D>,
    Path(username): Path<String>,
) -> Result<Json<Vec<SimilarUser>>, Error>
where
    D: DatabaseConnection,
{
    service::similar_users(&db, &username).await.map(Json)
}

/// Responds with an empty 404 when the anime does not exist.
pub async fn update_episodes<D>(
    State(db): State<D>,
    Path(anime_id): Path<String>,
    Query(params): Query<EpisodeParams>,
) -> Result<Response, Error>
where
    D: DatabaseConnection,
{
    let response = match service::update_episodes(&db, &anime_id, params.value).await? {
        Some(update) => Json(update).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    };
    Ok(response)
}
