//! Loads full table snapshots from the store and runs the reporting queries over them.

use db::DatabaseConnection;
use domain::queries::{self, TopUsersQuery};
use domain::views::{
    ActiveUser, EpisodeUpdate, GenreCount, SimilarUser, TopAnime, TopUser, WatchedAnime,
};
use tracing::{info, instrument};

use crate::error::Error;

pub async fn top_anime<D: DatabaseConnection>(db: &D) -> Result<Vec<TopAnime>, Error> {
    let anime = db.all_anime().await.map_err(Error::store)?;
    Ok(queries::top_anime_by_episodes(&anime)?)
}

pub async fn top_users<D: DatabaseConnection>(
    db: &D,
    query: &TopUsersQuery,
) -> Result<Vec<TopUser>, Error> {
    let users = db.all_users().await.map_err(Error::store)?;
    Ok(queries::top_users(&users, query)?)
}

pub async fn watched_anime<D: DatabaseConnection>(
    db: &D,
    username: &str,
    count: usize,
) -> Result<Vec<WatchedAnime>, Error> {
    let entries = db.all_watch_entries().await.map_err(Error::store)?;
    Ok(queries::watched_anime(&entries, username, count)?)
}

pub async fn popular_genres<D: DatabaseConnection>(db: &D) -> Result<Vec<GenreCount>, Error> {
    let entries = db.all_watch_entries().await.map_err(Error::store)?;
    Ok(queries::popular_genres(&entries))
}

pub async fn active_users<D: DatabaseConnection>(
    db: &D,
    year: i32,
) -> Result<Vec<ActiveUser>, Error> {
    let users = db.all_users().await.map_err(Error::store)?;
    Ok(queries::active_users(&users, year)?)
}

pub async fn similar_users<D: DatabaseConnection>(
    db: &D,
    username: &str,
) -> Result<Vec<SimilarUser>, Error> {
    let entries = db.all_watch_entries().await.map_err(Error::store)?;
    Ok(queries::similar_users(&entries, username))
}

/// Adds `delta` to the episode count of an anime and persists it.
///
/// Returns `None` without writing anything when the anime does not exist.
#[instrument(skip(db))]
pub async fn update_episodes<D: DatabaseConnection>(
    db: &D,
    anime_id: &str,
    delta: i32,
) -> Result<Option<EpisodeUpdate>, Error> {
    let Some(mut anime) = db.find_anime(anime_id).await.map_err(Error::store)? else {
        return Ok(None);
    };
    let episodes = anime.adjust_episodes(delta)?;
    db.save_anime(&anime).await.map_err(Error::store)?;
    info!(episodes, "Updated episode count");
    Ok(Some(EpisodeUpdate {
        anime_id: anime.id,
        episodes,
    }))
}
