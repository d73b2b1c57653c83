//! Result rows returned by the queries, serialized the way clients expect them.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAnime {
    pub anime_id: String,
    pub title: Option<String>,
    pub score: Option<String>,
    pub episodes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub username: String,
    pub mean_score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedAnime {
    pub anime_id: String,
    pub title: Option<String>,
    pub my_score: Option<String>,
    pub episodes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub username: String,
    pub days_spent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    pub username: String,
    pub shared_count: u64,
}

/// Outcome of an episode adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUpdate {
    pub anime_id: String,
    pub episodes: i32,
}
