mod error;
mod parse;
pub mod queries;
pub mod views;

pub use error::Error;

/// A catalog entry. Numeric columns are stored as text and parsed on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anime {
    pub id: String,
    pub title: Option<String>,
    pub score: Option<String>,
    pub episodes: Option<String>,
    /// Comma separated genre names.
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub gender: Option<String>,
    pub join_date: Option<String>,
    pub stats_mean_score: Option<String>,
    pub user_days_spent_watching: Option<String>,
}

/// One user having watched (and rated) one anime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    pub username: String,
    pub anime: Anime,
    pub my_score: Option<String>,
}

impl Anime {
    /// Add `delta` to the stored episode count and write it back as text.
    ///
    /// There is no lower bound, the count may become negative.
    ///
    /// # Errors
    ///
    /// Fails when the current count is absent or not an integer, or when the
    /// addition overflows.
    pub fn adjust_episodes(&mut self, delta: i32) -> Result<i32, Error> {
        let current = parse::int(self.episodes.as_deref(), "episodes")?;
        let updated = current
            .checked_add(delta)
            .ok_or(Error::EpisodeOverflow { current, delta })?;
        self.episodes = Some(updated.to_string());
        Ok(updated)
    }
}
