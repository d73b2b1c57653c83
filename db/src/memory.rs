//! A [`DatabaseConnection`] kept entirely in process memory.
//!
//! Tables keep insertion order, so full scans come back in the order rows were added.

use std::convert::Infallible;
use std::sync::Arc;

use domain::{Anime, User, WatchEntry};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::DatabaseConnection;

/// A watch entry as stored, referencing its anime by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRecord {
    pub username: String,
    pub anime_id: String,
    pub my_score: Option<String>,
}

#[derive(Debug, Default)]
pub struct Tables {
    pub anime: Vec<Anime>,
    pub users: Vec<User>,
    pub watch_entries: Vec<WatchRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    #[must_use]
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

impl DatabaseConnection for MemoryDatabase {
    type Error = Infallible;

    async fn all_anime(&self) -> Result<Vec<Anime>, Self::Error> {
        Ok(self.tables.read().await.anime.clone())
    }

    async fn find_anime(&self, id: &str) -> Result<Option<Anime>, Self::Error> {
        let tables = self.tables.read().await;
        Ok(tables.anime.iter().find(|anime| anime.id == id).cloned())
    }

    #[instrument(skip(self, anime), fields(id = %anime.id))]
    async fn save_anime(&self, anime: &Anime) -> Result<(), Self::Error> {
        let mut tables = self.tables.write().await;
        match tables.anime.iter_mut().find(|stored| stored.id == anime.id) {
            Some(stored) => stored.clone_from(anime),
            None => tables.anime.push(anime.clone()),
        }
        Ok(())
    }

    async fn all_users(&self) -> Result<Vec<User>, Self::Error> {
        Ok(self.tables.read().await.users.clone())
    }

    /// Entries whose anime is not in the catalog are left out, like an inner join.
    async fn all_watch_entries(&self) -> Result<Vec<WatchEntry>, Self::Error> {
        let tables = self.tables.read().await;
        let catalog: FxHashMap<&str, &Anime> = tables
            .anime
            .iter()
            .map(|anime| (anime.id.as_str(), anime))
            .collect();
        Ok(tables
            .watch_entries
            .iter()
            .filter_map(|record| {
                let anime = catalog.get(record.anime_id.as_str())?;
                Some(WatchEntry {
                    username: record.username.clone(),
                    anime: (*anime).clone(),
                    my_score: record.my_score.clone(),
                })
            })
            .collect())
    }
}
