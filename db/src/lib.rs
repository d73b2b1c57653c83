use std::ops::Deref;

use domain::{Anime, User, WatchEntry};
use futures_util::TryStreamExt;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, FromRow, Postgres};
use tracing::instrument;

pub mod memory;

pub use memory::MemoryDatabase;

type PgPool = sqlx::Pool<Postgres>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Bulk reads and single-row writes over the anime tables.
///
/// Every read returns the full current contents of a table, the callers do
/// all filtering themselves.
pub trait DatabaseConnection {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every anime in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be reached.
    fn all_anime(&self) -> impl Future<Output = Result<Vec<Anime>, Self::Error>> + Send;

    /// Returns the anime with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be reached.
    fn find_anime(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Anime>, Self::Error>> + Send;

    /// Inserts the anime or replaces the row with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be reached.
    fn save_anime(&self, anime: &Anime) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns every user.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be reached.
    fn all_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send;

    /// Returns every watch entry joined with its anime.
    fn all_watch_entries(
        &self,
    ) -> impl Future<Output = Result<Vec<WatchEntry>, Self::Error>> + Send;
}

fn opts(name: &str) -> (PgConnectOptions, PgPoolOptions) {
    let connect_opts = PgConnectOptions::new().application_name(name);
    let pool_opts = PgPoolOptions::new().max_connections(5);
    (connect_opts, pool_opts)
}

/// Connect to the database using connection parameters from the environment.
///
/// # Errors
///
/// Will return an error when a connection cannot be established using the current config.
pub async fn connect(name: &str) -> Result<PgDatabase, sqlx::Error> {
    let (connect_opts, pool_opts) = opts(name);
    let pool = pool_opts.connect_with(connect_opts).await?;
    Ok(PgDatabase(pool))
}

#[derive(Debug, Clone)]
pub struct PgDatabase(PgPool);

impl Deref for PgDatabase {
    type Target = PgPool;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PgDatabase {
    /// Migrate the database to the latest version.
    ///
    /// # Errors
    ///
    /// Return an error when the database cannot be reached or when a migration fails.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&**self).await
    }
}

#[derive(FromRow)]
struct AnimeRecord {
    anime_id: String,
    title: Option<String>,
    score: Option<String>,
    episodes: Option<String>,
    genre: Option<String>,
}

impl From<AnimeRecord> for Anime {
    fn from(record: AnimeRecord) -> Self {
        Anime {
            id: record.anime_id,
            title: record.title,
            score: record.score,
            episodes: record.episodes,
            genre: record.genre,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    username: String,
    gender: Option<String>,
    join_date: Option<String>,
    stats_mean_score: Option<String>,
    user_days_spent_watching: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            username: record.username,
            gender: record.gender,
            join_date: record.join_date,
            stats_mean_score: record.stats_mean_score,
            user_days_spent_watching: record.user_days_spent_watching,
        }
    }
}

#[derive(FromRow)]
struct WatchEntryRecord {
    username: String,
    my_score: Option<String>,
    #[sqlx(flatten)]
    anime: AnimeRecord,
}

impl From<WatchEntryRecord> for WatchEntry {
    fn from(record: WatchEntryRecord) -> Self {
        WatchEntry {
            username: record.username,
            anime: record.anime.into(),
            my_score: record.my_score,
        }
    }
}

impl DatabaseConnection for PgDatabase {
    type Error = Error;

    #[instrument(skip(self))]
    async fn all_anime(&self) -> Result<Vec<Anime>, Self::Error> {
        let anime: Vec<_> = sqlx::query_as::<_, AnimeRecord>(include_str!("../queries/anime/find_all.sql"))
            .fetch(&**self)
            .map_ok(Anime::from)
            .try_collect()
            .await?;
        Ok(anime)
    }

    #[instrument(skip(self))]
    async fn find_anime(&self, id: &str) -> Result<Option<Anime>, Self::Error> {
        find_anime(&**self, id).await
    }

    #[instrument(skip(self, anime), fields(id = %anime.id))]
    async fn save_anime(&self, anime: &Anime) -> Result<(), Self::Error> {
        save_anime(&**self, anime).await
    }

    #[instrument(skip(self))]
    async fn all_users(&self) -> Result<Vec<User>, Self::Error> {
        let users: Vec<_> = sqlx::query_as::<_, UserRecord>(include_str!("../queries/users/find_all.sql"))
            .fetch(&**self)
            .map_ok(User::from)
            .try_collect()
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn all_watch_entries(&self) -> Result<Vec<WatchEntry>, Self::Error> {
        let entries: Vec<_> = sqlx::query_as::<_, WatchEntryRecord>(include_str!(
            "../queries/watch_entries/find_all.sql"
        ))
        .fetch(&**self)
        .map_ok(WatchEntry::from)
        .try_collect()
        .await?;
        Ok(entries)
    }
}

async fn find_anime<'e, E>(executor: E, id: &str) -> Result<Option<Anime>, Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let anime = sqlx::query_as::<_, AnimeRecord>(include_str!("../queries/anime/find_by_id.sql"))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(Anime::from);
    Ok(anime)
}

async fn save_anime<'e, E>(executor: E, anime: &Anime) -> Result<(), Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(include_str!("../queries/anime/save.sql"))
        .bind(&anime.id)
        .bind(&anime.title)
        .bind(&anime.score)
        .bind(&anime.episodes)
        .bind(&anime.genre)
        .execute(executor)
        .await?;
    Ok(())
}
