//! Common test utilities.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use anime_stats::server;
use db::memory::{Tables, WatchRecord};
use db::{DatabaseConnection, MemoryDatabase};
use domain::{Anime, User, WatchEntry};

/// Wraps a [`MemoryDatabase`] and counts the writes made through it.
#[derive(Debug, Clone, Default)]
pub struct CountingDatabase {
    inner: MemoryDatabase,
    saves: Arc<AtomicUsize>,
}

impl CountingDatabase {
    pub fn new(inner: MemoryDatabase) -> Self {
        Self {
            inner,
            saves: Arc::default(),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl DatabaseConnection for CountingDatabase {
    type Error = Infallible;

    fn all_anime(&self) -> impl Future<Output = Result<Vec<Anime>, Self::Error>> + Send {
        self.inner.all_anime()
    }

    fn find_anime(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Anime>, Self::Error>> + Send {
        self.inner.find_anime(id)
    }

    fn save_anime(&self, anime: &Anime) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_anime(anime)
    }

    fn all_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send {
        self.inner.all_users()
    }

    fn all_watch_entries(
        &self,
    ) -> impl Future<Output = Result<Vec<WatchEntry>, Self::Error>> + Send {
        self.inner.all_watch_entries()
    }
}

pub fn anime(id: &str, title: &str, episodes: Option<&str>, genre: &str) -> Anime {
    Anime {
        id: id.into(),
        title: Some(title.into()),
        score: Some("8.00".into()),
        episodes: episodes.map(Into::into),
        genre: Some(genre.into()),
    }
}

pub fn user(username: &str, gender: &str, join_date: &str, mean: &str, days: &str) -> User {
    User {
        username: username.into(),
        gender: Some(gender.into()),
        join_date: Some(join_date.into()),
        stats_mean_score: Some(mean.into()),
        user_days_spent_watching: Some(days.into()),
    }
}

pub fn watch(username: &str, anime_id: &str, my_score: &str) -> WatchRecord {
    WatchRecord {
        username: username.into(),
        anime_id: anime_id.into(),
        my_score: Some(my_score.into()),
    }
}

/// A small catalog with four anime, five users and their watch history.
pub fn seeded_tables() -> Tables {
    Tables {
        anime: vec![
            anime("1", "Hajime no Ippo", Some("12"), "Action, Comedy"),
            anime("2", "Cowboy Bebop", Some("26"), "Action,Sci-Fi"),
            anime("3", "Kimi no Na wa.", Some("1"), "Drama, Romance"),
            anime("4", "Untitled Sequel", None, "Drama"),
        ],
        users: vec![
            user("alice", "Female", "2015-03-01", "8.9", "40.5"),
            user("bob", "Male", "2016-01-01", "9.2", "100"),
            user("carol", "Female", "2017-06-06", "9.4", "12"),
            user("dave", "Male", "2015-08-08", "7.0", "300"),
            user("erin", "Female", "2011-01-01", "9.9", "5"),
        ],
        watch_entries: vec![
            watch("alice", "1", "9"),
            watch("alice", "2", "7"),
            watch("alice", "3", "10"),
            watch("bob", "1", "8"),
            watch("bob", "2", "6"),
            watch("carol", "3", "9"),
            watch("dave", "1", "4"),
        ],
    }
}

pub fn seeded_database() -> CountingDatabase {
    CountingDatabase::new(MemoryDatabase::new(seeded_tables()))
}

pub fn test_app(db: CountingDatabase) -> Router {
    server::build_app(db)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn post(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::post(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
