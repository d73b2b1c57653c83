//! Reporting queries over full table snapshots.
//!
//! Every query is a single pass of filter, sort, limit and project over the
//! rows handed to it. Sorting is stable, so equal keys keep the order in
//! which the rows were scanned, except for the aggregated queries which
//! break ties on their key.

use std::cmp::{Ordering, Reverse};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::views::{ActiveUser, GenreCount, SimilarUser, TopAnime, TopUser, WatchedAnime};
use crate::{Anime, Error, User, WatchEntry, parse};

pub const TOP_ANIME_LIMIT: usize = 10;
pub const POPULAR_GENRE_LIMIT: usize = 3;
pub const ACTIVE_USER_LIMIT: usize = 5;
pub const DEFAULT_WATCHED_COUNT: usize = 10;
pub const TOP_USER_MIN_MEAN_SCORE: f64 = 8.0;

/// Anime with the most episodes, highest first. Anime without an episode count are skipped.
///
/// # Errors
///
/// Fails when an episode count is present but is not an integer.
pub fn top_anime_by_episodes(anime: &[Anime]) -> Result<Vec<TopAnime>, Error> {
    let mut counted = anime
        .iter()
        .filter_map(|anime| anime.episodes.as_deref().map(|episodes| (anime, episodes)))
        .map(|(anime, episodes)| parse::int(Some(episodes), "episodes").map(|count| (count, anime)))
        .collect::<Result<Vec<_>, _>>()?;
    counted.sort_by_key(|&(episodes, _)| Reverse(episodes));

    Ok(counted
        .into_iter()
        .take(TOP_ANIME_LIMIT)
        .map(|(_, anime)| TopAnime {
            anime_id: anime.id.clone(),
            title: anime.title.clone(),
            score: anime.score.clone(),
            episodes: anime.episodes.clone(),
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopUsersQuery {
    pub page: i32,
    /// Page size.
    pub offset: i32,
    /// Users must have joined strictly after this year.
    pub year: i32,
    pub gender: String,
}

/// Maps the `F`/`M` shorthands onto the stored values, anything else is lower-cased.
#[must_use]
pub fn normalize_gender(gender: &str) -> String {
    if gender.eq_ignore_ascii_case("f") {
        "Female".to_owned()
    } else if gender.eq_ignore_ascii_case("m") {
        "Male".to_owned()
    } else {
        gender.to_lowercase()
    }
}

/// One page of highly rating users of a gender that joined after a given year,
/// ordered by mean score descending.
///
/// # Errors
///
/// Rejects a page below 1 or a page size below 1. Fails when a matching user
/// has a missing or non-numeric mean score or a join date that does not start
/// with a year.
pub fn top_users(users: &[User], query: &TopUsersQuery) -> Result<Vec<TopUser>, Error> {
    let page = usize::try_from(query.page)
        .ok()
        .filter(|&page| page >= 1)
        .ok_or(Error::InvalidPage(query.page))?;
    let page_size = usize::try_from(query.offset)
        .ok()
        .filter(|&size| size >= 1)
        .ok_or(Error::InvalidPageSize(query.offset))?;
    let gender = normalize_gender(&query.gender);

    let mut scored = Vec::new();
    for user in users {
        if user.gender.as_deref() != Some(gender.as_str()) {
            continue;
        }
        let mean_score = parse::decimal(user.stats_mean_score.as_deref(), "stats_mean_score")?;
        // NaN never passes
        if mean_score.partial_cmp(&TOP_USER_MIN_MEAN_SCORE) != Some(Ordering::Greater) {
            continue;
        }
        match parse::join_year(user.join_date.as_deref())? {
            Some(joined) if joined > query.year => scored.push((mean_score, user)),
            _ => {}
        }
    }
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    Ok(scored
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .map(|(_, user)| TopUser {
            username: user.username.clone(),
            mean_score: user.stats_mean_score.clone(),
        })
        .collect())
}

/// Anime watched by `username` (exact match), lowest personal score first.
///
/// # Errors
///
/// Fails when one of the user's scores is missing or not an integer.
pub fn watched_anime(
    entries: &[WatchEntry],
    username: &str,
    count: usize,
) -> Result<Vec<WatchedAnime>, Error> {
    let mut scored = entries
        .iter()
        .filter(|entry| entry.username == username)
        .map(|entry| parse::int(entry.my_score.as_deref(), "my_score").map(|score| (score, entry)))
        .collect::<Result<Vec<_>, _>>()?;
    scored.sort_by_key(|&(score, _)| score);

    Ok(scored
        .into_iter()
        .take(count)
        .map(|(_, entry)| WatchedAnime {
            anime_id: entry.anime.id.clone(),
            title: entry.anime.title.clone(),
            my_score: entry.my_score.clone(),
            episodes: entry.anime.episodes.clone(),
        })
        .collect())
}

/// The most watched genres. Each watch entry counts once for every genre of its anime.
#[must_use]
pub fn popular_genres(entries: &[WatchEntry]) -> Vec<GenreCount> {
    let mut counts: FxHashMap<&str, u64> = FxHashMap::default();
    entries
        .iter()
        .filter_map(|entry| entry.anime.genre.as_deref())
        .flat_map(|genres| genres.split(','))
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .for_each(|genre| *counts.entry(genre).or_default() += 1);

    ranked(counts)
        .into_iter()
        .take(POPULAR_GENRE_LIMIT)
        .map(|(genre, count)| GenreCount {
            genre: genre.to_owned(),
            count,
        })
        .collect()
}

/// Users that joined in `year` with the most days spent watching.
///
/// # Errors
///
/// Fails when a join date does not start with a year, or when a user joining
/// in `year` has a missing or non-numeric days-spent value.
pub fn active_users(users: &[User], year: i32) -> Result<Vec<ActiveUser>, Error> {
    let mut active = Vec::new();
    for user in users {
        if parse::join_year(user.join_date.as_deref())? != Some(year) {
            continue;
        }
        let days = parse::decimal(
            user.user_days_spent_watching.as_deref(),
            "user_days_spent_watching",
        )?;
        active.push((days, user));
    }
    active.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    Ok(active
        .into_iter()
        .take(ACTIVE_USER_LIMIT)
        .map(|(_, user)| ActiveUser {
            username: user.username.clone(),
            days_spent: user.user_days_spent_watching.clone(),
        })
        .collect())
}

/// Every other user sharing at least one watched anime with `username`,
/// most shared first. The result is not truncated.
///
/// The target's anime are matched on the exact username, while the target
/// is left out of the result regardless of case.
#[must_use]
pub fn similar_users(entries: &[WatchEntry], username: &str) -> Vec<SimilarUser> {
    let watched: FxHashSet<&str> = entries
        .iter()
        .filter(|entry| entry.username == username)
        .map(|entry| entry.anime.id.as_str())
        .collect();

    let mut shared: FxHashMap<&str, u64> = FxHashMap::default();
    entries
        .iter()
        .filter(|entry| !eq_ignore_case(&entry.username, username))
        .filter(|entry| watched.contains(entry.anime.id.as_str()))
        .for_each(|entry| *shared.entry(entry.username.as_str()).or_default() += 1);

    ranked(shared)
        .into_iter()
        .map(|(username, shared_count)| SimilarUser {
            username: username.to_owned(),
            shared_count,
        })
        .collect()
}

/// Counts highest first, equal counts ordered by key.
fn ranked(counts: FxHashMap<&str, u64>) -> Vec<(&str, u64)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_unstable_by(|(a_key, a), (b_key, b)| b.cmp(a).then_with(|| a_key.cmp(b_key)));
    ranked
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
