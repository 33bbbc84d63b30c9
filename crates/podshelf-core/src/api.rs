//! Read-only client for the podcast catalog API.
//!
//! Endpoints: `GET /` (catalog), `GET /id/{id}` (show with seasons) and
//! `GET /genre/{id}` (genre record).

use std::collections::HashSet;
use std::time::Duration;

use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{PodError, Result};
use crate::genres::is_hidden;
use crate::model::{Genre, GenreRef, Show};

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("podshelf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PodError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| PodError::Decode { url, source })
    }

    /// Every show, with `seasons` as a count.
    pub async fn fetch_catalog(&self) -> Result<Vec<Show>> {
        let shows: Vec<Show> = self.get_json("/").await?;
        debug!("catalog: {} shows", shows.len());
        Ok(shows)
    }

    /// One show with its seasons; missing episode ids are filled in.
    pub async fn fetch_show(&self, id: &str) -> Result<Show> {
        let mut show: Show = self.get_json(&format!("/id/{}", id)).await?;
        show.normalize();
        Ok(show)
    }

    pub async fn fetch_genre(&self, id: u32) -> Result<Genre> {
        self.get_json(&format!("/genre/{}", id)).await
    }

    /// Titles for `ids`, one request per distinct id, in first-seen order.
    /// Any failure fails the whole batch.
    pub async fn fetch_genre_titles(&self, ids: &[u32]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let unique: Vec<u32> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let genres = try_join_all(unique.iter().map(|&id| self.fetch_genre(id))).await?;
        Ok(genres.into_iter().map(|g| g.title).collect())
    }

    /// Display titles for a show's genres.
    ///
    /// Title references are used as-is after trimming. Numeric ids are
    /// fetched from the API. Empty and hidden values (`all`, `featured`) are
    /// dropped from both.
    pub async fn resolve_genre_titles(&self, show: &Show) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        let mut ids = Vec::new();
        for genre in &show.genres {
            match genre {
                GenreRef::Name(name) => titles.push(name.trim().to_string()),
                GenreRef::Id(id) => ids.push(*id),
            }
        }

        if !ids.is_empty() {
            match self.fetch_genre_titles(&ids).await {
                Ok(fetched) => titles.extend(fetched),
                Err(e) => {
                    warn!("failed to load genre titles for show {}: {}", show.id, e);
                    return Err(e);
                }
            }
        }

        titles.retain(|t| !t.trim().is_empty() && !is_hidden(t));
        Ok(titles)
    }
}
