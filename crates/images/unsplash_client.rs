use std::time::Duration;

use anyhow::{Context, Result, bail};
use rand::seq::SliceRandom;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::error;

pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    full: String,
}

/// Stock photo lookup used to backfill session artwork.
pub struct UnsplashClient {
    http: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashClient {
    pub fn new(base_url: String, access_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            access_key: access_key.filter(|key| !key.is_empty()),
        })
    }

    /// Picks one search result at random and returns its full-size URL.
    pub async fn find_image_url(&self, query: &str) -> Result<String> {
        let access_key = self
            .access_key
            .as_deref()
            .context("unsplash access key is not configured")?;

        let resp = self
            .http
            .get(format!(
                "{}/search/photos",
                self.base_url.trim_end_matches('/')
            ))
            .header(AUTHORIZATION, format!("Client-ID {access_key}"))
            .query(&[("query", query)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, response_body = %body, "unsplash search failed");
            bail!("unsplash search failed with status {status}");
        }

        let parsed: SearchResponse = resp.json().await?;
        let photo = parsed
            .results
            .choose(&mut rand::thread_rng())
            .with_context(|| format!("no unsplash results for query {query:?}"))?;

        if photo.urls.full.is_empty() {
            bail!("unsplash result for query {query:?} has no image url");
        }
        Ok(photo.urls.full.clone())
    }
}
