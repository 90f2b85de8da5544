//! Catalog service: browse rows, trailer lookup, and search on top of the
//! de-duplicating request client.
//!
//! Several rows and detail views often ask for the same endpoint at the same
//! time; [`CatalogClient`] collapses those into one request, so this layer
//! simply issues what each view needs.

pub mod rows;
pub mod types;

use futures::future::join_all;
use tracing::{debug, warn};

use flixdeck_core::config::CatalogConfig;
use flixdeck_core::Result;
use flixdeck_fetch::{CatalogClient, RequestOptions};

pub use rows::Row;
pub use types::{Genre, MediaType, Title, TitleDetails, TmdbResponse, Video};

/// Read-only view of the catalog API.
#[derive(Clone)]
pub struct Catalog {
    client: CatalogClient,
    base_url: String,
    image_base_url: String,
    language: String,
}

impl Catalog {
    pub fn new(client: CatalogClient, config: &CatalogConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            image_base_url: config.image_base_url.clone(),
            language: config.language.clone(),
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    fn localized(&self) -> RequestOptions {
        RequestOptions::new().param("language", self.language.as_str())
    }

    /// Titles in a single browse row.
    pub async fn row(&self, row: Row) -> Result<Vec<Title>> {
        let resp: TmdbResponse<Title> = self
            .client
            .fetch_resource(&row.url(&self.base_url), self.localized())
            .await?;
        debug!(row = %row, count = resp.results.len(), "Fetched catalog row");
        Ok(resp.results)
    }

    /// Fetch `rows` concurrently. A row that fails is logged and comes back
    /// empty so one bad endpoint does not blank the whole page.
    pub async fn rows(&self, rows: &[Row]) -> Vec<(Row, Vec<Title>)> {
        join_all(rows.iter().map(|&row| async move {
            let titles = self.row(row).await.unwrap_or_else(|e| {
                warn!(row = %row, error = %e, "Failed to fetch catalog row");
                Vec::new()
            });
            (row, titles)
        }))
        .await
    }

    /// Detail record for a title (genres, overview) with its videos appended.
    pub async fn details(&self, media_type: MediaType, id: u64) -> Result<TitleDetails> {
        let path = format!("/{}/{id}", media_type.path_segment());
        self.client
            .fetch_resource(
                &path,
                self.localized().param("append_to_response", "videos"),
            )
            .await
    }

    /// The first trailer for a title, if it has one.
    pub async fn trailer(&self, media_type: MediaType, id: u64) -> Result<Option<Video>> {
        let details = self.details(media_type, id).await?;
        let trailer = details.trailer().cloned();
        if trailer.is_none() {
            debug!(id, media_type = media_type.path_segment(), "No trailer available");
        }
        Ok(trailer)
    }

    /// Multi-search across movies, shows, and people. Results always carry
    /// a media type. An empty query returns nothing without a request.
    pub async fn search(&self, query: &str) -> Result<Vec<Title>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let resp: TmdbResponse<Title> = self
            .client
            .fetch_resource("/search/multi", self.localized().param("query", query))
            .await?;
        Ok(resp.results.into_iter().map(Title::normalized).collect())
    }

    /// Artwork URL for an image path such as `/abc.jpg` at `size`
    /// (`w300`, `w500`, `original`, ...).
    pub fn image_url(&self, size: &str, path: &str) -> String {
        let base = self.image_base_url.trim_end_matches('/');
        let sep = if path.starts_with('/') { "" } else { "/" };
        format!("{base}/{size}{sep}{path}")
    }
}
