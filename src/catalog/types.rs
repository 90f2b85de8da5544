//! Catalog API response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Paged list envelope returned by list, discover, and search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbResponse<T> {
    pub page: Option<u32>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    pub total_pages: Option<u32>,
    pub total_results: Option<u32>,
    /// Any other top-level fields the endpoint returned.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Person,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Path segment used by detail endpoints. Anything that is not a show
    /// is looked up as a movie.
    pub fn path_segment(self) -> &'static str {
        match self {
            MediaType::Tv => "tv",
            _ => "movie",
        }
    }
}

/// Summary of a movie or show as it appears in rows and search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub media_type: Option<MediaType>,
}

impl Title {
    /// The name to show: movie title, show name, then the originals.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .or(self.original_title.as_deref())
            .or(self.original_name.as_deref())
            .unwrap_or_default()
    }

    /// Four-digit year of the release or first air date.
    pub fn year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// The media type as reported, or inferred: anything with a first air
    /// date or a show-style `name` is a show.
    pub fn resolved_media_type(&self) -> MediaType {
        match self.media_type {
            Some(media_type) => media_type,
            None if self.first_air_date.is_some() || self.name.is_some() => MediaType::Tv,
            None => MediaType::Movie,
        }
    }

    /// Fill in `media_type` when the endpoint left it out.
    pub fn normalized(mut self) -> Self {
        self.media_type = Some(self.resolved_media_type());
        self
    }
}

/// A video attached to a title (trailer, teaser, clip, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub name: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub official: Option<bool>,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.kind.as_deref() == Some("Trailer")
    }

    /// Watch URL for YouTube-hosted videos.
    pub fn youtube_url(&self) -> Option<String> {
        (self.site.as_deref() == Some("YouTube"))
            .then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Detail record fetched with `append_to_response=videos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleDetails {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub videos: Option<TmdbResponse<Video>>,
}

impl TitleDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    /// Genre names joined for display, e.g. `Drama, Crime`.
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First video whose type is `Trailer`.
    pub fn trailer(&self) -> Option<&Video> {
        self.videos.as_ref()?.results.iter().find(|v| v.is_trailer())
    }
}
