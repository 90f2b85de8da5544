//! The fixed browse rows shown on the home, movies, and new pages.

use std::fmt;
use std::str::FromStr;

/// A browse row backed by one list or discover endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    Trending,
    Originals,
    TopRated,
    Action,
    Comedy,
    Horror,
    Romance,
    Documentaries,
}

impl Row {
    pub const ALL: [Row; 8] = [
        Row::Trending,
        Row::Originals,
        Row::TopRated,
        Row::Action,
        Row::Comedy,
        Row::Horror,
        Row::Romance,
        Row::Documentaries,
    ];

    /// Rows on the movies page.
    pub const MOVIES: [Row; 3] = [Row::TopRated, Row::Action, Row::Comedy];

    /// Rows on the "new & popular" page.
    pub const NEW: [Row; 2] = [Row::Originals, Row::Trending];

    /// Heading shown above the row.
    pub fn title(self) -> &'static str {
        match self {
            Row::Trending => "Trending Now",
            Row::Originals => "Originals",
            Row::TopRated => "Top Rated",
            Row::Action => "Action Movies",
            Row::Comedy => "Comedies",
            Row::Horror => "Horror Movies",
            Row::Romance => "Romance Movies",
            Row::Documentaries => "Documentaries",
        }
    }

    /// Endpoint path, including any fixed filter.
    pub fn path(self) -> &'static str {
        match self {
            Row::Trending => "/trending/all/week",
            Row::Originals => "/discover/movie?with_networks=213",
            Row::TopRated => "/movie/top_rated",
            Row::Action => "/discover/movie?with_genres=28",
            Row::Comedy => "/discover/movie?with_genres=35",
            Row::Horror => "/discover/movie?with_genres=27",
            Row::Romance => "/discover/movie?with_genres=10749",
            Row::Documentaries => "/discover/movie?with_genres=99",
        }
    }

    /// Absolute endpoint URL under `base_url`.
    pub fn url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Short name used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Row::Trending => "trending",
            Row::Originals => "originals",
            Row::TopRated => "top-rated",
            Row::Action => "action",
            Row::Comedy => "comedy",
            Row::Horror => "horror",
            Row::Romance => "romance",
            Row::Documentaries => "documentaries",
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Row {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Row::ALL
            .into_iter()
            .find(|row| row.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Row::ALL.iter().map(|r| r.slug()).collect();
                format!("unknown row '{s}' (known: {})", known.join(", "))
            })
    }
}
