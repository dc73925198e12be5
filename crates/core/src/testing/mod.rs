//! Testing utilities and mock implementations.
//!
//! The mocks implement the same role traits as the real Radarr/Sonarr
//! clients, so the engines can be exercised without a running service.
//!
//! # Example
//!
//! ```rust,ignore
//! use darrlink_core::testing::{fixtures, MockMovieService};
//!
//! let radarr = Arc::new(MockMovieService::new());
//! radarr.add_matches("Heat", vec![fixtures::tracked_movie("Heat", 1995, 3, true)]).await;
//! radarr.fail_queue().await;
//! ```

mod mock_movie_service;
mod mock_series_service;
mod mock_state;

pub use mock_movie_service::MockMovieService;
pub use mock_series_service::MockSeriesService;
pub use mock_state::RecordedRequest;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::arr::{MediaImage, MovieMatch, MoviePolicy, SeasonInfo, SeriesMatch, SeriesPolicy};

    /// Radarr policy rooted at `/data/movies`, forced search on.
    pub fn movie_policy() -> MoviePolicy {
        MoviePolicy {
            quality_profile_id: 1,
            root_folder: PathBuf::from("/data/movies"),
            force_search_on_existing: true,
        }
    }

    /// Sonarr policy rooted at `/data/tv`.
    pub fn series_policy() -> SeriesPolicy {
        SeriesPolicy {
            quality_profile_id: 1,
            language_profile_id: 1,
            root_folder: PathBuf::from("/data/tv"),
        }
    }

    /// A released movie Radarr does not track yet.
    pub fn movie_match(title: &str, year: u32) -> MovieMatch {
        MovieMatch {
            id: None,
            title: title.to_string(),
            original_title: Some(title.to_string()),
            year: Some(year),
            imdb_id: Some(format!("tt{:07}", year as usize * 100 + title.len())),
            tmdb_id: Some(year * 10 + title.len() as u32),
            title_slug: Some(title.to_lowercase().replace(' ', "-")),
            folder: Some(format!("{} ({})", title, year)),
            overview: Some(format!("A movie about {}.", title.to_lowercase())),
            status: Some("released".to_string()),
            runtime: Some(120),
            genres: vec!["Drama".to_string()],
            images: vec![MediaImage {
                cover_type: "poster".to_string(),
                url: None,
                remote_url: Some("https://image.example/poster.jpg".to_string()),
            }],
            is_available: true,
            has_file: false,
            movie_file_id: None,
        }
    }

    /// A released movie already tracked under `id`.
    pub fn tracked_movie(title: &str, year: u32, id: u32, has_file: bool) -> MovieMatch {
        MovieMatch {
            id: Some(id),
            has_file,
            movie_file_id: if has_file { Some(id + 1000) } else { Some(0) },
            ..movie_match(title, year)
        }
    }

    /// A series Sonarr does not track yet.
    pub fn series_match(title: &str, year: u32) -> SeriesMatch {
        SeriesMatch {
            id: None,
            title: title.to_string(),
            year: Some(year),
            imdb_id: Some(format!("tt{:07}", year as usize * 100 + title.len())),
            tvdb_id: Some(year * 30 + title.len() as u32),
            tmdb_id: None,
            title_slug: Some(title.to_lowercase().replace(' ', "-")),
            folder: Some(title.to_string()),
            overview: Some(format!("A TV series about {}.", title.to_lowercase())),
            status: Some("continuing".to_string()),
            network: Some("HBO".to_string()),
            runtime: Some(55),
            genres: vec!["Drama".to_string()],
            images: Vec::new(),
            seasons: (1..=2)
                .map(|n| SeasonInfo {
                    season_number: n,
                    monitored: true,
                })
                .collect(),
        }
    }

    pub fn tracked_series(title: &str, year: u32, id: u32) -> SeriesMatch {
        SeriesMatch {
            id: Some(id),
            ..series_match(title, year)
        }
    }
}
