use serde::{Deserialize, Serialize};

use super::{CatalogMatch, MovieMatch, SeriesMatch};

/// Trimmed-down view of a lookup match for API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub genres: Vec<String>,
    /// Whether the target service already tracks the title
    pub in_library: bool,
}

impl From<&MovieMatch> for CatalogSummary {
    fn from(m: &MovieMatch) -> Self {
        Self {
            title: m.title.clone(),
            year: CatalogMatch::year(m),
            overview: non_blank(&m.overview),
            imdb_id: non_blank(&m.imdb_id),
            tmdb_id: m.tmdb_id,
            tvdb_id: None,
            status: non_blank(&m.status),
            runtime: m.runtime.filter(|r| *r != 0),
            genres: m.genres.clone(),
            in_library: m.existing_id().is_some(),
        }
    }
}

impl From<&SeriesMatch> for CatalogSummary {
    fn from(m: &SeriesMatch) -> Self {
        Self {
            title: m.title.clone(),
            year: CatalogMatch::year(m),
            overview: non_blank(&m.overview),
            imdb_id: non_blank(&m.imdb_id),
            tmdb_id: m.tmdb_id,
            tvdb_id: m.tvdb_id,
            status: non_blank(&m.status),
            runtime: m.runtime.filter(|r| *r != 0),
            genres: m.genres.clone(),
            in_library: m.existing_id().is_some(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Combined lookup across both services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupSummary {
    pub shows: Vec<CatalogSummary>,
    pub movies: Vec<CatalogSummary>,
}

impl LookupSummary {
    pub fn new(shows: &[SeriesMatch], movies: &[MovieMatch]) -> Self {
        Self {
            shows: shows.iter().map(CatalogSummary::from).collect(),
            movies: movies.iter().map(CatalogSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_drops_blank_fields_and_flags_library() {
        let movie = MovieMatch {
            id: Some(3),
            title: "Heat".to_string(),
            year: Some(1995),
            overview: Some("  ".to_string()),
            runtime: Some(0),
            ..Default::default()
        };

        let json = serde_json::to_value(CatalogSummary::from(&movie)).unwrap();
        assert_eq!(json["title"], "Heat");
        assert_eq!(json["inLibrary"], true);
        assert!(json.get("overview").is_none());
        assert!(json.get("runtime").is_none());
        assert!(json.get("genres").is_none());
    }

    #[test]
    fn test_lookup_summary_splits_domains() {
        let shows = vec![SeriesMatch {
            title: "The Wire".to_string(),
            tvdb_id: Some(79126),
            ..Default::default()
        }];
        let summary = LookupSummary::new(&shows, &[]);
        assert_eq!(summary.shows.len(), 1);
        assert_eq!(summary.shows[0].tvdb_id, Some(79126));
        assert!(!summary.shows[0].in_library);
        assert!(summary.movies.is_empty());
    }
}
