//! Request bodies for registering new titles, built from a lookup match
//! plus the locally configured placement policy.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::{MediaImage, MovieMatch, SeasonInfo, SeriesMatch};
use crate::config::{RadarrConfig, SonarrConfig};

/// Placement and acquisition defaults applied to every new movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoviePolicy {
    pub quality_profile_id: u32,
    pub root_folder: PathBuf,
    /// Fire a search for tracked movies that are released but have no file
    pub force_search_on_existing: bool,
}

impl From<&RadarrConfig> for MoviePolicy {
    fn from(config: &RadarrConfig) -> Self {
        Self {
            quality_profile_id: config.quality_profile_id,
            root_folder: config.root_folder.clone(),
            force_search_on_existing: config.force_search_on_existing,
        }
    }
}

/// Placement defaults applied to every new series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPolicy {
    pub quality_profile_id: u32,
    pub language_profile_id: u32,
    pub root_folder: PathBuf,
}

impl From<&SonarrConfig> for SeriesPolicy {
    fn from(config: &SonarrConfig) -> Self {
        Self {
            quality_profile_id: config.quality_profile_id,
            language_profile_id: config.language_profile_id,
            root_folder: config.root_folder.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieAddOptions {
    pub search_for_movie: bool,
    pub ignore_episodes_with_files: bool,
    pub ignore_episodes_without_files: bool,
}

/// Body of `POST /movie`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRegistration {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_slug: Option<String>,
    pub images: Vec<MediaImage>,
    pub quality_profile_id: u32,
    /// Pre-v3 name of the quality profile field; some builds still read it.
    pub profile_id: u32,
    pub path: String,
    pub monitored: bool,
    pub minimum_availability: String,
    pub add_options: MovieAddOptions,
}

impl MovieRegistration {
    pub fn from_match(candidate: &MovieMatch, policy: &MoviePolicy) -> Self {
        Self {
            title: candidate.title.clone(),
            original_title: candidate.original_title.clone(),
            year: candidate.year,
            imdb_id: candidate.imdb_id.clone(),
            tmdb_id: candidate.tmdb_id,
            title_slug: candidate.title_slug.clone(),
            images: candidate.images.clone(),
            quality_profile_id: policy.quality_profile_id,
            profile_id: policy.quality_profile_id,
            path: join_under_root(&policy.root_folder, candidate.folder_hint()),
            monitored: true,
            minimum_availability: "released".to_string(),
            add_options: MovieAddOptions {
                search_for_movie: true,
                ignore_episodes_with_files: false,
                ignore_episodes_without_files: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAddOptions {
    pub monitor: String,
    pub search_for_missing_episodes: bool,
    pub search_for_cutoff_unmet_episodes: bool,
}

/// Body of `POST /series`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRegistration {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_slug: Option<String>,
    pub images: Vec<MediaImage>,
    pub seasons: Vec<SeasonInfo>,
    pub quality_profile_id: u32,
    pub language_profile_id: u32,
    pub path: String,
    pub season_folder: bool,
    pub monitored: bool,
    pub add_options: SeriesAddOptions,
}

impl SeriesRegistration {
    pub fn from_match(candidate: &SeriesMatch, policy: &SeriesPolicy) -> Self {
        Self {
            title: candidate.title.clone(),
            year: candidate.year,
            tvdb_id: candidate.tvdb_id,
            imdb_id: candidate.imdb_id.clone(),
            tmdb_id: candidate.tmdb_id,
            title_slug: candidate.title_slug.clone(),
            images: candidate.images.clone(),
            seasons: candidate.seasons.clone(),
            quality_profile_id: policy.quality_profile_id,
            language_profile_id: policy.language_profile_id,
            path: join_under_root(&policy.root_folder, candidate.folder_hint()),
            season_folder: true,
            monitored: true,
            add_options: SeriesAddOptions {
                monitor: "missing".to_string(),
                search_for_missing_episodes: true,
                search_for_cutoff_unmet_episodes: false,
            },
        }
    }
}

/// Join `folder` onto `root` lexically, without touching the filesystem.
///
/// `.` segments are dropped and `..` never climbs above `root`. An absolute
/// folder is treated as relative to `root`.
pub fn join_under_root(root: &Path, folder: &str) -> String {
    let mut joined = normalize(root);
    let depth = joined.components().count();

    for component in Path::new(folder).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                if joined.components().count() > depth {
                    joined.pop();
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    joined.to_string_lossy().into_owned()
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
