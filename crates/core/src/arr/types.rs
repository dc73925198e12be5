use serde::{Deserialize, Deserializer, Serialize};

/// One requested title: the unit of work for a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleQuery {
    #[serde(alias = "title", alias = "seriesName")]
    pub name: String,
    #[serde(
        default,
        alias = "seriesYear",
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
}

impl TitleQuery {
    pub fn new(name: impl Into<String>, year: Option<&str>) -> Self {
        Self {
            name: name.into(),
            year: year.map(String::from),
        }
    }

    /// The year, if one was given and is not blank.
    pub fn year(&self) -> Option<&str> {
        self.year.as_deref().map(str::trim).filter(|y| !y.is_empty())
    }

    /// Search term sent to the lookup endpoint: `"Name (Year)"` or `"Name"`.
    pub fn search_term(&self) -> String {
        match self.year() {
            Some(year) => format!("{} ({})", self.name.trim(), year),
            None => self.name.trim().to_string(),
        }
    }
}

/// Years arrive as strings from tool callers and as numbers from some clients.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Text(String),
        Number(u64),
    }

    Ok(Option::<RawYear>::deserialize(deserializer)?.map(|raw| match raw {
        RawYear::Text(s) => s,
        RawYear::Number(n) => n.to_string(),
    }))
}

/// Fields shared by movie and series lookup results.
pub trait CatalogMatch {
    /// Target-service id. Present only when the title is already tracked.
    fn existing_id(&self) -> Option<u32>;
    fn title(&self) -> &str;
    fn year(&self) -> Option<u32>;
    fn imdb_id(&self) -> Option<&str>;
    fn tmdb_id(&self) -> Option<u32>;
}

/// Poster/fanart reference carried through to registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaImage {
    pub cover_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

/// A movie candidate returned by Radarr's lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieMatch {
    #[serde(default)]
    pub id: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<u32>,
    #[serde(default)]
    pub title_slug: Option<String>,
    /// Folder name Radarr suggests for the movie
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<MediaImage>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub movie_file_id: Option<u32>,
}

impl MovieMatch {
    /// A file is present if Radarr flags it or links a movie file.
    pub fn file_present(&self) -> bool {
        self.has_file || self.movie_file_id.unwrap_or(0) != 0
    }

    /// Folder hint, falling back to the title when Radarr sends none.
    pub fn folder_hint(&self) -> &str {
        self.folder
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

impl CatalogMatch for MovieMatch {
    fn existing_id(&self) -> Option<u32> {
        self.id.filter(|id| *id != 0)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn year(&self) -> Option<u32> {
        self.year.filter(|y| *y != 0)
    }

    fn imdb_id(&self) -> Option<&str> {
        self.imdb_id.as_deref()
    }

    fn tmdb_id(&self) -> Option<u32> {
        self.tmdb_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub season_number: u32,
    #[serde(default)]
    pub monitored: bool,
}

/// A series candidate returned by Sonarr's lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMatch {
    #[serde(default)]
    pub id: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tvdb_id: Option<u32>,
    #[serde(default)]
    pub tmdb_id: Option<u32>,
    #[serde(default)]
    pub title_slug: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<MediaImage>,
    #[serde(default)]
    pub seasons: Vec<SeasonInfo>,
}

impl SeriesMatch {
    pub fn folder_hint(&self) -> &str {
        self.folder
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

impl CatalogMatch for SeriesMatch {
    fn existing_id(&self) -> Option<u32> {
        self.id.filter(|id| *id != 0)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn year(&self) -> Option<u32> {
        self.year.filter(|y| *y != 0)
    }

    fn imdb_id(&self) -> Option<&str> {
        self.imdb_id.as_deref()
    }

    fn tmdb_id(&self) -> Option<u32> {
        self.tmdb_id
    }
}

/// One entry of Radarr's queue details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Download/import state of a tracked title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Downloading,
    Importing,
    #[serde(rename = "none")]
    NotQueued,
}

impl QueueStatus {
    /// Derive the status from the first queue record.
    pub fn from_records(records: &[QueueRecord]) -> Self {
        let status = records
            .first()
            .and_then(|r| r.status.as_deref())
            .map(str::to_lowercase);

        match status.as_deref() {
            Some("downloading") => Self::Downloading,
            Some("importing") => Self::Importing,
            _ => Self::NotQueued,
        }
    }
}

/// Raw reply from a mutating call: any status is a valid reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ArrResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// 201 is the only status the target services use for accepted writes.
    pub fn is_created(&self) -> bool {
        self.status == 201
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Version info from `system/status`, used as a startup connectivity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub version: String,
}
