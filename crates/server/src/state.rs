use std::sync::Arc;

use darrlink_core::{
    AuditStore, Authenticator, Config, MovieReconciler, SanitizedConfig, SeriesReconciler,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    audit_store: Arc<dyn AuditStore>,
    movies: Option<Arc<MovieReconciler>>,
    series: Option<Arc<SeriesReconciler>>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        audit_store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            audit_store,
            movies: None,
            series: None,
        }
    }

    pub fn with_movies(mut self, engine: MovieReconciler) -> Self {
        self.movies = Some(Arc::new(engine));
        self
    }

    pub fn with_series(mut self, engine: SeriesReconciler) -> Self {
        self.series = Some(Arc::new(engine));
        self
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    /// Movie engine, absent when `[radarr]` is not configured
    pub fn movies(&self) -> Option<&Arc<MovieReconciler>> {
        self.movies.as_ref()
    }

    /// Series engine, absent when `[sonarr]` is not configured
    pub fn series(&self) -> Option<&Arc<SeriesReconciler>> {
        self.series.as_ref()
    }
}
