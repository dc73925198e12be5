pub mod arr;
pub mod audit;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod reconcile;
pub mod testing;

pub use arr::{
    ArrError, ArrResponse, CatalogMatch, CatalogSummary, LookupSummary, MovieMatch, MoviePolicy,
    QueueStatus, RadarrClient, SeriesMatch, SeriesPolicy, SonarrClient, TitleQuery,
};
pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord,
    AuditStore, AuditWriter, JsonlAuditStore, SqliteAuditStore,
};
pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuditBackend, AuthMethod, Config,
    ConfigError, DispatchMode, LogFormat, SanitizedConfig,
};
pub use reconcile::{
    BulkDispatcher, MediaKind, MovieReconciler, Outcome, ReconciliationResult, Reconciler,
    SeriesReconciler,
};
