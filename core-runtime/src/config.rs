//! # Core Configuration Module
//!
//! A `CoreConfig` holds everything the catalog core needs at construction:
//! where the database lives, the external catalog API settings and the host
//! bridges (HTTP client, clock, session). There is no process-wide state; the
//! Discogs base URL and token travel inside [`CatalogApiConfig`] to whoever
//! builds the clients.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CatalogApiConfig, CoreConfig};
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/dubion/catalog.db")
//!     .catalog_api(CatalogApiConfig::from_env())
//!     .build()?;
//! ```
//!
//! The builder fails fast with an actionable message when a value is missing
//! or out of range.

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, SessionContext, StaticSession, SystemClock};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default Discogs API root
pub const DISCOGS_API_BASE: &str = "https://api.discogs.com";

/// Default Napster API root
pub const NAPSTER_API_BASE: &str = "https://api.napster.com/v2.2";

/// Results requested per Discogs search call. Only the first page is fetched.
pub const DISCOGS_SEARCH_PAGE_SIZE: u32 = 2000;

/// Default timeout applied to every catalog API request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Where the SQLite catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

/// Pool sizing knobs passed through to the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseTuning {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseTuning {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Discogs API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscogsConfig {
    pub base_url: String,
    /// Personal access token sent as the `token` query parameter
    pub token: Option<String>,
    pub search_page_size: u32,
}

impl Default for DiscogsConfig {
    fn default() -> Self {
        Self {
            base_url: DISCOGS_API_BASE.to_string(),
            token: None,
            search_page_size: DISCOGS_SEARCH_PAGE_SIZE,
        }
    }
}

impl fmt::Debug for DiscogsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscogsConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("search_page_size", &self.search_page_size)
            .finish()
    }
}

/// Napster API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct NapsterConfig {
    pub base_url: String,
    /// API key sent as the `apikey` query parameter
    pub api_key: Option<String>,
}

impl Default for NapsterConfig {
    fn default() -> Self {
        Self {
            base_url: NAPSTER_API_BASE.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for NapsterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NapsterConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Configuration for the external music catalog APIs.
///
/// Credentials are never compiled in. Load them from the environment
/// ([`CatalogApiConfig::from_env`]) or from the host's secure configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogApiConfig {
    pub discogs: DiscogsConfig,
    pub napster: NapsterConfig,
    pub request_timeout: Duration,
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self {
            discogs: DiscogsConfig::default(),
            napster: NapsterConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CatalogApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `DISCOGS_TOKEN`, `DISCOGS_BASE_URL`,
    /// `NAPSTER_API_KEY` and `NAPSTER_BASE_URL`. Unset variables keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = non_empty("DISCOGS_BASE_URL") {
            config.discogs.base_url = url;
        }
        config.discogs.token = non_empty("DISCOGS_TOKEN");

        if let Some(url) = non_empty("NAPSTER_BASE_URL") {
            config.napster.base_url = url;
        }
        config.napster.api_key = non_empty("NAPSTER_API_KEY");

        config
    }

    pub fn with_discogs_token(mut self, token: impl Into<String>) -> Self {
        self.discogs.token = Some(token.into());
        self
    }

    pub fn with_discogs_base_url(mut self, url: impl Into<String>) -> Self {
        self.discogs.base_url = url.into();
        self
    }

    pub fn with_napster_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.napster.api_key = Some(api_key.into());
        self
    }

    pub fn with_napster_base_url(mut self, url: impl Into<String>) -> Self {
        self.napster.base_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("Discogs", &self.discogs.base_url)?;
        validate_base_url("Napster", &self.napster.base_url)?;

        if self.discogs.search_page_size == 0 {
            return Err(Error::Config(
                "Discogs search page size must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        Ok(())
    }

    pub fn has_discogs_token(&self) -> bool {
        self.discogs.token.is_some()
    }

    pub fn has_napster_key(&self) -> bool {
        self.napster.api_key.is_some()
    }
}

fn validate_base_url(provider: &str, url: &str) -> Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(Error::Config(format!(
            "{} base URL must start with http:// or https://, got '{}'",
            provider, url
        )));
    }
    Ok(())
}

/// Core configuration for the catalog.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub database: DatabaseLocation,
    pub database_tuning: DatabaseTuning,

    /// HTTP client for the catalog APIs. `None` lets the façade fall back to
    /// the desktop reqwest client.
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Time source for entity timestamps
    pub clock: Arc<dyn Clock>,

    /// Identity of the calling user
    pub session: Arc<dyn SessionContext>,

    pub catalog_api: CatalogApiConfig,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database", &self.database)
            .field("database_tuning", &self.database_tuning)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("catalog_api", &self.catalog_api)
            .finish_non_exhaustive()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let DatabaseLocation::File(path) = &self.database {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Database path cannot be empty".to_string()));
            }
        }

        if self.database_tuning.max_connections == 0 {
            return Err(Error::Config(
                "Database max_connections must be at least 1".to_string(),
            ));
        }

        self.catalog_api.validate()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    database: Option<DatabaseLocation>,
    database_tuning: Option<DatabaseTuning>,
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
    session: Option<Arc<dyn SessionContext>>,
    catalog_api: Option<CatalogApiConfig>,
}

impl CoreConfigBuilder {
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(DatabaseLocation::File(path.into()));
        self
    }

    /// Keep the catalog in memory (tests, throwaway sessions)
    pub fn in_memory_database(mut self) -> Self {
        self.database = Some(DatabaseLocation::InMemory);
        self
    }

    pub fn database_tuning(mut self, tuning: DatabaseTuning) -> Self {
        self.database_tuning = Some(tuning);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn catalog_api(mut self, config: CatalogApiConfig) -> Self {
        self.catalog_api = Some(config);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - No database location was given
    /// - A value is out of range (see [`CoreConfig::validate`])
    pub fn build(self) -> Result<CoreConfig> {
        let database = self.database.ok_or_else(|| {
            Error::Config(
                "Database location is required. Use .database_path() or .in_memory_database()."
                    .to_string(),
            )
        })?;

        let config = CoreConfig {
            database,
            database_tuning: self.database_tuning.unwrap_or_default(),
            http_client: self.http_client,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            session: self
                .session
                .unwrap_or_else(|| Arc::new(StaticSession::anonymous())),
            catalog_api: self.catalog_api.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
