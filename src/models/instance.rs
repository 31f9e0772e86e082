use crate::error::{StarrError, StarrResult};
use crate::models::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The Starr applications this backend can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Lidarr,
    Prowlarr,
    Radarr,
    Readarr,
    Sonarr,
    Whisparr,
}

impl AppKind {
    pub const ALL: [AppKind; 6] = [
        AppKind::Lidarr,
        AppKind::Prowlarr,
        AppKind::Radarr,
        AppKind::Readarr,
        AppKind::Sonarr,
        AppKind::Whisparr,
    ];

    /// Lowercase identifier, as persisted in settings.
    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Lidarr => "lidarr",
            AppKind::Prowlarr => "prowlarr",
            AppKind::Radarr => "radarr",
            AppKind::Readarr => "readarr",
            AppKind::Sonarr => "sonarr",
            AppKind::Whisparr => "whisparr",
        }
    }

    /// Capitalized product name.
    pub fn title(self) -> &'static str {
        match self {
            AppKind::Lidarr => "Lidarr",
            AppKind::Prowlarr => "Prowlarr",
            AppKind::Radarr => "Radarr",
            AppKind::Readarr => "Readarr",
            AppKind::Sonarr => "Sonarr",
            AppKind::Whisparr => "Whisparr",
        }
    }

    /// REST API version segment. Whisparr speaks the Sonarr v3 API.
    pub fn api_version(self) -> &'static str {
        match self {
            AppKind::Lidarr | AppKind::Prowlarr | AppKind::Readarr => "v1",
            AppKind::Radarr | AppKind::Sonarr | AppKind::Whisparr => "v3",
        }
    }

    /// Whether the application manages entities of the given kind.
    pub fn supports(self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::DownloadClient => true,
            EntityKind::QualityProfile => self != AppKind::Prowlarr,
            EntityKind::MetadataProfile => matches!(self, AppKind::Lidarr | AppKind::Readarr),
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = StarrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StarrError::MissingApp);
        }

        AppKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| StarrError::UnsupportedApp(trimmed.to_string()))
    }
}

/// One configured Starr application instance.
///
/// `app` stays a plain string so that settings written by other versions (or by hand)
/// still load; it is parsed into an [`AppKind`] at dispatch time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: String,
    pub name: String,
    pub url: String,
    pub api_key: String,
    /// HTTP basic auth user; basic auth is only sent when this is non-empty
    pub username: String,
    pub password: String,
    /// Request timeout in seconds, 0 keeps the transport default
    pub timeout_secs: u64,
    /// Reject invalid TLS certificates
    pub valid_ssl: bool,
}

impl AppConfig {
    pub fn new(app: AppKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            app: app.as_str().to_string(),
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn kind(&self) -> StarrResult<AppKind> {
        self.app.parse()
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_kind_case_insensitive() {
        assert_eq!("Sonarr".parse::<AppKind>().unwrap(), AppKind::Sonarr);
        assert_eq!(" radarr ".parse::<AppKind>().unwrap(), AppKind::Radarr);
    }

    #[test]
    fn test_parse_unknown_app_names_it() {
        let err = "foo".parse::<AppKind>().unwrap_err();
        assert!(matches!(err, StarrError::UnsupportedApp(ref app) if app == "foo"));
        assert_eq!(err.to_string(), "unsupported application: foo");
    }

    #[test]
    fn test_parse_empty_app_is_missing() {
        assert!(matches!("".parse::<AppKind>(), Err(StarrError::MissingApp)));
    }

    #[test]
    fn test_capability_table() {
        for kind in AppKind::ALL {
            assert!(kind.supports(EntityKind::DownloadClient));
        }
        assert!(!AppKind::Prowlarr.supports(EntityKind::QualityProfile));
        assert!(AppKind::Whisparr.supports(EntityKind::QualityProfile));
        assert!(AppKind::Lidarr.supports(EntityKind::MetadataProfile));
        assert!(AppKind::Readarr.supports(EntityKind::MetadataProfile));
        assert!(!AppKind::Sonarr.supports(EntityKind::MetadataProfile));
    }

    #[test]
    fn test_api_versions() {
        assert_eq!(AppKind::Lidarr.api_version(), "v1");
        assert_eq!(AppKind::Prowlarr.api_version(), "v1");
        assert_eq!(AppKind::Whisparr.api_version(), "v3");
    }

    #[test]
    fn test_timeout_zero_is_default() {
        let mut config = AppConfig::new(AppKind::Sonarr, "Sonarr", "http://localhost:8989");
        assert_eq!(config.timeout(), None);
        config.timeout_secs = 15;
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }
}
