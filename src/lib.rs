// starrdesk - desktop backend for Starr applications
//
// This is the library crate: entity operations against Lidarr, Prowlarr, Radarr,
// Readarr, Sonarr and Whisparr, plus settings, logging and the desktop facade.
// The binary crate (main.rs) is a headless entry point.

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod starrs;
pub mod storage;

// Re-export commonly used types for convenience
pub use app::App;
pub use config::ConfigManager;
pub use error::{Failure, ReqError, StarrError, StarrResult};
pub use models::{
    AppConfig, AppKind, DataReply, DownloadClient, Entity, EntityKind, MetadataProfile,
    QualityProfile, Selection, Settings,
};
pub use notify::{Notification, Notifier};
pub use starrs::Starrs;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
