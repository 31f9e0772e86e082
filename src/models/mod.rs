//! Data models for the starrdesk backend.
//!
//! - [`AppConfig`] / [`AppKind`]: one configured Starr instance and the closed set of
//!   application kinds
//! - [`Entity`] and its implementors [`DownloadClient`], [`QualityProfile`],
//!   [`MetadataProfile`]: transient remote records, built per request
//! - [`Selection`] / [`DataReply`]: the export selection set and the success envelope
//! - [`Settings`] / [`LogConfig`]: the persisted settings document loaded by
//!   [`ConfigManager`](crate::config::ConfigManager)

pub mod config;
pub mod entities;
pub mod instance;
pub mod reply;

pub use config::{LogConfig, Settings};
pub use entities::{
    DownloadClient, Entity, EntityKind, MetadataProfile, ProviderField, QualityProfile,
};
pub use instance::{AppConfig, AppKind};
pub use reply::{DataReply, Selection};
