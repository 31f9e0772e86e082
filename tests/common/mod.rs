//! Shared fixtures for the integration tests.
//!
//! [`FakeFactory`] stands in for the HTTP factory: it applies the same app/entity
//! capability rules, keeps entities in memory per kind, and records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use camino::Utf8PathBuf;
use serde_json::Value;
use starrdesk::error::{ReqError, StarrError, StarrResult};
use starrdesk::models::{AppConfig, AppKind, Entity, EntityKind};
use starrdesk::notify::Notifier;
use starrdesk::starrs::{ApiFactory, BusyFloor, EntityApi};
use starrdesk::storage::DirectoryStore;
use starrdesk::Starrs;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
pub struct FakeState {
    calls: Mutex<Vec<String>>,
    records: Mutex<HashMap<EntityKind, Vec<Value>>>,
    failure: Mutex<Option<ReqError>>,
    next_id: AtomicI64,
}

#[derive(Clone, Default)]
pub struct FakeFactory {
    pub state: Arc<FakeState>,
}

impl FakeFactory {
    pub fn new() -> Self {
        let factory = Self::default();
        factory.state.next_id.store(100, Ordering::SeqCst);
        factory
    }

    /// Store raw records for `kind`.
    pub fn seed(&self, kind: EntityKind, records: Vec<Value>) {
        self.state.records.lock().unwrap().insert(kind, records);
    }

    /// Make every following remote call fail with `err`.
    pub fn fail_with(&self, err: ReqError) {
        *self.state.failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn records(&self, kind: EntityKind) -> Vec<Value> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }
}

impl ApiFactory for FakeFactory {
    fn connect<T: Entity>(&self, config: &AppConfig) -> StarrResult<Box<dyn EntityApi<T>>> {
        let kind = config.kind()?;
        if !kind.supports(T::KIND) {
            return Err(StarrError::UnsupportedApp(config.app.clone()));
        }

        Ok(Box::new(FakeApi::<T> {
            state: self.state.clone(),
            app: kind,
            _entity: PhantomData,
        }))
    }
}

pub struct FakeApi<T> {
    state: Arc<FakeState>,
    app: AppKind,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> FakeApi<T> {
    fn record(&self, call: String) -> StarrResult<()> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push(format!("{} {}", self.app, call));

        match self.state.failure.lock().unwrap().clone() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn records(&self) -> Vec<Value> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(&T::KIND)
            .cloned()
            .unwrap_or_default()
    }

    fn not_found(id: i64) -> StarrError {
        ReqError::from_response(404, "Not Found", &format!(r#"{{"message":"NotFound {id}"}}"#))
            .into()
    }
}

#[async_trait]
impl<T: Entity> EntityApi<T> for FakeApi<T> {
    async fn list(&self) -> StarrResult<Vec<T>> {
        self.record(format!("list {}", T::KIND.resource()))?;
        self.records()
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(StarrError::from))
            .collect()
    }

    async fn get(&self, id: i64) -> StarrResult<T> {
        self.record(format!("get {} {}", T::KIND.resource(), id))?;
        let found = self
            .records()
            .into_iter()
            .find(|v| v["id"] == id)
            .ok_or_else(|| Self::not_found(id))?;
        Ok(serde_json::from_value(found)?)
    }

    async fn add(&self, entity: &T) -> StarrResult<T> {
        self.record(format!("add {} {}", T::KIND.resource(), entity.name()))?;
        let mut value = serde_json::to_value(entity)?;
        value["id"] = self.state.next_id.fetch_add(1, Ordering::SeqCst).into();

        let mut records = self.state.records.lock().unwrap();
        records.entry(T::KIND).or_default().push(value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update(&self, entity: &T, force: bool) -> StarrResult<T> {
        self.record(format!(
            "update {} {} force={}",
            T::KIND.resource(),
            entity.id(),
            force
        ))?;
        let value = serde_json::to_value(entity)?;

        let mut records = self.state.records.lock().unwrap();
        let slot = records
            .entry(T::KIND)
            .or_default()
            .iter_mut()
            .find(|v| v["id"] == entity.id())
            .ok_or_else(|| Self::not_found(entity.id()))?;
        *slot = value.clone();
        Ok(serde_json::from_value(value)?)
    }

    async fn delete(&self, id: i64) -> StarrResult<()> {
        self.record(format!("delete {} {}", T::KIND.resource(), id))?;

        let mut records = self.state.records.lock().unwrap();
        let list = records.entry(T::KIND).or_default();
        let before = list.len();
        list.retain(|v| v["id"] != id);
        if list.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn test(&self, entity: &T) -> StarrResult<()> {
        if !T::KIND.testable() {
            return Err(StarrError::UnsupportedOperation {
                app: self.app.to_string(),
                kind: T::KIND.label(),
                operation: "test",
            });
        }
        self.record(format!("test {} {}", T::KIND.resource(), entity.id()))
    }
}

/// Dispatcher over a [`FakeFactory`], storing payloads in a temp directory.
pub struct Harness {
    pub factory: FakeFactory,
    pub starrs: Starrs<FakeFactory>,
    pub notifier: Arc<Notifier>,
    pub dir: Utf8PathBuf,
    _temp_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_floor(Duration::ZERO)
    }

    pub fn with_floor(floor: Duration) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let factory = FakeFactory::new();
        let notifier = Arc::new(Notifier::default());
        let starrs = Starrs::new(notifier.clone(), Arc::new(DirectoryStore::new(dir.clone())))
            .with_factory(factory.clone())
            .with_busy_floor(BusyFloor::new(floor));

        Self {
            factory,
            starrs,
            notifier,
            dir,
            _temp_dir: temp_dir,
        }
    }
}

pub fn instance(app: AppKind, name: &str) -> AppConfig {
    AppConfig::new(app, name, "http://127.0.0.1:1").with_api_key("test-key")
}

pub fn unknown_instance(app: &str) -> AppConfig {
    AppConfig {
        app: app.to_string(),
        name: "Unknown".to_string(),
        url: "http://127.0.0.1:1".to_string(),
        ..Default::default()
    }
}

pub fn download_client(id: i64, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "enable": true,
        "protocol": "torrent",
        "priority": 1,
        "implementation": "QBittorrent",
        "implementationName": "qBittorrent",
        "configContract": "QBittorrentSettings",
        "fields": [
            {"name": "host", "value": "localhost"},
            {"name": "port", "value": 8080}
        ],
        "tags": [],
        "removeCompletedDownloads": true
    })
}

pub fn quality_profile(id: i64, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "upgradeAllowed": true,
        "cutoff": 4,
        "items": [{"quality": {"id": 4, "name": "HDTV-720p"}, "allowed": true}],
        "minFormatScore": 0
    })
}

pub fn metadata_profile(id: i64, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "primaryAlbumTypes": [{"albumType": {"id": 0, "name": "Album"}, "allowed": true}]
    })
}
