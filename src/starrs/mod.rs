//! Entity operations against configured Starr instances.
//!
//! [`Starrs`] is the caller-facing surface. Each operation connects through the
//! [`ApiFactory`], runs the remote call (mutations held to the [`BusyFloor`]), and turns
//! the outcome into a translated message. Successful mutations are announced on the
//! [`Notifier`]; every failure is announced there as well and returned as a
//! [`Failure`].

pub mod api;
pub mod busy;
pub mod exchange;
pub mod transport;

pub use api::{ApiFactory, EntityApi, HttpFactory, RestEndpoint};
pub use busy::{BusyFloor, DEFAULT_BUSY_FLOOR};
pub use transport::Transport;

use crate::error::{Failure, StarrError, StarrResult};
use crate::i18n::{SharedTranslator, Translator};
use crate::metrics::Metrics;
use crate::models::{
    AppConfig, AppKind, DataReply, DownloadClient, Entity, MetadataProfile, QualityProfile,
    Selection,
};
use crate::notify::Notifier;
use crate::storage::PayloadStore;
use camino::Utf8PathBuf;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

type Args<'a> = [(&'a str, &'a dyn Display)];

pub struct Starrs<F: ApiFactory = HttpFactory> {
    factory: F,
    translator: SharedTranslator,
    notifier: Arc<Notifier>,
    store: Arc<dyn PayloadStore>,
    busy: BusyFloor,
    metrics: Arc<Metrics>,
}

impl Starrs<HttpFactory> {
    pub fn new(notifier: Arc<Notifier>, store: Arc<dyn PayloadStore>) -> Self {
        let metrics = notifier.metrics().clone();
        Self {
            factory: HttpFactory,
            translator: SharedTranslator::default(),
            notifier,
            store,
            busy: BusyFloor::default(),
            metrics,
        }
    }
}

impl<F: ApiFactory> Starrs<F> {
    /// Swap the factory, keeping everything else.
    pub fn with_factory<G: ApiFactory>(self, factory: G) -> Starrs<G> {
        Starrs {
            factory,
            translator: self.translator,
            notifier: self.notifier,
            store: self.store,
            busy: self.busy,
            metrics: self.metrics,
        }
    }

    /// Format messages through `translator`, following any language change made on it.
    pub fn with_translator(mut self, translator: SharedTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_busy_floor(mut self, busy: BusyFloor) -> Self {
        self.busy = busy;
        self
    }

    pub fn set_translator(&self, translator: Translator) {
        self.translator.set(translator);
    }

    pub fn translator(&self) -> Arc<Translator> {
        self.translator.get()
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn busy_floor(&self) -> &BusyFloor {
        &self.busy
    }

    // ---------------------------------------------------------------------------------
    // Generic operations
    // ---------------------------------------------------------------------------------

    pub async fn list<T: Entity>(&self, config: &AppConfig) -> Result<Vec<T>, Failure> {
        tracing::trace!("Call:List({}, {})", config.name, T::KIND.plural());

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            self.remote(api.list()).await
        }
        .await;

        result.map_err(|err| {
            self.fail(
                "Getting {app} {kinds}: {error}",
                &[("app", &config.name), ("kinds", &T::KIND.plural())],
                err,
            )
        })
    }

    pub async fn get<T: Entity>(&self, config: &AppConfig, id: i64) -> Result<T, Failure> {
        tracing::trace!("Call:Get({}, {} {})", config.name, T::KIND, id);

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            self.remote(api.get(id)).await
        }
        .await;

        result.map_err(|err| {
            self.fail(
                "Getting {app} {kind} {id}: {error}",
                &[("app", &config.name), ("kind", &T::KIND.label()), ("id", &id)],
                err,
            )
        })
    }

    pub async fn add<T: Entity>(
        &self,
        config: &AppConfig,
        entity: &T,
    ) -> Result<DataReply<T>, Failure> {
        tracing::trace!("Call:Add({}, {} {})", config.name, T::KIND, entity.name());

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            self.busy.hold(self.remote(api.add(entity))).await
        }
        .await;

        match result {
            Ok(added) => {
                let msg = self.announce(
                    "Imported {title} '{summary}' into {app}",
                    &[
                        ("title", &T::KIND.title()),
                        ("summary", &entity.summary()),
                        ("app", &config.name),
                    ],
                );
                Ok(DataReply::new(msg, added))
            }
            Err(err) => Err(self.fail(
                "Adding {app} {kind}: {name}: {error}",
                &[
                    ("app", &config.name),
                    ("kind", &T::KIND.label()),
                    ("name", &entity.name()),
                ],
                err,
            )),
        }
    }

    pub async fn update<T: Entity>(
        &self,
        config: &AppConfig,
        entity: &T,
        force: bool,
    ) -> Result<DataReply<T>, Failure> {
        tracing::trace!(
            "Call:Update({}, {} {}, force={})",
            config.name,
            T::KIND,
            entity.id(),
            force
        );

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            self.busy.hold(self.remote(api.update(entity, force))).await
        }
        .await;

        let args: &Args = &[
            ("app", &config.name),
            ("kind", &T::KIND.label()),
            ("name", &entity.name()),
            ("id", &entity.id()),
        ];
        match result {
            Ok(updated) => {
                let msg = self.announce("Updated {app} {kind} {name} ({id}).", args);
                Ok(DataReply::new(msg, updated))
            }
            Err(err) => Err(self.fail("Updating {app} {kind}: {name} ({id}): {error}", args, err)),
        }
    }

    pub async fn delete<T: Entity>(&self, config: &AppConfig, id: i64) -> Result<String, Failure> {
        tracing::trace!("Call:Delete({}, {} {})", config.name, T::KIND, id);

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            self.busy.hold(self.remote(api.delete(id))).await
        }
        .await;

        let args: &Args = &[("app", &config.name), ("kind", &T::KIND.label()), ("id", &id)];
        match result {
            Ok(()) => Ok(self.announce("Deleted {app} {kind} with ID {id}.", args)),
            Err(err) => Err(self.fail("Deleting {app} {kind}: {id}: {error}", args, err)),
        }
    }

    pub async fn test<T: Entity>(&self, config: &AppConfig, entity: &T) -> Result<String, Failure> {
        tracing::trace!("Call:Test({}, {} {})", config.name, T::KIND, entity.id());

        let result = async {
            let api = self.factory.connect::<T>(config)?;
            if !T::KIND.testable() {
                return Err(StarrError::UnsupportedOperation {
                    app: config.app.clone(),
                    kind: T::KIND.label(),
                    operation: "test",
                });
            }
            self.busy.hold(self.remote(api.test(entity))).await
        }
        .await;

        let args: &Args = &[
            ("app", &config.name),
            ("kind", &T::KIND.label()),
            ("name", &entity.name()),
            ("id", &entity.id()),
        ];
        match result {
            Ok(()) => Ok(self.announce("Tested {app} {kind} {name} ({id}).", args)),
            Err(err) => Err(self.fail("Testing {app} {kind}: {name} ({id}): {error}", args, err)),
        }
    }

    /// List, keep the selected ids, and write the result through the payload store.
    pub async fn export<T: Entity>(
        &self,
        config: &AppConfig,
        selection: &Selection,
    ) -> Result<DataReply<Utf8PathBuf>, Failure> {
        tracing::trace!(
            "Call:Export({}, {} of {})",
            config.name,
            selection.count(),
            T::KIND.plural()
        );

        let result = async {
            exchange_guard::<T>(config)?;
            let api = self.factory.connect::<T>(config)?;
            let listed = self.remote(api.list()).await?;
            let items = exchange::filter_by_selection(listed, selection);
            let bytes = serde_json::to_vec_pretty(&items)?;
            let path = self
                .store
                .write(&exchange::export_file_name::<T>(config), bytes)
                .await?;
            Ok::<_, StarrError>((items.len(), path))
        }
        .await;

        match result {
            Ok((count, path)) => {
                let msg = self.announce(
                    "Exported {count} {kinds} from {app} to {path}.",
                    &[
                        ("count", &count),
                        ("kinds", &T::KIND.plural()),
                        ("app", &config.name),
                        ("path", &path),
                    ],
                );
                Ok(DataReply::new(msg, path))
            }
            Err(err) => Err(self.fail(
                "Exporting {app} {kinds}: {error}",
                &[("app", &config.name), ("kinds", &T::KIND.plural())],
                err,
            )),
        }
    }

    /// Read a payload and return its entities ready to be added. Nothing is sent.
    pub async fn import<T: Entity>(
        &self,
        config: &AppConfig,
    ) -> Result<DataReply<Vec<T>>, Failure> {
        tracing::trace!("Call:Import({}, {})", config.name, T::KIND.plural());

        let result = async {
            exchange_guard::<T>(config)?;
            let (path, bytes) = self
                .store
                .read(&exchange::export_file_name::<T>(config))
                .await?;
            let items: Vec<T> = serde_json::from_slice(&bytes)?;
            let templates: Vec<T> = items.into_iter().map(Entity::into_template).collect();
            Ok::<_, StarrError>((path, templates))
        }
        .await;

        match result {
            Ok((path, templates)) => {
                let msg = self.announce(
                    "Imported {count} {kinds} from {path}.",
                    &[
                        ("count", &templates.len()),
                        ("kinds", &T::KIND.plural()),
                        ("path", &path),
                    ],
                );
                Ok(DataReply::new(msg, templates))
            }
            Err(err) => Err(self.fail(
                "Importing {app} {kinds}: {error}",
                &[("app", &config.name), ("kinds", &T::KIND.plural())],
                err,
            )),
        }
    }

    // ---------------------------------------------------------------------------------
    // Download clients
    // ---------------------------------------------------------------------------------

    pub async fn download_clients(
        &self,
        config: &AppConfig,
    ) -> Result<Vec<DownloadClient>, Failure> {
        self.list(config).await
    }

    pub async fn download_client(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<DownloadClient, Failure> {
        self.get(config, id).await
    }

    pub async fn add_download_client(
        &self,
        config: &AppConfig,
        client: &DownloadClient,
    ) -> Result<DataReply<DownloadClient>, Failure> {
        self.add(config, client).await
    }

    pub async fn update_download_client(
        &self,
        config: &AppConfig,
        client: &DownloadClient,
        force: bool,
    ) -> Result<DataReply<DownloadClient>, Failure> {
        self.update(config, client, force).await
    }

    pub async fn delete_download_client(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<String, Failure> {
        self.delete::<DownloadClient>(config, id).await
    }

    pub async fn test_download_client(
        &self,
        config: &AppConfig,
        client: &DownloadClient,
    ) -> Result<String, Failure> {
        self.test(config, client).await
    }

    pub async fn export_download_clients(
        &self,
        config: &AppConfig,
        selection: &Selection,
    ) -> Result<DataReply<Utf8PathBuf>, Failure> {
        self.export::<DownloadClient>(config, selection).await
    }

    pub async fn import_download_clients(
        &self,
        config: &AppConfig,
    ) -> Result<DataReply<Vec<DownloadClient>>, Failure> {
        self.import(config).await
    }

    // ---------------------------------------------------------------------------------
    // Quality profiles
    // ---------------------------------------------------------------------------------

    pub async fn quality_profiles(
        &self,
        config: &AppConfig,
    ) -> Result<Vec<QualityProfile>, Failure> {
        self.list(config).await
    }

    pub async fn quality_profile(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<QualityProfile, Failure> {
        self.get(config, id).await
    }

    pub async fn add_quality_profile(
        &self,
        config: &AppConfig,
        profile: &QualityProfile,
    ) -> Result<DataReply<QualityProfile>, Failure> {
        self.add(config, profile).await
    }

    pub async fn update_quality_profile(
        &self,
        config: &AppConfig,
        profile: &QualityProfile,
        force: bool,
    ) -> Result<DataReply<QualityProfile>, Failure> {
        self.update(config, profile, force).await
    }

    pub async fn delete_quality_profile(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<String, Failure> {
        self.delete::<QualityProfile>(config, id).await
    }

    pub async fn test_quality_profile(
        &self,
        config: &AppConfig,
        profile: &QualityProfile,
    ) -> Result<String, Failure> {
        self.test(config, profile).await
    }

    pub async fn export_quality_profiles(
        &self,
        config: &AppConfig,
        selection: &Selection,
    ) -> Result<DataReply<Utf8PathBuf>, Failure> {
        self.export::<QualityProfile>(config, selection).await
    }

    pub async fn import_quality_profiles(
        &self,
        config: &AppConfig,
    ) -> Result<DataReply<Vec<QualityProfile>>, Failure> {
        self.import(config).await
    }

    // ---------------------------------------------------------------------------------
    // Metadata profiles
    // ---------------------------------------------------------------------------------

    pub async fn metadata_profiles(
        &self,
        config: &AppConfig,
    ) -> Result<Vec<MetadataProfile>, Failure> {
        self.list(config).await
    }

    pub async fn metadata_profile(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<MetadataProfile, Failure> {
        self.get(config, id).await
    }

    pub async fn add_metadata_profile(
        &self,
        config: &AppConfig,
        profile: &MetadataProfile,
    ) -> Result<DataReply<MetadataProfile>, Failure> {
        self.add(config, profile).await
    }

    pub async fn update_metadata_profile(
        &self,
        config: &AppConfig,
        profile: &MetadataProfile,
        force: bool,
    ) -> Result<DataReply<MetadataProfile>, Failure> {
        self.update(config, profile, force).await
    }

    pub async fn delete_metadata_profile(
        &self,
        config: &AppConfig,
        id: i64,
    ) -> Result<String, Failure> {
        self.delete::<MetadataProfile>(config, id).await
    }

    pub async fn test_metadata_profile(
        &self,
        config: &AppConfig,
        profile: &MetadataProfile,
    ) -> Result<String, Failure> {
        self.test(config, profile).await
    }

    pub async fn export_metadata_profiles(
        &self,
        config: &AppConfig,
        selection: &Selection,
    ) -> Result<DataReply<Utf8PathBuf>, Failure> {
        self.export::<MetadataProfile>(config, selection).await
    }

    pub async fn import_metadata_profiles(
        &self,
        config: &AppConfig,
    ) -> Result<DataReply<Vec<MetadataProfile>>, Failure> {
        self.import(config).await
    }

    // ---------------------------------------------------------------------------------
    // Reply and failure plumbing
    // ---------------------------------------------------------------------------------

    /// Run one remote call and record it. Locally rejected calls are not counted here.
    async fn remote<R, Fut>(&self, fut: Fut) -> StarrResult<R>
    where
        Fut: Future<Output = StarrResult<R>>,
    {
        let start = Instant::now();
        let result = fut.await;
        match &result {
            Err(err) if err.is_local() => {}
            other => self
                .metrics
                .record_remote_call(start.elapsed(), other.is_err()),
        }
        result
    }

    fn announce(&self, template: &str, args: &Args<'_>) -> String {
        let msg = self.translator.get().translate(template, args);
        self.notifier.info(msg.clone());
        msg
    }

    fn fail(&self, template: &str, args: &Args<'_>, cause: StarrError) -> Failure {
        if cause.is_local() {
            self.metrics.record_local_rejection();
        }

        let error = cause.surface();
        let mut all: Vec<(&str, &dyn Display)> = args.to_vec();
        all.push(("error", &error));

        let message = self.translator.get().translate(template, &all);
        self.notifier.error(message.clone());
        Failure { message, cause }
    }
}

/// Import and export only run for kinds that manage `T`.
fn exchange_guard<T: Entity>(config: &AppConfig) -> StarrResult<AppKind> {
    match config.kind() {
        Ok(kind) if kind.supports(T::KIND) => Ok(kind),
        _ => Err(StarrError::InvalidApp),
    }
}
