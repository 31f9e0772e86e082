// Desktop facade
//
// Everything the front end calls that is not an entity operation: settings, saved
// instances, folder helpers, version info. Entity operations live on `Starrs`.

use crate::config::{ConfigManager, FieldDecoder};
use crate::i18n::{SharedTranslator, Translator};
use crate::logging::LogHandle;
use crate::models::{AppConfig, AppKind, Settings};
use crate::notify::Notifier;
use crate::starrs::{BusyFloor, Transport};
use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use std::process::ExitStatus;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// Reply to instance edits: a message plus the refreshed instance list of that kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedInstance {
    pub msg: String,
    pub instances: Vec<AppConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub version: String,
    pub name: String,
    pub os: String,
    /// Seconds since the facade was created
    pub running: u64,
}

pub struct App {
    config: ConfigManager,
    settings: RwLock<Settings>,
    translator: SharedTranslator,
    busy: BusyFloor,
    decoder: FieldDecoder,
    log: Option<LogHandle>,
    notifier: Arc<Notifier>,
    started: Instant,
}

impl App {
    pub fn new(
        config: ConfigManager,
        settings: Settings,
        notifier: Arc<Notifier>,
        log: Option<LogHandle>,
    ) -> Self {
        let translator = config.load_translator(&settings.lang).unwrap_or_else(|e| {
            tracing::warn!("Failed to load '{}' messages, using English: {:#}", settings.lang, e);
            Translator::english()
        });

        Self {
            config,
            busy: BusyFloor::new(settings.busy_floor()),
            settings: RwLock::new(settings),
            translator: SharedTranslator::new(translator),
            decoder: FieldDecoder::new(),
            log,
            notifier,
            started: Instant::now(),
        }
    }

    /// Snapshot of the running settings.
    pub fn get_config(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_windows(&self) -> bool {
        cfg!(windows)
    }

    /// Translator for the configured language.
    pub fn translator(&self) -> Arc<Translator> {
        self.translator.get()
    }

    /// The translator slot a language change swaps. Hand it to [`crate::Starrs`].
    pub fn shared_translator(&self) -> SharedTranslator {
        self.translator.clone()
    }

    /// Busy floor that follows `busy_floor_ms`. Hand it to [`crate::Starrs`].
    pub fn busy_floor(&self) -> BusyFloor {
        self.busy.clone()
    }

    pub fn languages(&self) -> Result<IndexMap<String, String>> {
        self.config.languages()
    }

    /// Decode one named setting, persist, then swap it into the running settings.
    pub fn save_config_item(&self, name: &str, value: &str, reload: bool) -> Result<String> {
        let mut settings = self.get_config();

        if let Err(e) = self.decoder.decode(&mut settings, name, value) {
            let err = anyhow!("decoding '{}' value '{}' failed: {}", name, value, e);
            self.notifier.error(format!("Writing config: {err}"));
            return Err(err);
        }

        if let Err(e) = self.config.save_settings(&settings) {
            self.notifier.error(format!("Error writing config: {e:#}"));
            return Err(anyhow!("writing config: {:#}", e));
        }

        if name == "lang" {
            self.reload_translator(&settings.lang);
        }
        self.busy.set_min(settings.busy_floor());

        let level = settings.log.level.clone();
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;

        if reload {
            match &self.log {
                Some(log) => log.set_level(&level)?,
                None => tracing::debug!("Logging reload requested without a log handle"),
            }
        }

        let msg = self.translator().translate(
            "Config Item '{name}' saved! Value: {value}",
            &[("name", &name), ("value", &value)],
        );
        tracing::info!("{}", msg);
        Ok(msg)
    }

    /// Replace the instance at `index`, or append when `index` is `None`.
    ///
    /// Unless `force` is set the app kind and connection settings must be usable.
    pub fn save_instance(
        &self,
        index: Option<usize>,
        instance: AppConfig,
        force: bool,
    ) -> Result<SavedInstance> {
        let result = self.store_instance(index, instance, force);
        self.report(result)
    }

    pub fn remove_instance(&self, index: usize, app: AppKind) -> Result<SavedInstance> {
        let result = self.drop_instance(index, app);
        self.report(result)
    }

    /// Native folder picker; `None` when the dialog is cancelled.
    pub async fn pick_folder(&self, title: &str) -> Result<Option<Utf8PathBuf>> {
        let result = self.ask_folder(title).await;
        self.report(result)
    }

    /// Open `path` in the platform file manager without waiting for it.
    ///
    /// Works with or without a tokio runtime on the calling thread. Failures are logged.
    pub fn open_folder(&self, path: &Utf8Path) -> String {
        let target = path.to_path_buf();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let status = tokio::process::Command::new(opener())
                        .arg(target.as_str())
                        .status()
                        .await;
                    log_open(&target, status);
                });
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("starrdesk-open".to_string())
                    .spawn(move || {
                        let status = std::process::Command::new(opener())
                            .arg(target.as_str())
                            .status();
                        log_open(&target, status);
                    });
                if let Err(e) = spawned {
                    tracing::error!("Failed to start opener for {}: {}", path, e);
                }
            }
        }

        self.translator()
            .translate("Opening Path: {path}", &[("path", &path)])
    }

    fn store_instance(
        &self,
        index: Option<usize>,
        instance: AppConfig,
        force: bool,
    ) -> Result<SavedInstance> {
        let key = match instance.kind() {
            Ok(kind) => {
                if !force {
                    Transport::new(&instance, kind).with_context(|| {
                        format!("validating {} instance '{}'", kind, instance.name)
                    })?;
                }
                kind.as_str().to_string()
            }
            Err(e) if !force => return Err(anyhow!(e).context("validating instance")),
            Err(_) => instance.app.trim().to_lowercase(),
        };

        let mut settings = self.get_config();
        let list = settings.instances.entry(key.clone()).or_default();
        match index {
            Some(i) if i < list.len() => list[i] = instance.clone(),
            Some(i) => bail!("no {} instance at index {}", key, i),
            None => list.push(instance.clone()),
        }
        let instances = list.clone();

        self.persist(settings)?;

        let msg = self.translator().translate(
            "Saved {app} instance '{name}'.",
            &[("app", &key), ("name", &instance.name)],
        );
        self.notifier.info(msg.clone());
        Ok(SavedInstance { msg, instances })
    }

    fn drop_instance(&self, index: usize, app: AppKind) -> Result<SavedInstance> {
        let mut settings = self.get_config();
        let list = settings
            .instances
            .entry(app.as_str().to_string())
            .or_default();
        if index >= list.len() {
            bail!("no {} instance at index {}", app, index);
        }
        let removed = list.remove(index);
        let instances = list.clone();

        self.persist(settings)?;

        let msg = self.translator().translate(
            "Removed {app} instance '{name}'.",
            &[("app", &app), ("name", &removed.name)],
        );
        self.notifier.info(msg.clone());
        Ok(SavedInstance { msg, instances })
    }

    async fn ask_folder(&self, title: &str) -> Result<Option<Utf8PathBuf>> {
        let start = self.get_config().export_dir;
        let title = title.to_string();

        let picked = tokio::task::spawn_blocking(move || {
            let mut dialog = rfd::FileDialog::new().set_title(&title);
            if !start.is_empty() {
                dialog = dialog.set_directory(&start);
            }
            dialog.pick_folder()
        })
        .await
        .context("Folder dialog task failed")?;

        picked
            .map(|path| {
                Utf8PathBuf::try_from(path)
                    .map_err(|e| anyhow!("Selected folder is not UTF-8: {}", e))
            })
            .transpose()
    }

    pub fn version(&self) -> Version {
        Version {
            version: crate::VERSION.to_string(),
            name: crate::APP_NAME.to_string(),
            os: std::env::consts::OS.to_string(),
            running: self.started.elapsed().as_secs(),
        }
    }

    fn persist(&self, settings: Settings) -> Result<()> {
        self.config
            .save_settings(&settings)
            .map_err(|e| anyhow!("writing config: {:#}", e))?;
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }

    fn reload_translator(&self, lang: &str) {
        match self.config.load_translator(lang) {
            Ok(translator) => self.translator.set(translator),
            Err(e) => {
                tracing::warn!("Keeping current messages, '{}' failed to load: {:#}", lang, e)
            }
        }
    }

    /// Mirror a failed facade call to the notifier before handing it back.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.notifier.error(format!("{e:#}"));
        }
        result
    }
}

fn log_open(target: &Utf8Path, status: std::io::Result<ExitStatus>) {
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::error!("Opening {} exited with {}", target, status),
        Err(e) => tracing::error!("Failed to open {}: {}", target, e),
    }
}

fn opener() -> &'static str {
    if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
