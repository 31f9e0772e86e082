use crate::i18n::{DEFAULT_LANG, Translator};
use crate::models::Settings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;

pub mod decoder;

pub use decoder::{DecodeError, FieldDecoder};

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "starrdesk.yaml";

/// Environment prefix for overrides, e.g. `STARRDESK__LOG__LEVEL=debug`
pub const ENV_PREFIX: &str = "STARRDESK";

/// Configuration manager for loading and saving the settings file.
///
/// Layout of the configuration directory:
/// - `starrdesk.yaml`: settings and saved instances
/// - `lang/<code>.yaml`: optional message catalogs
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    lang_dir: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            lang_dir: config_dir.join("lang"),
            config_dir,
        })
    }

    /// Load settings from the YAML file, with `STARRDESK__*` environment overrides.
    ///
    /// A missing file yields defaults.
    pub fn load_settings(&self) -> Result<Settings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let layered = config::Config::builder()
            .add_source(
                config::File::from(self.settings_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: Settings = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Rewrite the settings file.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the message catalog for `lang`, falling back to English.
    pub fn load_translator(&self, lang: &str) -> Result<Translator> {
        if lang.is_empty() || lang == DEFAULT_LANG {
            return Ok(Translator::english());
        }

        let path = self.lang_dir.join(format!("{lang}.yaml"));
        if !path.exists() {
            tracing::warn!("No catalog for language '{}' at {}, using English", lang, path);
            return Ok(Translator::english());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {}", path))?;
        let translator = Translator::from_yaml(lang, &text)
            .with_context(|| format!("Failed to parse catalog: {}", path))?;

        tracing::info!("Loaded {} catalog from {}", translator.language(), path);
        Ok(translator)
    }

    /// Available languages: code → display name. English is always present.
    pub fn languages(&self) -> Result<IndexMap<String, String>> {
        let mut languages = IndexMap::new();
        languages.insert(DEFAULT_LANG.to_string(), Translator::english().language().to_string());

        if !self.lang_dir.exists() {
            return Ok(languages);
        }

        let entries = self
            .lang_dir
            .read_dir_utf8()
            .with_context(|| format!("Failed to list catalogs: {}", self.lang_dir))?;

        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to list catalogs: {}", self.lang_dir))?;
            let path = entry.path();
            if path.extension() != Some("yaml") {
                continue;
            }
            let Some(code) = path.file_stem() else {
                continue;
            };
            match self.load_translator(code) {
                Ok(tr) => {
                    languages.insert(code.to_string(), tr.language().to_string());
                }
                Err(e) => tracing::warn!("Skipping catalog {}: {:#}", path, e),
            }
        }

        Ok(languages)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
