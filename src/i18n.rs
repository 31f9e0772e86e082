//! Message formatting and translation.
//!
//! Every user-facing sentence goes through [`Translator::translate`]. Templates are the
//! English text with `{name}` placeholders; a catalog maps English templates to
//! localized ones and falls back to English for anything it does not list.
//!
//! Catalog files are YAML:
//!
//! ```yaml
//! language: Deutsch
//! messages:
//!   "Deleted {app} {kind} with ID {id}.": "{kind} mit ID {id} aus {app} gelöscht."
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    language: String,
    #[serde(default)]
    messages: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Translator {
    code: String,
    language: String,
    messages: HashMap<String, String>,
}

impl Translator {
    /// The built-in English catalog (templates are used as-is).
    pub fn english() -> Self {
        Self {
            code: DEFAULT_LANG.to_string(),
            language: "English".to_string(),
            messages: HashMap::new(),
        }
    }

    /// Parse a YAML catalog for language `code`.
    pub fn from_yaml(code: &str, yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        let catalog: Catalog = serde_yaml_ng::from_str(yaml)?;
        let language = if catalog.language.is_empty() {
            code.to_string()
        } else {
            catalog.language
        };

        Ok(Self {
            code: code.to_string(),
            language,
            messages: catalog.messages,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Format `template` (after catalog lookup) with named arguments.
    pub fn translate(&self, template: &str, args: &[(&str, &dyn Display)]) -> String {
        let localized = self
            .messages
            .get(template)
            .map(String::as_str)
            .unwrap_or(template);
        fill(localized, args)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

/// The active translator, shared by everything that formats messages.
///
/// Clones point at the same slot; [`SharedTranslator::set`] switches the language for
/// all of them at once.
#[derive(Debug, Clone, Default)]
pub struct SharedTranslator {
    slot: Arc<RwLock<Arc<Translator>>>,
}

impl SharedTranslator {
    pub fn new(translator: Translator) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(translator))),
        }
    }

    pub fn get(&self) -> Arc<Translator> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, translator: Translator) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(translator);
    }
}

fn fill(template: &str, args: &[(&str, &dyn Display)]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match args.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(&value.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
