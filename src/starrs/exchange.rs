//! Selection filtering and payload naming for import/export.

use crate::models::{AppConfig, Entity, Selection};
use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("Invalid file name regex"));

/// Keep the items whose id is selected, in listing order.
pub fn filter_by_selection<T: Entity>(items: Vec<T>, selection: &Selection) -> Vec<T> {
    if selection.is_empty() {
        return Vec::new();
    }

    items
        .into_iter()
        .filter(|item| selection.contains(item.id()))
        .collect()
}

/// `<app>_<instance>_<Collection>.json`
pub fn export_file_name<T: Entity>(config: &AppConfig) -> String {
    let app = config.app.trim().to_lowercase();
    let instance = sanitize(&config.name);
    format!("{}_{}_{}.json", sanitize(&app), instance, T::KIND.collection())
}

fn sanitize(raw: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(raw.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "instance".to_string()
    } else {
        cleaned.to_string()
    }
}
