use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Configuration object types managed on a remote application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    DownloadClient,
    QualityProfile,
    MetadataProfile,
}

impl EntityKind {
    /// Lowercase singular label, e.g. "download client"
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::DownloadClient => "download client",
            EntityKind::QualityProfile => "quality profile",
            EntityKind::MetadataProfile => "metadata profile",
        }
    }

    /// Lowercase plural label, e.g. "download clients"
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::DownloadClient => "download clients",
            EntityKind::QualityProfile => "quality profiles",
            EntityKind::MetadataProfile => "metadata profiles",
        }
    }

    /// Title used when reporting an added entity
    pub fn title(self) -> &'static str {
        match self {
            EntityKind::DownloadClient => "Download Client",
            EntityKind::QualityProfile => "QualityProfile",
            EntityKind::MetadataProfile => "MetadataProfile",
        }
    }

    /// Collection name used in export file names
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::DownloadClient => "DownloadClients",
            EntityKind::QualityProfile => "QualityProfiles",
            EntityKind::MetadataProfile => "MetadataProfiles",
        }
    }

    /// REST resource segment below `/api/<version>/`
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::DownloadClient => "downloadclient",
            EntityKind::QualityProfile => "qualityprofile",
            EntityKind::MetadataProfile => "metadataprofile",
        }
    }

    /// Only provider resources (download clients) expose a `/test` endpoint.
    pub fn testable(self) -> bool {
        matches!(self, EntityKind::DownloadClient)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A remote configuration record.
///
/// Implementors keep every field they do not model in a flattened map, so payloads
/// from any application version survive a list → export → import → add cycle.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Server-assigned identifier, 0 when unassigned
    fn id(&self) -> i64;

    fn name(&self) -> &str;

    /// Short description used in "added" messages
    fn summary(&self) -> String {
        self.name().to_string()
    }

    /// Drop server-assigned fields so the record can be added to another instance.
    fn into_template(self) -> Self;
}

fn is_unassigned(id: &i64) -> bool {
    *id == 0
}

/// One provider setting (`fields[]` entry) of a download client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderField {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadClient {
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub implementation: String,
    #[serde(default)]
    pub implementation_name: String,
    #[serde(default)]
    pub config_contract: String,
    #[serde(default)]
    pub fields: Vec<ProviderField>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DownloadClient {
    /// Look up a provider setting by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| &f.value)
    }
}

impl Entity for DownloadClient {
    const KIND: EntityKind = EntityKind::DownloadClient;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn summary(&self) -> String {
        format!("{} ({})", self.name, self.protocol)
    }

    fn into_template(mut self) -> Self {
        self.id = 0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub upgrade_allowed: bool,
    #[serde(default)]
    pub cutoff: i64,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for QualityProfile {
    const KIND: EntityKind = EntityKind::QualityProfile;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_template(mut self) -> Self {
        self.id = 0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataProfile {
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for MetadataProfile {
    const KIND: EntityKind = EntityKind::MetadataProfile;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_template(mut self) -> Self {
        self.id = 0;
        self
    }
}
