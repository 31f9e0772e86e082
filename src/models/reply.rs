use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Uniform success envelope returned to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReply<T = serde_json::Value> {
    pub msg: String,
    pub data: T,
}

impl<T> DataReply<T> {
    pub fn new(msg: impl Into<String>, data: T) -> Self {
        Self {
            msg: msg.into(),
            data,
        }
    }
}

/// Entity ids picked by the user for export.
///
/// The front end sends a `{ "<id>": bool }` map of checkbox states; a plain list of
/// ids is accepted as well. Ids keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection(IndexSet<i64>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for Selection {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Ids(Vec<i64>),
    Checked(IndexMap<String, bool>),
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSelection::deserialize(deserializer)? {
            RawSelection::Ids(ids) => Ok(ids.into_iter().collect()),
            RawSelection::Checked(map) => {
                let mut selection = Selection::new();
                for (key, checked) in map {
                    let id = key
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| de::Error::custom(format!("invalid entity id '{key}'")))?;
                    if checked {
                        selection.insert(id);
                    }
                }
                Ok(selection)
            }
        }
    }
}
