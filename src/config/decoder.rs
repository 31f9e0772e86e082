//! Single-field settings decoder.
//!
//! The front end saves one setting at a time as a `(name, value)` string pair.
//! [`FieldDecoder`] applies such a pair to a copy of [`Settings`], converting the
//! string to the type the field currently holds.

use crate::models::Settings;
use serde_yaml_ng::{Mapping, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unknown field")]
    UnknownField,

    #[error("field is not a single value")]
    NotScalar,

    #[error("expected {expected}")]
    WrongType { expected: &'static str },

    #[error("{0}")]
    Invalid(#[from] serde_yaml_ng::Error),
}

/// Decodes `(name, value)` pairs into [`Settings`].
///
/// Names are dotted paths of the YAML keys, e.g. `dark_mode` or `log.level`.
/// Constructed by the application and handed to whoever needs it; it holds no
/// state of its own.
#[derive(Debug, Clone)]
pub struct FieldDecoder {
    separator: char,
}

impl Default for FieldDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldDecoder {
    pub fn new() -> Self {
        Self { separator: '.' }
    }

    /// Set a single named field of `settings` from its string form.
    pub fn decode(
        &self,
        settings: &mut Settings,
        name: &str,
        value: &str,
    ) -> Result<(), DecodeError> {
        let mut root = serde_yaml_ng::to_value(&*settings)?;
        let slot = self.lookup(&mut root, name)?;

        let replacement = match &*slot {
            Value::Bool(_) => Value::Bool(parse_bool(value)?),
            Value::Number(n) if n.is_f64() => value
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| DecodeError::WrongType { expected: "a number" })?,
            Value::Number(_) => value
                .trim()
                .parse::<u64>()
                .map(Value::from)
                .or_else(|_| value.trim().parse::<i64>().map(Value::from))
                .map_err(|_| DecodeError::WrongType { expected: "an integer" })?,
            Value::String(_) | Value::Null => Value::String(value.to_string()),
            _ => return Err(DecodeError::NotScalar),
        };
        *slot = replacement;

        *settings = serde_yaml_ng::from_value(root)?;
        Ok(())
    }

    fn lookup<'a>(&self, root: &'a mut Value, name: &str) -> Result<&'a mut Value, DecodeError> {
        let mut current = root;
        for part in name.split(self.separator) {
            let map: &mut Mapping = current.as_mapping_mut().ok_or(DecodeError::UnknownField)?;
            current = map
                .get_mut(part.trim())
                .ok_or(DecodeError::UnknownField)?;
        }
        Ok(current)
    }
}

fn parse_bool(value: &str) -> Result<bool, DecodeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        _ => Err(DecodeError::WrongType { expected: "a boolean" }),
    }
}
