//! Name/value list adapter.
//!
//! Many service events encode maps as lists of pairs:
//!
//! ```text
//! [
//!     { "name": "Environment", "value": "prod" },
//!     { "name": "Owner", "value": "ops" }
//! ]
//! ```
//!
//! [`NameValueList`] reads that shape into an ordered map and writes it back
//! out the same way.

use crate::payload::{RawValue, Shape};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeSeq};

/// An ordered map decoded from a `[{"name": .., "value": ..}]` list.
///
/// - Numbers and booleans in `value` are kept as their text.
/// - A `null` or missing `value` is kept as `None`.
/// - Entries without a `name` are skipped; unknown keys are ignored.
/// - A repeated name replaces the earlier value, keeping its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValueList {
    entries: Vec<(String, Option<String>)>,
}

impl NameValueList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The value for `name`; `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether `name` is present, even with a null value.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Option<String>)> for NameValueList {
    fn from_iter<I: IntoIterator<Item = (N, Option<String>)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (name, value) in iter {
            list.insert(name, value);
        }
        list
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

impl Serialize for NameValueList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            seq.serialize_element(&Entry { name, value })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for NameValueList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<RawValue>::deserialize(deserializer)?;
        let mut list = Self::new();

        for item in items {
            let fields = match item {
                RawValue::Object(fields) => fields,
                other => {
                    return Err(de::Error::custom(format!(
                        "expected name/value object, found {}",
                        Shape::of(&other)
                    )));
                }
            };

            let Some(name) = fields.get("name").and_then(scalar_text) else {
                continue;
            };

            let value = match fields.get("value") {
                None | Some(RawValue::Null) => None,
                Some(v) => Some(scalar_text(v).ok_or_else(|| {
                    <D::Error as de::Error>::custom(format!(
                        "value of \"{name}\" must be a scalar, found {}",
                        Shape::of(v)
                    ))
                })?),
            };

            list.insert(name, value);
        }

        Ok(list)
    }
}

fn scalar_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::String(s) => Some(s.clone()),
        RawValue::Number(n) => Some(n.to_string()),
        RawValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
