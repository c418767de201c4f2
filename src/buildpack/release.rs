//! Release metadata parsing
//!
//! `bin/release` prints YAML with two optional top-level mappings:
//!
//! ```yaml
//! default_process_types:
//!   web: bundle exec rackup -p $PORT
//! config_vars:
//!   LANG: en_US.UTF-8
//! ```

use crate::error::{MasonError, MasonResult};
use crate::procfile::{self, Procfile};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_yaml::Value;
use std::fmt;
use tracing::warn;

/// Parsed output of `bin/release`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Process types the buildpack provides when the app declares none
    pub default_process_types: Procfile,

    /// Environment variables, in the order the buildpack declared them
    pub config_vars: Vec<(String, String)>,
}

/// Key/value pairs in document order, repeats included
type Pairs = Vec<(Value, Value)>;

#[derive(Debug, Default, Deserialize)]
struct RawRelease {
    #[serde(default, deserialize_with = "ordered_pairs")]
    default_process_types: Option<Pairs>,
    #[serde(default, deserialize_with = "ordered_pairs")]
    config_vars: Option<Pairs>,
}

/// Read a section mapping entry by entry. `serde_yaml::Mapping` rejects
/// repeated keys; buildpacks rely on the last one winning.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Option<Pairs>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Option<Pairs>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<Value, Value>()? {
                pairs.push(pair);
            }
            Ok(Some(pairs))
        }
    }

    deserializer.deserialize_any(PairsVisitor)
}

impl ReleaseConfig {
    /// Parse release YAML.
    ///
    /// Empty output is an empty configuration. Anything that is not a
    /// mapping of string-like values is an error whose message is the
    /// reason; callers attach the buildpack name.
    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: Option<RawRelease> = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let raw = raw.unwrap_or_default();

        let default_process_types = flatten("default_process_types", raw.default_process_types)?
            .into_iter()
            .filter(|(name, _)| {
                let valid = procfile::is_valid_name(name);
                if !valid {
                    warn!("Ignoring process type {:?}: not a valid Procfile name", name);
                }
                valid
            })
            .collect();
        let config_vars = flatten("config_vars", raw.config_vars)?;

        Ok(Self {
            default_process_types,
            config_vars,
        })
    }

    /// Parse release YAML produced by `buildpack`
    pub fn parse_for(buildpack: &str, content: &str) -> MasonResult<Self> {
        Self::parse(content).map_err(|reason| MasonError::ReleaseParse {
            buildpack: buildpack.to_string(),
            reason,
        })
    }

    /// Look up a config var
    pub fn config_var(&self, key: &str) -> Option<&str> {
        self.config_vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Turn section entries into ordered string pairs, stringifying scalars.
/// A repeated key keeps its first position and its last value.
fn flatten(section: &str, entries: Option<Pairs>) -> Result<Vec<(String, String)>, String> {
    let Some(entries) = entries else {
        return Ok(Vec::new());
    };

    let mut pairs: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key = scalar_string(&key)
            .ok_or_else(|| format!("{}: keys must be strings", section))?;
        let value = scalar_string(&value)
            .ok_or_else(|| format!("{}.{}: value must be a string", section, key))?;

        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }
    Ok(pairs)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
