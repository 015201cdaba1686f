use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    /// Directory of additional model files (`*.toml`, `*.yaml`, `*.yml`).
    pub models_dir: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub models: BTreeMap<String, ModelDecl>,
}

/// A model declared in the config file or in a model file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ModelDecl {
    /// Name override; model files default to their file stem.
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Declared<FieldDecl>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FieldDecl {
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default = "default_allow_null")]
    pub allow_null: bool,
    pub not_null_message: Option<String>,
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default)]
    pub auto_increment: bool,
    /// Association accessor when this field is a foreign key.
    pub belongs_to: Option<String>,
    /// Predicate name to test specification.
    #[serde(default)]
    pub validate: Declared<serde_json::Value>,
}

/// Table entries in the order they appear in the source file.
#[derive(Debug, Clone)]
pub struct Declared<T>(Vec<(String, T)>);

impl<T> Declared<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T> Default for Declared<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declared<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Entries<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for Entries<T> {
            type Value = Declared<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Declared<T>, A::Error> {
                let mut entries: Vec<(String, T)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(serde::de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    entries.push((key, value));
                }
                Ok(Declared(entries))
            }
        }

        deserializer.deserialize_map(Entries(PhantomData))
    }
}

fn default_field_type() -> String {
    "string".to_string()
}

fn default_allow_null() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub models_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
    /// Every declared model, by name.
    pub models: BTreeMap<String, ModelDecl>,
}

impl ResolvedConfig {
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }
}
