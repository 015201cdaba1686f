use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use shellexpand::full;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::types::{ConfigFile, LoggingConfig, ModelDecl, ResolvedConfig};
use crate::report::ModelError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("failed to parse YAML in {0}: {1}")]
    YamlError(String, #[source] serde_yaml::Error),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("home directory not available to expand '~'")]
    NoHome,

    #[error("failed to walk models directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),

    #[error("model '{0}' is declared more than once")]
    DuplicateModel(String),

    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("invalid declaration of {model}.{field}: {reason}")]
    InvalidSpec { model: String, field: String, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        let cf: ConfigFile = toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }

        let models_dir = match &cf.models_dir {
            Some(dir) => Some(relative_to(&path, expand_path(dir)?)),
            None => None,
        };

        let mut models = cf.models;
        if let Some(dir) = &models_dir {
            for (name, decl) in load_model_files(dir)? {
                if models.contains_key(&name) {
                    return Err(ConfigError::DuplicateModel(name));
                }
                models.insert(name, decl);
            }
        }

        let logging = match &cf.logging.file {
            Some(file) => LoggingConfig {
                level: cf.logging.level.clone(),
                file_level: cf.logging.file_level.clone(),
                file: Some(expand_path(&file.to_string_lossy())?),
            },
            None => cf.logging.clone(),
        };

        Ok(ResolvedConfig { config_path: path, models_dir, logging, models })
    }
}

/// Load every model file directly inside `root`.
///
/// A missing directory holds no models. Each file declares one model named
/// after its file stem unless it sets `name`.
pub fn load_model_files(root: &Path) -> Result<BTreeMap<String, ModelDecl>, ConfigError> {
    let mut out = BTreeMap::new();
    if !root.exists() {
        return Ok(out);
    }

    for entry in WalkDir::new(root).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ConfigError::WalkError(root.display().to_string(), e))?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(decl) = read_model_file(path)? else {
            continue;
        };

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let name = decl.name.clone().unwrap_or_else(|| stem.to_string());
        if name.is_empty() {
            continue;
        }
        debug!(model = %name, path = %path.display(), "loaded model file");
        if out.insert(name.clone(), decl).is_some() {
            return Err(ConfigError::DuplicateModel(name));
        }
    }

    Ok(out)
}

fn read_model_file(path: &Path) -> Result<Option<ModelDecl>, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str());
    if !matches!(ext, Some("toml" | "yaml" | "yml")) {
        return Ok(None);
    }

    let display = path.display().to_string();
    let s = fs::read_to_string(path).map_err(|e| ConfigError::ReadError(display.clone(), e))?;

    let decl = if ext == Some("toml") {
        toml::from_str(&s).map_err(|e| ConfigError::ParseError(display, e))?
    } else {
        serde_yaml::from_str(&s).map_err(|e| ConfigError::YamlError(display, e))?
    };
    Ok(Some(decl))
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("recval").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("recval").join("config.toml")
}

/// Relative directories are resolved against the config file's directory.
fn relative_to(config_path: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        return dir;
    }
    config_path.parent().map_or(dir.clone(), |parent| parent.join(&dir))
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}
