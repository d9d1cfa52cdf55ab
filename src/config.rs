use std::path::PathBuf;
use std::{env, fs, io};

use anyhow::{Context, Result};
use log::warn;
use serde::de::DeserializeOwned;

use crate::dirs::{ensure_dir_exists, home_dir, is_root};

/// The directories the service reads its configuration from and writes its
/// data to.
pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    pub pki_path: PathBuf,
}

impl PathSet {
    pub fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        let is_root = is_root();

        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var("TOURISM_CONFIG") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/etc/tourism")
        } else {
            home_dir()?.join(".config").join("tourism")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var("TOURISM_DATA") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/var/lib/tourism")
        } else {
            home_dir()?.join(".local").join("share").join("tourism")
        };

        // PKI path is always under config path
        let pki_path = config_path.join("pki");

        ensure_dir_exists(&config_path)
            .with_context(|| format!("ensure config directory: {}", config_path.display()))?;
        ensure_dir_exists(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;
        ensure_dir_exists(&pki_path)
            .with_context(|| format!("ensure pki directory: {}", pki_path.display()))?;

        Ok(Self {
            config_path,
            data_path,
            pki_path,
        })
    }

    /// Loads `<config_path>/<name>.toml`, falling back to the defaults when the
    /// file does not exist, then completes and validates the result.
    pub fn load_config<T>(&self, name: &str) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
    {
        let path = self.config_path.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("parse config file: {}", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file for {name} not found, using defaults");
                T::default()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let base = env::temp_dir().join("tourism-catalog-test");
        Self {
            config_path: base.join("config"),
            data_path: base.join("data"),
            pki_path: base.join("config").join("pki"),
        }
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}
