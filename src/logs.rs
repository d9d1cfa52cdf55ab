use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};
use crate::dirs::ensure_dir_exists;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_name")]
    pub name: LogName,

    #[serde(default = "LogConfig::default_level")]
    pub level: LogLevel,

    #[serde(skip)]
    path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum LogName {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
    #[serde(rename = "file")]
    File,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "debug")]
    Debug,
}

impl CommonConfig for LogConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            level: Self::default_level(),
            path: PathBuf::new(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if matches!(self.name, LogName::File) {
            let dir = ps.data_path.join("logs");
            ensure_dir_exists(&dir)
                .with_context(|| format!("ensure logs directory: {}", dir.display()))?;
            self.path = dir.join("server.log");
        }
        Ok(())
    }
}

impl LogConfig {
    pub fn default_name() -> LogName {
        LogName::Stdout
    }

    pub fn default_level() -> LogLevel {
        LogLevel::Info
    }

    pub fn init(&self) -> Result<()> {
        let level = match self.level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        };

        let colored = match self.name {
            LogName::Stdout => io::stdout().is_terminal(),
            LogName::Stderr => io::stderr().is_terminal(),
            LogName::File => false,
        };

        let colors = ColoredLevelConfig::new()
            .info(Color::Green)
            .debug(Color::Magenta);

        let dispatch = fern::Dispatch::new()
            .format(move |out, message, record| {
                let now = humantime::format_rfc3339_millis(std::time::SystemTime::now());
                if colored {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        now,
                        colors.color(record.level()),
                        message
                    ))
                } else {
                    out.finish(format_args!("{} [{}] {}", now, record.level(), message))
                }
            })
            .level(level)
            // actix logs every worker start at info level
            .level_for("actix_server", LevelFilter::Warn);

        let dispatch = match self.name {
            LogName::Stdout => dispatch.chain(io::stdout()),
            LogName::Stderr => dispatch.chain(io::stderr()),
            LogName::File => {
                let file = fern::log_file(&self.path)
                    .with_context(|| format!("open log file: {}", self.path.display()))?;
                dispatch.chain(file)
            }
        };

        dispatch.apply().context("init logger")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_config() {
        let cfg: LogConfig = toml::from_str("name = \"stderr\"\nlevel = \"debug\"").unwrap();
        assert!(matches!(cfg.name, LogName::Stderr));
        assert!(matches!(cfg.level, LogLevel::Debug));

        let cfg: LogConfig = toml::from_str("").unwrap();
        assert!(matches!(cfg.name, LogName::Stdout));
        assert!(matches!(cfg.level, LogLevel::Info));

        assert!(toml::from_str::<LogConfig>("level = \"trace\"").is_err());
    }
}
