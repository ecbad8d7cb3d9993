use crate::error::ConfigError;
use clap::{App, Arg, ArgMatches};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "butai.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directories searched in order for meshes and textures.
    pub locations: Vec<PathBuf>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            locations: vec![PathBuf::from("media")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: PathBuf::from("butai.log"),
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub resources: ResourceConfig,
    pub log: LogConfig,
}

/// Where a configuration came from, reported once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(PathBuf),
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file, failing if it does not exist.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_owned()),
            _ => ConfigError::Io {
                path: path.to_owned(),
                source,
            },
        })?;
        Config::from_toml_str(&text)
    }

    /// Like `load`, but a missing file falls back to the defaults.
    pub fn restore(path: &Path) -> Result<(Config, ConfigSource), ConfigError> {
        match Config::load(path) {
            Ok(config) => Ok((config, ConfigSource::File(path.to_owned()))),
            Err(ConfigError::NotFound(_)) => {
                Ok((Config::default(), ConfigSource::Defaults(path.to_owned())))
            }
            Err(e) => Err(e),
        }
    }

    /// Restores the file named by `--config` and layers the other flags on top.
    pub fn from_matches(matches: &ArgMatches) -> Result<(Config, ConfigSource), ConfigError> {
        let path = Path::new(matches.value_of("config").unwrap_or(DEFAULT_CONFIG_FILE));
        let (mut config, source) = Config::restore(path)?;
        config.apply_matches(matches)?;
        Ok((config, source))
    }

    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), ConfigError> {
        if let Some(level) = matches.value_of("log-level") {
            self.log.level = level.to_owned();
        }
        if let Some(file) = matches.value_of("log-file") {
            self.log.file = PathBuf::from(file);
        }
        if let Some(locations) = matches.values_of("resources") {
            self.resources.locations = locations.map(PathBuf::from).collect();
        }
        if let Some(width) = parse_dimension(matches, "width")? {
            self.window.width = width;
        }
        if let Some(height) = parse_dimension(matches, "height")? {
            self.window.height = height;
        }
        if matches.is_present("fullscreen") {
            self.window.fullscreen = true;
        }
        Ok(())
    }
}

fn parse_dimension(matches: &ArgMatches, name: &'static str) -> Result<Option<u32>, ConfigError> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => match value.parse::<u32>() {
            Ok(v) if v > 0 => Ok(Some(v)),
            _ => Err(ConfigError::InvalidArgument {
                name,
                value: value.to_owned(),
            }),
        },
    }
}

/// Command line shared by every lab binary.
pub fn cli_app(name: &str) -> App<'static, 'static> {
    App::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lecture lab demo")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Configuration file, defaults are used when it is missing")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log-level")
                .short("l")
                .long("log-level")
                .value_name("LEVEL")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log-file")
                .long("log-file")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("resources")
                .short("r")
                .long("resources")
                .value_name("DIR")
                .help("Resource location, may be repeated")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .value_name("PIXELS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("PIXELS")
                .takes_value(true),
        )
        .arg(Arg::with_name("fullscreen").long("fullscreen"))
}
