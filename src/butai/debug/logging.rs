use crate::config::LogConfig;
use crate::error::LogError;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::str::FromStr;

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

pub fn parse_level(level: &str) -> Result<LevelFilter, LogError> {
    LevelFilter::from_str(level).map_err(|_| LogError::Level(level.to_owned()))
}

fn build_config(config: &LogConfig) -> Result<Config, LogError> {
    let level = parse_level(&config.level)?;
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    let file = FileAppender::builder()
        .append(false)
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(&config.file)?;

    Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .appender(Appender::builder().build("file", Box::new(file)))
        // vulkano is chatty at trace level
        .logger(Logger::builder().build("vulkano", LevelFilter::Warn))
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(level),
        )
        .map_err(|e| LogError::Setup(e.to_string()))
}

/// Installs the console and log-file appenders. Call once per process.
pub fn init(config: &LogConfig) -> Result<log4rs::Handle, LogError> {
    let handle = log4rs::init_config(build_config(config)?)
        .map_err(|e| LogError::Setup(e.to_string()))?;
    log::info!("*-*-* butai log started, level {}", config.level);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("TRACE").unwrap(), LevelFilter::Trace);
        assert!(matches!(parse_level("loud"), Err(LogError::Level(_))));
    }

    #[test]
    fn config_builds_with_a_file_appender() {
        let dir = std::env::temp_dir().join("butai-logging-test");
        std::fs::create_dir_all(&dir).unwrap();
        let config = LogConfig {
            file: dir.join("butai.log"),
            level: "debug".into(),
        };
        assert!(build_config(&config).is_ok());
    }
}
