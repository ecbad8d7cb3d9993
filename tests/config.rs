use butai::config::{Config, ConfigSource, DEFAULT_CONFIG_FILE};
use std::path::Path;

#[test]
fn shipped_configuration_matches_the_defaults() {
    let (config, source) = Config::restore(Path::new(DEFAULT_CONFIG_FILE)).unwrap();
    assert_eq!(source, ConfigSource::File(DEFAULT_CONFIG_FILE.into()));
    assert_eq!(config, Config::default());
}

#[test]
fn command_line_overrides_the_file() {
    let matches = butai::config::cli_app("light").get_matches_from(vec![
        "light",
        "--config",
        DEFAULT_CONFIG_FILE,
        "--width",
        "800",
        "--height",
        "600",
    ]);
    let (config, _) = Config::from_matches(&matches).unwrap();
    assert_eq!(config.window.width, 800);
    assert_eq!(config.window.height, 600);
    assert!(config.window.vsync);
}
