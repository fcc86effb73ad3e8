use std::path::PathBuf;
use std::process::ExitCode;

use solidview::ViewerConfig;

const DEFAULT_CONFIG: &str = "solidview.toml";

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match solidview::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// First argument, else `solidview.toml` in the working directory, else defaults.
fn load_config() -> Result<ViewerConfig, solidview::ConfigError> {
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        log::info!("loading config from {}", path.display());
        return ViewerConfig::load(path);
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG);
    if fallback.is_file() {
        log::info!("loading config from {DEFAULT_CONFIG}");
        return ViewerConfig::load(fallback);
    }
    Ok(ViewerConfig::default())
}
