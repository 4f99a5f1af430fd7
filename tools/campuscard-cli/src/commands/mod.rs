pub mod check;
pub mod export;
pub mod preview;
pub mod serve;
pub mod validate;

use std::path::PathBuf;

use campuscard_card_render::CardTheme;
use campuscard_common::config::AppConfig;

/// Theme from the command line, else the configured default.
pub fn resolve_theme(config: &AppConfig, requested: Option<&str>) -> anyhow::Result<CardTheme> {
    let raw = requested.unwrap_or(&config.render.default_theme);
    raw.parse::<CardTheme>()
        .map_err(|e| anyhow::anyhow!("{e}. Use: classic, premium"))
}

/// Records file from the command line, else the configured one.
pub fn data_file(config: &AppConfig, requested: Option<PathBuf>) -> PathBuf {
    requested.unwrap_or_else(|| config.data_file.clone())
}
