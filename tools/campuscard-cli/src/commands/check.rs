//! Check fonts and configuration.

use campuscard_card_render::fonts::FontSet;
use campuscard_card_render::scene::FontFace;
use campuscard_card_render::CardTheme;
use campuscard_common::config::{config_file_path, AppConfig};

pub fn run(config: AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("CampusCard System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[INFO] Config: defaults ({} not found)", config_path.display());
    }

    if config.data_file.is_file() {
        println!("[OK] Records: {}", config.data_file.display());
    } else {
        println!("[WARN] Records: {} does not exist", config.data_file.display());
    }

    let mut ready = true;

    let fonts = FontSet::load(&config.render.fonts);
    for (label, face) in [
        ("Regular", FontFace::Regular),
        ("Bold", FontFace::Bold),
        ("Italic", FontFace::Italic),
    ] {
        match fonts.source(face) {
            Some(path) => println!("[OK] {label} font: {}", path.display()),
            None => println!("[WARN] {label} font: not found"),
        }
    }
    if fonts.is_empty() {
        ready = false;
        println!("     Cards will render without text. Set render.fonts.regular in the config.");
    }

    match config.render.default_theme.parse::<CardTheme>() {
        Ok(theme) => println!("[OK] Default theme: {theme}"),
        Err(e) => {
            ready = false;
            println!("[FAIL] Default theme: {e}");
        }
    }

    for theme in CardTheme::ALL {
        let issues = theme.layout().validate();
        if issues.is_empty() {
            let layout = theme.layout();
            println!("[OK] {theme} layout: {}x{}", layout.width, layout.height);
        } else {
            ready = false;
            for issue in issues {
                println!("[FAIL] {theme} layout: {issue}");
            }
        }
    }

    println!("[OK] Photo fetch timeout: {}s", config.fetch.timeout_secs);
    match &config.fetch.photo_root {
        Some(root) if root.is_dir() => println!("[OK] Photo root: {}", root.display()),
        Some(root) => {
            ready = false;
            println!("[FAIL] Photo root: {} is not a directory", root.display());
        }
        None => println!("[INFO] Photo root: unset (only http(s) photos are fetched)"),
    }
    println!("[OK] Server bind: {}", config.server.bind);

    if write_config {
        config.save()?;
        println!("\nWrote configuration to {}", config_path.display());
    }

    println!();
    if ready {
        println!("CampusCard is ready.");
    } else {
        println!("Some checks failed. See above for fixes.");
    }

    Ok(())
}
