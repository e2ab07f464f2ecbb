use std::path::Path;

use anyhow::{Context, Result};

use glide_core::GlideConfig;

pub fn show(config: &GlideConfig) -> Result<()> {
    println!("# {}", GlideConfig::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn validate(path: Option<&Path>) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(GlideConfig::config_path);

    if !path.exists() {
        println!("{} does not exist, defaults are in effect", path.display());
        return Ok(());
    }

    GlideConfig::load_from(&path).with_context(|| format!("Invalid configuration {}", path.display()))?;
    println!("{} is valid", path.display());
    Ok(())
}

pub fn init() -> Result<()> {
    let path = GlideConfig::config_path();
    if path.exists() {
        println!("{} already exists, leaving it untouched", path.display());
        return Ok(());
    }

    GlideConfig::default().save()?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
