use anyhow::Result;
use mashup_core::config::Config;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("mashup configuration\n");
    print!("{}", toml::to_string_pretty(&config)?);

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(config_dir) = dirs::config_dir() {
        println!("  2. {}/mashup/config.toml", config_dir.display());
    }
    println!("  3. Environment variables (MASHUP_*)");

    Ok(())
}
