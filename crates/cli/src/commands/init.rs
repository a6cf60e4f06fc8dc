//! `switchyard init` — Write a default config file.

use switchyard_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("Switchyard — Setup");
    println!("==================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually or delete and re-run init.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set an API key (SWITCHYARD_API_KEY or OPENAI_API_KEY)");
    println!("  2. Optionally pick models under [classifier], [general_input] and [specialists.<route>]");
    println!("  3. Run: switchyard run -m \"What's AAPL trading at?\"");

    Ok(())
}
