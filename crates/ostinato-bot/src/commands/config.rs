use anyhow::Result;
use ostinato_core::config::{self, Config};

fn mask(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "<set>",
        None => "<not set>",
    }
}

/// Show the current effective configuration.
///
/// Secrets are masked; this output ends up in terminals and pastebins.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  discord_token: {}", mask(config.discord_token.as_deref()));
    println!("  lastfm_api_key: {}", mask(config.lastfm_api_key.as_deref()));
    println!(
        "  spotify_client_id: {}",
        mask(config.spotify_client_id.as_deref())
    );
    println!(
        "  spotify_client_secret: {}",
        mask(config.spotify_client_secret.as_deref())
    );
    println!("  database_path: {}", config.database_path.display());

    println!("\nPriority: CLI args > ENV vars (OST_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure ostinato.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
