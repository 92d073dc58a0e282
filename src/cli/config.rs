//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "api.base_url")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => show_all_config(&config),

        (Some(key), None) => match config.get(key) {
            Some(value) if key == "api_keys.maptiler" => println!("{}", mask(&value)),
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

fn mask(key: &str) -> &'static str {
    if key.is_empty() {
        "\"\" # not configured"
    } else {
        "\"***\" # configured"
    }
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[api]");
    println!("base_url = \"{}\"", config.api.base_url);
    println!("user_id = {}", config.api.user_id);
    println!("trailing_slash = {}", config.api.trailing_slash);
    println!("timeout_secs = {}", config.api.timeout_secs);
    println!();

    println!("[geocoding]");
    println!("maptiler_url = \"{}\"", config.geocoding.maptiler_url);
    println!("nominatim_url = \"{}\"", config.geocoding.nominatim_url);
    println!("language = \"{}\"", config.geocoding.language);
    println!("zoom = {}", config.geocoding.zoom);
    println!("user_agent = \"{}\"", config.geocoding.user_agent);
    println!();

    println!("[map]");
    match &config.map.boundaries {
        Some(path) => println!("boundaries = \"{}\"", path.display()),
        None => println!("# boundaries = \"countries.geojson\""),
    }
    println!("total_countries = {}", config.map.total_countries);
    println!();

    println!("[api_keys]");
    println!("maptiler = {}", mask(&config.api_keys.maptiler));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_never_prints_key() {
        assert_eq!(mask(""), "\"\" # not configured");
        assert!(!mask("abc123").contains("abc123"));
    }
}
