//! Configuration loading and schema definitions for microcks-cli.
//!
//! Connection settings normally come from flags. A TOML file passed with
//! `--config` can provide defaults for any of them so that credentials do
//! not have to be repeated on every invocation.

pub mod schema;

pub use schema::*;

use std::path::Path;

use anyhow::{Context, Result};

/// Loads the defaults file from `path`.
///
/// A leading `~` in the path is expanded to the home directory.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (e.g., doesn't exist or permission denied)
/// - The file contains invalid TOML syntax
/// - The content doesn't match the expected schema
///
/// # Example
///
/// ```no_run
/// use microcks_cli::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("~/.microcks-cli.toml"))?;
/// println!("Server: {:?}", config.microcks.url);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = Path::new(&expanded);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Loads the defaults from a TOML string.
///
/// # Example
///
/// ```
/// use microcks_cli::config::load_config_str;
///
/// let config = load_config_str(r#"
///     [keycloak]
///     client_id = "microcks-serviceaccount"
///     client_secret = "secret"
/// "#)?;
///
/// assert_eq!(config.keycloak.client_id.as_deref(), Some("microcks-serviceaccount"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    Ok(config)
}
