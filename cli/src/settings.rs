use std::collections::HashMap;

use anyhow::{Context, Result};
use config::{Config, Environment};
use registro_core::config::{
    DEFAULT_API_KEY, DEFAULT_API_URL, DEFAULT_ENVELOPE_KEY, DEFAULT_ID_FIELD, DEFAULT_RESOURCE,
};
use registro_core::{ApiKey, ProviderConfig};

pub const ENV_PREFIX: &str = "DNS_ADMIN";

/// Defaults overlaid with `DNS_ADMIN_*` environment variables.
pub fn load() -> Result<ProviderConfig> {
    load_from(None)
}

/// Same as `load`, reading variables from `vars` instead of the process
/// environment when given.
pub(crate) fn load_from(vars: Option<HashMap<String, String>>) -> Result<ProviderConfig> {
    let mut config: ProviderConfig = Config::builder()
        .set_default("api_url", DEFAULT_API_URL)?
        .set_default("api_key", DEFAULT_API_KEY)?
        .set_default("resource", DEFAULT_RESOURCE)?
        .set_default("envelope", "nested")?
        .set_default("envelope_key", DEFAULT_ENVELOPE_KEY)?
        .set_default("id_field", DEFAULT_ID_FIELD)?
        .set_default("trust_create_echo", false)?
        .add_source(Environment::with_prefix(ENV_PREFIX).source(vars))
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    let api_key = key_file_or_string(config.api_key.expose())?;
    config.api_key = ApiKey::new(api_key);
    Ok(config)
}

/// If the value begins with an '@', read the key from the file it names,
/// otherwise return the value.
pub(crate) fn key_file_or_string(value: &str) -> Result<String> {
    Ok(match value.strip_prefix('@') {
        Some(key_file) => std::fs::read_to_string(key_file)
            .with_context(|| format!("Failed to read API key from {key_file}"))?
            .trim()
            .to_string(),
        None => value.to_string(),
    })
}
