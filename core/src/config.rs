//! Deployment settings for the data provider.
//!
//! These are plain values; loading them from the environment is the
//! binary's job. Everything the provider needs to know about a particular
//! backend lives here and is fixed at construction time.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::envelope::Envelope;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_API_KEY: &str = "aluno";
pub const DEFAULT_RESOURCE: &str = "registros";
pub const DEFAULT_ENVELOPE_KEY: &str = "registros";
pub const DEFAULT_ID_FIELD: &str = "id";

/// The static key sent as `X-API-Key`. Never printed in full.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Default for ApiKey {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY)
    }
}

/// Which list envelope the backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Bare,
    #[default]
    Nested,
    Auto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_url: Url,
    #[serde(default)]
    pub api_key: ApiKey,
    #[serde(default = "default_resource")]
    pub resource: String,
    #[serde(default)]
    pub envelope: EnvelopeKind,
    #[serde(default = "default_envelope_key")]
    pub envelope_key: String,
    /// Field holding each record's identifier. Copied into `id` when it is
    /// something else.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Return the backend's create response as the record instead of
    /// merging its `id` into the submitted payload.
    #[serde(default)]
    pub trust_create_echo: bool,
}

fn default_resource() -> String {
    DEFAULT_RESOURCE.to_string()
}

fn default_envelope_key() -> String {
    DEFAULT_ENVELOPE_KEY.to_string()
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

impl ProviderConfig {
    pub fn new(api_url: Url, api_key: ApiKey) -> Self {
        Self {
            api_url,
            api_key,
            resource: default_resource(),
            envelope: EnvelopeKind::default(),
            envelope_key: default_envelope_key(),
            id_field: default_id_field(),
            trust_create_echo: false,
        }
    }

    pub fn envelope(&self) -> Envelope {
        match self.envelope {
            EnvelopeKind::Bare => Envelope::Bare,
            EnvelopeKind::Nested => Envelope::Nested {
                key: self.envelope_key.clone(),
            },
            EnvelopeKind::Auto => Envelope::Auto {
                key: self.envelope_key.clone(),
            },
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let api_url = Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL");
        Self::new(api_url, ApiKey::default())
    }
}
