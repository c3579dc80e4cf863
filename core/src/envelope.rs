//! List envelope strategies.
//!
//! Backends disagree on how a collection comes back: some return a bare JSON
//! array, others nest it under a named key next to unrelated metadata. One
//! `Envelope` is chosen per deployment and every list-like operation goes
//! through `Envelope::open`.

use serde_json::Value;

use crate::error::ApiError;
use crate::types::{kind_of, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// `[{...}, {...}]`
    Bare,
    /// `{"<key>": [{...}, {...}], ...}`
    Nested { key: String },
    /// Either of the above.
    Auto { key: String },
}

impl Envelope {
    /// Extract the records from a list response body.
    pub fn open(&self, body: Value) -> Result<Vec<Record>, ApiError> {
        let items = match (self, body) {
            (Envelope::Bare | Envelope::Auto { .. }, Value::Array(items)) => items,
            (Envelope::Nested { key } | Envelope::Auto { key }, Value::Object(mut map)) => {
                match map.remove(key.as_str()) {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(ApiError::MalformedResponse(format!(
                            "expected an array under \"{key}\", got {}",
                            kind_of(&other)
                        )))
                    }
                    None => {
                        return Err(ApiError::MalformedResponse(format!(
                            "response has no \"{key}\" key"
                        )))
                    }
                }
            }
            (envelope, other) => {
                return Err(ApiError::MalformedResponse(format!(
                    "{} envelope cannot hold {}",
                    envelope.name(),
                    kind_of(&other)
                )))
            }
        };

        items.into_iter().map(Record::try_from).collect()
    }

    fn name(&self) -> &'static str {
        match self {
            Envelope::Bare => "bare",
            Envelope::Nested { .. } => "nested",
            Envelope::Auto { .. } => "auto",
        }
    }
}
