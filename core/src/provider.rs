//! Generic CRUD operations over the registry backend.
//!
//! # Design
//! The backend does not follow a standard REST listing convention: lists
//! come back in a deployment-specific envelope, there is no `Content-Range`
//! and there are no filter or bulk-lookup endpoints. Every list-like
//! operation therefore fetches the full collection once, opens it with the
//! configured `Envelope`, and filters in memory.
//!
//! That makes `get_many` and `get_many_reference` O(n) in the size of the
//! collection, which is fine for an admin console over a single zone and
//! is the ceiling to revisit if the backend ever grows query endpoints.
//!
//! The provider keeps no state between calls; each operation is a fresh
//! round trip.

use std::collections::HashSet;

use serde_json::{json, Value};
use url::Url;

use crate::client::{HttpClient, RequestOptions};
use crate::config::ProviderConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport, UreqTransport};
use crate::types::{kind_of, value_as_id, ListParams, ListResult, Record, ZoneInfo};

const INFO_PATH: &str = "info";

pub struct DataProvider<T> {
    http: HttpClient<T>,
    base_url: Url,
    envelope: Envelope,
    id_field: String,
    trust_create_echo: bool,
}

impl DataProvider<UreqTransport> {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::with_transport(UreqTransport::new(), config)
    }
}

impl<T: Transport> DataProvider<T> {
    pub fn with_transport(transport: T, config: &ProviderConfig) -> Self {
        Self {
            http: HttpClient::new(transport, config.api_key.clone()),
            base_url: config.api_url.clone(),
            envelope: config.envelope(),
            id_field: config.id_field.clone(),
            trust_create_echo: config.trust_create_echo,
        }
    }

    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    /// All records of `resource` plus their count.
    ///
    /// `params` is accepted but not forwarded: the backend cannot page, sort
    /// or filter, so `total` is always the size of the whole collection.
    pub fn list(&self, resource: &str, params: &ListParams) -> Result<ListResult, ApiError> {
        if !params.is_empty() {
            tracing::debug!(
                resource,
                ?params,
                "backend does not support pagination, sorting or filtering; ignoring parameters"
            );
        }
        let records = self.fetch_all(resource)?;
        tracing::debug!(resource, total = records.len(), "listed records");
        Ok(ListResult::new(records))
    }

    pub fn get_one(&self, resource: &str, id: &str) -> Result<Record, ApiError> {
        let url = self.item_url(resource, id)?;
        let response = self.http.request(url, RequestOptions::get())?;
        let record = Record::try_from(response.json)?;
        Ok(self.normalize_with_id(record, id))
    }

    /// Create a record and return the submitted payload with the
    /// backend-assigned `id` merged in.
    ///
    /// When the response carries no id, the payload's own identifier field is
    /// used. With `trust_create_echo` the response itself is the record.
    pub fn create(&self, resource: &str, data: Record) -> Result<Record, ApiError> {
        let url = self.url(&[resource])?;
        let options = RequestOptions::with_method(HttpMethod::Post).body(Value::from(data.clone()));
        let response = self.http.request(url, options)?;

        if self.trust_create_echo {
            let record = Record::try_from(response.json)?;
            return Ok(self.normalize(record));
        }

        let assigned = [DEFAULT_ID, self.id_field.as_str()]
            .iter()
            .filter_map(|field| response.json.get(field))
            .find(|value| value_as_id(value).is_some())
            .cloned();

        let mut record = data;
        let id = match assigned {
            Some(id) => id,
            None => record
                .get(&self.id_field)
                .filter(|value| value_as_id(value).is_some())
                .cloned()
                .ok_or_else(|| {
                    ApiError::MalformedResponse(format!(
                        "create response carries no \"{}\" and the payload has none",
                        self.id_field
                    ))
                })?,
        };
        record.insert(DEFAULT_ID, id);

        tracing::debug!(resource, id = ?record.id(), "created record");
        Ok(record)
    }

    /// Replace a record. The caller supplies every field the backend requires.
    pub fn update(&self, resource: &str, id: &str, data: Record) -> Result<Record, ApiError> {
        let url = self.item_url(resource, id)?;
        let options = RequestOptions::with_method(HttpMethod::Put).body(Value::from(data.clone()));
        let response = self.http.request(url, options)?;

        let record = match response.json {
            Value::Null => data,
            other => Record::try_from(other)?,
        };
        tracing::debug!(resource, id, "updated record");
        Ok(self.normalize_with_id(record, id))
    }

    /// Delete one record. Returns the backend's echo of it, or just `{id}`
    /// when the backend does not echo an object.
    pub fn delete(&self, resource: &str, id: &str) -> Result<Record, ApiError> {
        let url = self.item_url(resource, id)?;
        let response = self
            .http
            .request(url, RequestOptions::with_method(HttpMethod::Delete))?;

        let record = Record::try_from(response.json).unwrap_or_default();
        tracing::debug!(resource, id, "deleted record");
        Ok(self.normalize_with_id(record, id))
    }

    /// Delete several records in one request. The backend decides whether the
    /// batch succeeds; there is no partial result.
    pub fn delete_many(&self, resource: &str, ids: &[String]) -> Result<Vec<String>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url(&[resource])?;
        let options = RequestOptions::with_method(HttpMethod::Delete).body(json!({ "ids": ids }));
        let response = self.http.request(url, options)?;

        let deleted = match response.json {
            Value::Null => ids.to_vec(),
            Value::Array(items) => ids_from(items)?,
            Value::Object(mut map) => match map.remove("ids") {
                Some(Value::Array(items)) => ids_from(items)?,
                _ => {
                    return Err(ApiError::MalformedResponse(
                        "bulk delete response has no \"ids\" array".to_string(),
                    ))
                }
            },
            other => {
                return Err(ApiError::MalformedResponse(format!(
                    "bulk delete response is {}",
                    kind_of(&other)
                )))
            }
        };
        tracing::debug!(resource, deleted = deleted.len(), "deleted records");
        Ok(deleted)
    }

    /// Records whose id is in `ids`, in collection order. O(n).
    pub fn get_many(&self, resource: &str, ids: &[String]) -> Result<Vec<Record>, ApiError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let records = self
            .fetch_all(resource)?
            .into_iter()
            .filter(|record| record.id().is_some_and(|id| wanted.contains(id.as_str())))
            .collect();
        Ok(records)
    }

    /// Records where `record[target] == id`, compared as JSON values. O(n).
    pub fn get_many_reference(
        &self,
        resource: &str,
        target: &str,
        id: &Value,
        params: &ListParams,
    ) -> Result<ListResult, ApiError> {
        if !params.is_empty() {
            tracing::debug!(resource, ?params, "ignoring list parameters for reference lookup");
        }
        let records = self
            .fetch_all(resource)?
            .into_iter()
            .filter(|record| record.get(target) == Some(id))
            .collect();
        Ok(ListResult::new(records))
    }

    /// Zone metadata from `GET {base}/info`.
    pub fn info(&self) -> Result<ZoneInfo, ApiError> {
        let url = self.url(&[INFO_PATH])?;
        let response = self.http.request(url, RequestOptions::get())?;
        serde_json::from_value(response.json)
            .map_err(|e| ApiError::MalformedResponse(format!("invalid zone info: {e}")))
    }

    fn fetch_all(&self, resource: &str) -> Result<Vec<Record>, ApiError> {
        let url = self.url(&[resource])?;
        let response = self.http.request(url, RequestOptions::get())?;
        let records = self.envelope.open(response.json)?;
        Ok(records.into_iter().map(|r| self.normalize(r)).collect())
    }

    /// `{base}/{resource}/{id}`. Ids that would collapse into the collection
    /// path (empty, `.` or `..`) are refused before any request is built.
    fn item_url(&self, resource: &str, id: &str) -> Result<Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidUrl(format!(
                "{id:?} cannot address a record in {resource}"
            )));
        }
        self.url(&[resource, id])
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make sure `id` is populated from the configured identifier field.
    fn normalize(&self, mut record: Record) -> Record {
        if self.id_field != DEFAULT_ID && !record.contains(DEFAULT_ID) {
            if let Some(value) = record.get(&self.id_field).cloned() {
                record.insert(DEFAULT_ID, value);
            }
        }
        record
    }

    fn normalize_with_id(&self, record: Record, id: &str) -> Record {
        let mut record = self.normalize(record);
        if !record.contains(DEFAULT_ID) {
            record.insert(DEFAULT_ID, id);
        }
        record
    }
}

const DEFAULT_ID: &str = "id";

fn ids_from(items: Vec<Value>) -> Result<Vec<String>, ApiError> {
    items
        .iter()
        .map(|item| {
            value_as_id(item).ok_or_else(|| {
                ApiError::MalformedResponse(format!("expected an id, got {}", kind_of(item)))
            })
        })
        .collect()
}
