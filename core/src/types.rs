//! Domain types for the registry API.
//!
//! # Design
//! The data provider works on `Record`, an untyped JSON object, because the
//! generic operations (reference filtering in particular) address fields by
//! name at runtime. `Registro` is the typed view of a DNS registration for
//! callers that know the schema; conversion goes through serde in both
//! directions.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// One record as returned by the backend: a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The record's `id` rendered as a string. Numeric ids are accepted.
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(value_as_id)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// True if every field of `other` is present here with an equal value.
    pub fn is_superset_of(&self, other: &Record) -> bool {
        other
            .0
            .iter()
            .all(|(field, value)| self.0.get(field) == Some(value))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ApiError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Render an id value the way it appears in URLs.
pub(crate) fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A DNS registration: subdomain label pointing at an IP address.
///
/// `id` and `data_criacao` are assigned by the backend and are omitted when
/// serializing a new registration that does not carry them yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registro {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "alias")]
    pub subdominio: String,
    pub endereco_ip: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<String>,
}

impl Registro {
    pub fn new(subdominio: impl Into<String>, endereco_ip: IpAddr) -> Self {
        Self {
            id: None,
            subdominio: subdominio.into(),
            endereco_ip,
            data_criacao: None,
        }
    }
}

impl TryFrom<Record> for Registro {
    type Error = ApiError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        serde_json::from_value(Value::from(record))
            .map_err(|e| ApiError::MalformedResponse(format!("invalid registro: {e}")))
    }
}

impl From<Registro> for Record {
    fn from(registro: Registro) -> Self {
        let mut record = Record::new();
        if let Some(id) = registro.id {
            record.insert("id", id);
        }
        record.insert("subdominio", registro.subdominio);
        record.insert("endereco_ip", registro.endereco_ip.to_string());
        if let Some(data_criacao) = registro.data_criacao {
            record.insert("data_criacao", data_criacao);
        }
        record
    }
}

/// Read-only metadata about the hosted zone, served by `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub nameservers: Vec<String>,
    pub zona_id: String,
    pub ttl: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// Parameters accepted by list-like operations.
///
/// The backend has no pagination, sorting or filtering, so these are
/// accepted for contract compatibility and not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub filter: Map<String, Value>,
}

impl ListParams {
    pub fn is_empty(&self) -> bool {
        self.pagination.is_none() && self.sort.is_none() && self.filter.is_empty()
    }
}

/// Records plus the size of the full result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListResult {
    pub data: Vec<Record>,
    pub total: usize,
}

impl ListResult {
    pub fn new(data: Vec<Record>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}
