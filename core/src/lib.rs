//! Data-access client for a DNS subdomain registry REST API.
//!
//! # Overview
//! `DataProvider` exposes the generic CRUD contract an admin console needs
//! (list, get-one, create, update, delete, delete-many, get-many,
//! get-many-reference) and translates it into calls against a backend whose
//! JSON shape does not follow a standard REST listing convention.
//!
//! # Design
//! - `HttpClient` builds plain-data requests, injects `Accept` and
//!   `X-API-Key`, and maps responses to `ApiError`.
//! - A `Transport` executes requests; `UreqTransport` is the blocking
//!   production implementation and tests substitute in-memory ones.
//! - `Envelope` is the single place that knows how a list response is
//!   wrapped. It is chosen once per deployment via `ProviderConfig`.
//! - Records are untyped JSON objects (`Record`); `Registro` is the typed
//!   view for callers that know the schema.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod provider;
pub mod types;

pub use client::{HttpClient, JsonResponse, RequestOptions, API_KEY_HEADER};
pub use config::{ApiKey, EnvelopeKind, ProviderConfig};
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use provider::DataProvider;
pub use types::{
    ListParams, ListResult, Pagination, Record, Registro, Sort, SortOrder, ZoneInfo,
};
