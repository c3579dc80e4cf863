//! JSON HTTP wrapper with API-key injection.
//!
//! # Design
//! `HttpClient` owns a `Transport` and the API key, nothing else. A call is
//! split into a pure `build_request` (headers, body encoding), the
//! transport round-trip, and a pure `parse_response` (status mapping, JSON
//! decoding). The key is injected at construction and never re-read.

use serde_json::Value;
use url::Url;

use crate::config::ApiKey;
use crate::error::ApiError;
use crate::http::{find_header, HttpMethod, HttpRequest, HttpResponse, Transport};

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const ACCEPT_HEADER: &str = "Accept";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Per-call options. Everything defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successful response with its body decoded.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub json: Value,
}

impl JsonResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

pub struct HttpClient<T> {
    transport: T,
    api_key: ApiKey,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T, api_key: ApiKey) -> Self {
        Self { transport, api_key }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one JSON request. Non-2xx statuses become errors.
    pub fn request(&self, url: Url, options: RequestOptions) -> Result<JsonResponse, ApiError> {
        let request = build_request(url, options, &self.api_key)?;
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.execute(&request).inspect_err(|err| {
            tracing::debug!(method = %request.method, url = %request.url, error = %err, "request failed");
        })?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );

        parse_response(response)
    }
}

/// Assemble the outgoing request: JSON body, `Accept`, `Content-Type` and
/// the API key header.
pub fn build_request(
    url: Url,
    options: RequestOptions,
    api_key: &ApiKey,
) -> Result<HttpRequest, ApiError> {
    let RequestOptions {
        method,
        body,
        mut headers,
    } = options;

    if find_header(&headers, ACCEPT_HEADER).is_none() {
        headers.push((ACCEPT_HEADER.to_string(), JSON_MEDIA_TYPE.to_string()));
    }

    headers.retain(|(name, _)| !name.eq_ignore_ascii_case(API_KEY_HEADER));
    headers.push((API_KEY_HEADER.to_string(), api_key.expose().to_string()));

    let body = match body {
        Some(value) => {
            if find_header(&headers, CONTENT_TYPE_HEADER).is_none() {
                headers.push((CONTENT_TYPE_HEADER.to_string(), JSON_MEDIA_TYPE.to_string()));
            }
            Some(
                serde_json::to_string(&value)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?,
            )
        }
        None => None,
    };

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Map the status and decode the body. An empty body decodes as `null`.
pub fn parse_response(response: HttpResponse) -> Result<JsonResponse, ApiError> {
    check_status(&response)?;

    let json = if response.body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::MalformedResponse(format!("body is not JSON: {e}")))?
    };

    Ok(JsonResponse {
        status: response.status,
        headers: response.headers,
        json,
    })
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
