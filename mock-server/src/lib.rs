//! In-memory stand-in for the DNS registry backend.
//!
//! Serves the same REST surface as the real service: `registros` CRUD, bulk
//! delete, `/info`, and an `X-API-Key` check on every route. The list shape
//! is selectable so both envelope variants can be exercised.

use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Registro {
    pub id: String,
    pub subdominio: String,
    pub endereco_ip: String,
    pub data_criacao: String,
}

#[derive(Deserialize)]
pub struct CreateRegistro {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "alias")]
    pub subdominio: String,
    pub endereco_ip: String,
}

#[derive(Deserialize)]
pub struct UpdateRegistro {
    #[serde(default, alias = "alias")]
    pub subdominio: Option<String>,
    pub endereco_ip: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDelete {
    pub ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZoneInfo {
    pub nameservers: Vec<String>,
    pub zona_id: String,
    pub ttl: u32,
}

/// How `GET /registros` wraps its records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListShape {
    /// `{"registros": [...], "nameservers": [...], "zona_id": "..."}`
    #[default]
    Nested,
    /// `[...]` with a `Content-Range` header.
    Bare,
}

impl FromStr for ListShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nested" => Ok(ListShape::Nested),
            "bare" => Ok(ListShape::Bare),
            other => Err(format!("unknown list shape: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: String,
    pub shape: ListShape,
    pub zone: ZoneInfo,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: "aluno".to_string(),
            shape: ListShape::default(),
            zone: ZoneInfo {
                nameservers: vec![
                    "ns-1.awsdns-01.org".to_string(),
                    "ns-2.awsdns-02.net".to_string(),
                ],
                zona_id: "Z0000000EXAMPLE".to_string(),
                ttl: 300,
            },
        }
    }
}

struct AppState {
    settings: Settings,
    db: RwLock<Vec<Registro>>,
}

type SharedState = Arc<AppState>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (status, Json(json!({ "error": message.into() })))
}

pub fn app() -> Router {
    app_with(Settings::default())
}

pub fn app_with(settings: Settings) -> Router {
    let state: SharedState = Arc::new(AppState {
        settings,
        db: RwLock::new(Vec::new()),
    });
    Router::new()
        .route("/info", get(info))
        .route(
            "/registros",
            get(list_registros).post(create_registro).delete(delete_many),
        )
        .route(
            "/registros/{id}",
            get(get_registro).put(update_registro).delete(delete_registro),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Settings::default()).await
}

pub async fn run_with(listener: TcpListener, settings: Settings) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(settings)).await
}

async fn require_api_key(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == state.settings.api_key);

    if !authorized {
        tracing::warn!(path = request.uri().path(), "rejected request with invalid api key");
        return failure(StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    next.run(request).await
}

fn validate_ip(endereco_ip: &str) -> Result<(), Failure> {
    endereco_ip
        .parse::<std::net::IpAddr>()
        .map(|_| ())
        .map_err(|_| {
            failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("invalid ip address: {endereco_ip}"),
            )
        })
}

async fn info(State(state): State<SharedState>) -> Json<ZoneInfo> {
    Json(state.settings.zone.clone())
}

async fn list_registros(State(state): State<SharedState>) -> Response {
    let registros = state.db.read().await.clone();
    match state.settings.shape {
        ListShape::Nested => Json(json!({
            "registros": registros,
            "nameservers": state.settings.zone.nameservers,
            "zona_id": state.settings.zone.zona_id,
        }))
        .into_response(),
        ListShape::Bare => {
            let qtd = registros.len();
            let content_range = if qtd > 0 {
                format!("registros 0-{}/{qtd}", qtd - 1)
            } else {
                "registros 0-0/0".to_string()
            };
            ([(header::CONTENT_RANGE, content_range)], Json(registros)).into_response()
        }
    }
}

async fn create_registro(
    State(state): State<SharedState>,
    Json(input): Json<CreateRegistro>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if input.subdominio.trim().is_empty() {
        return Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "subdominio is required"));
    }
    validate_ip(&input.endereco_ip)?;

    let mut db = state.db.write().await;
    let id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    if db
        .iter()
        .any(|r| r.id == id || r.subdominio == input.subdominio)
    {
        return Err(failure(
            StatusCode::CONFLICT,
            format!("record already exists: {}", input.subdominio),
        ));
    }

    db.push(Registro {
        id: id.clone(),
        subdominio: input.subdominio,
        endereco_ip: input.endereco_ip,
        data_criacao: chrono::Utc::now().to_rfc3339(),
    });
    tracing::info!(id = %id, "created registro");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "record created" })),
    ))
}

async fn get_registro(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Registro>, Failure> {
    let db = state.db.read().await;
    db.iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "record not found"))
}

async fn update_registro(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRegistro>,
) -> Result<Json<Registro>, Failure> {
    validate_ip(&input.endereco_ip)?;

    let mut db = state.db.write().await;
    let registro = db
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "record not found"))?;

    if let Some(subdominio) = input.subdominio {
        if subdominio != registro.subdominio {
            return Err(failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                "subdominio cannot be changed",
            ));
        }
    }
    registro.endereco_ip = input.endereco_ip;
    tracing::info!(id = %id, "updated registro");

    Ok(Json(registro.clone()))
}

async fn delete_registro(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Registro>, Failure> {
    let mut db = state.db.write().await;
    let index = db
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "record not found"))?;
    let removed = db.remove(index);
    tracing::info!(id = %id, "deleted registro");
    Ok(Json(removed))
}

/// All-or-nothing: if any id is unknown, nothing is deleted.
async fn delete_many(
    State(state): State<SharedState>,
    Json(input): Json<BulkDelete>,
) -> Result<Json<BulkDelete>, Failure> {
    let mut db = state.db.write().await;
    let missing: Vec<&str> = input
        .ids
        .iter()
        .filter(|id| !db.iter().any(|r| &r.id == *id))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(failure(
            StatusCode::NOT_FOUND,
            format!("records not found: {}", missing.join(", ")),
        ));
    }

    db.retain(|r| !input.ids.contains(&r.id));
    tracing::info!(count = input.ids.len(), "deleted registros");
    Ok(Json(input))
}
