//! Full CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every data
//! provider operation over real HTTP with the `ureq` transport.

use std::net::SocketAddr;

use mock_server::{ListShape, Settings};
use registro_core::{
    ApiError, ApiKey, DataProvider, EnvelopeKind, ListParams, ProviderConfig, Record, Registro,
};
use serde_json::{json, Value};
use url::Url;

/// Start a mock server on a random port in a background thread.
fn spawn_server(settings: Settings) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, settings).await
        })
        .unwrap();
    });

    addr
}

fn config_for(addr: SocketAddr) -> ProviderConfig {
    ProviderConfig::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        ApiKey::new("aluno"),
    )
}

fn record(value: Value) -> Record {
    Record::try_from(value).unwrap()
}

#[test]
fn crud_lifecycle() {
    let addr = spawn_server(Settings::default());
    let provider = DataProvider::from_config(&config_for(addr));
    let none = ListParams::default();

    // Step 1: list: should be empty.
    let listed = provider.list("registros", &none).unwrap();
    assert!(listed.data.is_empty(), "expected empty list");
    assert_eq!(listed.total, 0);

    // Step 2: create two records; the backend echoes only the id.
    let loja = record(json!({"subdominio": "loja", "endereco_ip": "10.0.0.1"}));
    let created = provider.create("registros", loja.clone()).unwrap();
    assert!(created.is_superset_of(&loja));
    let loja_id = created.id().unwrap();

    let blog = record(json!({"id": "b2", "subdominio": "blog", "endereco_ip": "10.0.0.2"}));
    let created = provider.create("registros", blog.clone()).unwrap();
    assert_eq!(created.id().as_deref(), Some("b2"));

    // Step 3: get: backend record is a superset of what was submitted.
    let fetched = provider.get_one("registros", &loja_id).unwrap();
    assert!(fetched.is_superset_of(&loja));
    assert!(fetched.get("data_criacao").is_some());

    // Step 4: update the IP; subdomain stays.
    let data = record(json!({"subdominio": "loja", "endereco_ip": "10.0.0.9"}));
    let updated = provider.update("registros", &loja_id, data.clone()).unwrap();
    assert!(updated.is_superset_of(&data));
    let fetched = provider.get_one("registros", &loja_id).unwrap();
    assert!(fetched.is_superset_of(&data));

    // Step 5: list: both, in insertion order.
    let listed = provider.list("registros", &none).unwrap();
    assert_eq!(listed.total, 2);
    let ids: Vec<_> = listed.data.iter().filter_map(Record::id).collect();
    assert_eq!(ids, vec![loja_id.clone(), "b2".to_string()]);

    // Step 6: get_many and get_many_reference filter client-side.
    let many = provider
        .get_many("registros", &["b2".to_string(), "zz".to_string()])
        .unwrap();
    assert_eq!(many.len(), 1);
    let refs = provider
        .get_many_reference("registros", "subdominio", &json!("loja"), &none)
        .unwrap();
    assert_eq!(refs.total, 1);
    assert_eq!(refs.data[0].id(), Some(loja_id.clone()));

    // Step 7: delete one.
    let deleted = provider.delete("registros", &loja_id).unwrap();
    assert_eq!(deleted.id(), Some(loja_id.clone()));

    // Step 8: get after delete: NotFound.
    let err = provider.get_one("registros", &loja_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(err.status(), Some(404));

    // Step 9: delete again: NotFound.
    let err = provider.delete("registros", &loja_id).unwrap_err();
    assert!(err.is_not_found());

    // Step 10: bulk delete the rest.
    let deleted = provider.delete_many("registros", &["b2".to_string()]).unwrap();
    assert_eq!(deleted, vec!["b2"]);

    // Step 11: list: empty again.
    let listed = provider.list("registros", &none).unwrap();
    assert!(listed.data.is_empty(), "expected empty list after delete");
}

#[test]
fn bare_envelope_deployment() {
    let addr = spawn_server(Settings {
        shape: ListShape::Bare,
        ..Settings::default()
    });
    let mut config = config_for(addr);
    config.envelope = EnvelopeKind::Bare;
    let provider = DataProvider::from_config(&config);

    let registro = Registro::new("loja", "192.0.2.10".parse().unwrap());
    provider.create("registros", registro.into()).unwrap();

    let listed = provider.list("registros", &ListParams::default()).unwrap();
    assert_eq!(listed.total, 1);
    let typed = Registro::try_from(listed.data[0].clone()).unwrap();
    assert_eq!(typed.subdominio, "loja");
    assert!(typed.data_criacao.is_some());
}

#[test]
fn envelope_mismatch_is_malformed() {
    let addr = spawn_server(Settings::default());
    let mut config = config_for(addr);
    config.envelope = EnvelopeKind::Bare;
    let provider = DataProvider::from_config(&config);

    let err = provider.list("registros", &ListParams::default()).unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[test]
fn wrong_api_key_is_http_401() {
    let addr = spawn_server(Settings::default());
    let mut config = config_for(addr);
    config.api_key = ApiKey::new("errada");
    let provider = DataProvider::from_config(&config);

    let err = provider.list("registros", &ListParams::default()).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 401, .. }));
}

#[test]
fn bulk_delete_failure_deletes_nothing() {
    let addr = spawn_server(Settings::default());
    let provider = DataProvider::from_config(&config_for(addr));

    provider
        .create(
            "registros",
            record(json!({"id": "a1", "subdominio": "loja", "endereco_ip": "10.0.0.1"})),
        )
        .unwrap();

    let err = provider
        .delete_many("registros", &["a1".to_string(), "zz".to_string()])
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(provider.list("registros", &ListParams::default()).unwrap().total, 1);
}

#[test]
fn zone_info() {
    let addr = spawn_server(Settings::default());
    let provider = DataProvider::from_config(&config_for(addr));

    let info = provider.info().unwrap();
    assert_eq!(info.zona_id, "Z0000000EXAMPLE");
    assert_eq!(info.ttl, 300);
    assert_eq!(info.nameservers[0], "ns-1.awsdns-01.org");
}
