use std::net::IpAddr;

use anyhow::{Context, Result};
use clap::Subcommand;
use registro_core::{DataProvider, ListParams, Record, Registro, Transport};
use serde_json::{json, Value};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every record of the resource
    List,
    /// Show one record
    Get { id: String },
    /// Register a subdomain
    Create {
        #[arg(long)]
        subdominio: String,
        #[arg(long)]
        ip: IpAddr,
        /// Client-chosen identifier, for backends that do not assign one
        #[arg(long)]
        id: Option<String>,
    },
    /// Point an existing subdomain at a new address
    Update {
        id: String,
        #[arg(long)]
        ip: IpAddr,
    },
    /// Remove one record
    Delete { id: String },
    /// Remove several records in one request
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show the records with the given ids
    GetMany {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show the records whose TARGET field equals VALUE
    Refs {
        #[arg(long)]
        target: String,
        #[arg(long)]
        value: String,
        /// Parse VALUE as JSON instead of taking it as a string
        #[arg(long)]
        json: bool,
    },
    /// Show zone nameservers, id and TTL
    Info,
    /// Check the configuration and exit
    Check,
}

fn list_output(data: Vec<Record>, total: usize) -> Value {
    json!({ "data": data, "total": total })
}

/// Run one command and return what should be printed.
pub fn run<T: Transport>(
    provider: &DataProvider<T>,
    resource: &str,
    command: Command,
) -> Result<Value> {
    let output = match command {
        Command::List => {
            let result = provider.list(resource, &ListParams::default())?;
            list_output(result.data, result.total)
        }
        Command::Get { id } => Value::from(provider.get_one(resource, &id)?),
        Command::Create { subdominio, ip, id } => {
            let mut registro = Registro::new(subdominio, ip);
            registro.id = id;
            let created = provider.create(resource, registro.into())?;
            tracing::info!(resource, id = ?created.id(), "Created record");
            Value::from(created)
        }
        Command::Update { id, ip } => {
            let mut record = provider
                .get_one(resource, &id)
                .with_context(|| format!("Failed to load {resource}/{id}"))?;
            record.insert("endereco_ip", ip.to_string());
            let updated = provider.update(resource, &id, record)?;
            tracing::info!(resource, id, %ip, "Updated record");
            Value::from(updated)
        }
        Command::Delete { id } => {
            let deleted = provider.delete(resource, &id)?;
            tracing::info!(resource, id, "Deleted record");
            Value::from(deleted)
        }
        Command::DeleteMany { ids } => {
            let deleted = provider.delete_many(resource, &ids)?;
            tracing::info!(resource, count = deleted.len(), "Deleted records");
            json!({ "data": deleted })
        }
        Command::GetMany { ids } => json!({ "data": provider.get_many(resource, &ids)? }),
        Command::Refs {
            target,
            value,
            json,
        } => {
            let value = if json {
                serde_json::from_str(&value).with_context(|| format!("{value} is not JSON"))?
            } else {
                Value::String(value)
            };
            let result =
                provider.get_many_reference(resource, &target, &value, &ListParams::default())?;
            list_output(result.data, result.total)
        }
        Command::Info => serde_json::to_value(provider.info()?)?,
        Command::Check => anyhow::bail!("check is handled before connecting"),
    };
    Ok(output)
}
