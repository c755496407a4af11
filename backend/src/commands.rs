//! Subcommand execution.
//!
//! Results are written to `out` as JSON lines, one row per line.

use crate::args::{Command, SelectArgs};
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use widecol_commons::Row;
use widecol_configs::StoreSettings;
use widecol_core::{RowUpdates, SelectRequest, WideColumnConnector};
use widecol_store::{PrefixFilter, Projection, TableDescriptor};

/// Runs one subcommand against the connector.
pub fn run<W: Write>(
    command: Command,
    connector: &WideColumnConnector,
    settings: &StoreSettings,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::CreateTable {
            table,
            families,
            max_versions,
        } => {
            let descriptor = families.into_iter().fold(
                TableDescriptor::new(table)
                    .with_max_versions(max_versions.unwrap_or(settings.default_max_versions)),
                TableDescriptor::with_family,
            );
            connector
                .client()
                .create_table(&descriptor)
                .with_context(|| format!("Failed to create table {}", descriptor.name()))?;
        }
        Command::Scan { table } => {
            let rows = connector.scan_table(&table)?;
            write_rows(out, &rows)?;
        }
        Command::Select(args) => {
            let rows = connector.select(&select_request(args))?;
            write_rows(out, &rows)?;
        }
        Command::Upsert {
            table,
            family,
            payload,
        } => {
            let updates = read_payload(payload.as_deref())?;
            connector.upsert(&table, &family, &updates)?;
        }
    }
    Ok(())
}

/// Builds the selection described by `select` arguments.
pub fn select_request(args: SelectArgs) -> SelectRequest {
    let mut request = SelectRequest::new(args.table)
        .with_limit(args.limit)
        .reversed(args.reversed);

    if let Some(start_key) = args.start_key {
        request = request.with_start_key(start_key);
    }
    if let Some(prefix) = args.prefix {
        request = request.with_predicate(Arc::new(PrefixFilter::new(prefix)));
    }
    if !args.columns.is_empty() {
        let mut projection = Projection::new();
        for column in args.columns {
            match column.qualifier {
                Some(qualifier) => projection.add_column(column.family, qualifier),
                None => projection.add_family(column.family),
            };
        }
        request = request.with_projection(projection);
    }
    request
}

fn read_payload(path: Option<&Path>) -> Result<RowUpdates> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_payload(&content)
}

/// Parses `{"row": {"qualifier": "value" | null}}`.
pub fn parse_payload(content: &str) -> Result<RowUpdates> {
    serde_json::from_str(content).context("Invalid upsert payload")
}

fn write_rows<W: Write>(out: &mut W, rows: &[Row]) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
