//! Batch documentation: one text file per routed method.
//!
//! A method that fails to render is recorded and skipped; its siblings are
//! still written. Only I/O failures abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use protodoc_core::index::{local_name, ServiceDescriptor};
use protodoc_core::{RpcSections, SchemaIndex};

#[derive(Debug, Default)]
pub struct DocReport {
    pub written: Vec<PathBuf>,
    /// Method symbol and error message of every method that did not render.
    pub failed: Vec<(String, String)>,
    /// Methods without route metadata.
    pub unrouted: Vec<String>,
}

/// Route documentation followed by the request/response/related types.
pub fn method_page(schema: &SchemaIndex, method: &str) -> protodoc_core::Result<String> {
    let route = schema.render_route_doc(method)?;
    let types = schema.render_rpc(method, RpcSections::all())?;
    Ok(format!("{route}\n{types}"))
}

/// Services named in `filter` (in that order), or every service.
pub fn select_services<'a>(
    schema: &'a SchemaIndex,
    filter: Option<&[String]>,
) -> Result<Vec<&'a ServiceDescriptor>> {
    match filter {
        None => Ok(schema.descriptors().services().collect()),
        Some(names) => names
            .iter()
            .map(|name| {
                let symbol = qualify(name);
                schema
                    .descriptors()
                    .service(&symbol)
                    .with_context(|| format!("unknown service {symbol}"))
            })
            .collect(),
    }
}

pub fn write_service(
    schema: &SchemaIndex,
    service: &ServiceDescriptor,
    out_dir: &Path,
    report: &mut DocReport,
) -> Result<()> {
    let dir = out_dir.join(&service.name);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    for method in &service.methods {
        match schema.route(method) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(method = %method, "no route, skipping");
                report.unrouted.push(method.clone());
                continue;
            }
            Err(err) => {
                record_failure(report, method, &err);
                continue;
            }
        }

        match method_page(schema, method) {
            Ok(text) => {
                let path = dir.join(format!("{}.txt", local_name(method)));
                fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                report.written.push(path);
            }
            Err(err) => record_failure(report, method, &err),
        }
    }
    Ok(())
}

fn record_failure(report: &mut DocReport, method: &str, err: &protodoc_core::ProtoDocError) {
    tracing::warn!(method = %method, error = %err, "failed to render method documentation");
    report.failed.push((method.to_string(), err.to_string()));
}

/// Accept symbols with or without the leading dot.
pub fn qualify(symbol: &str) -> String {
    if symbol.starts_with('.') {
        symbol.to_string()
    } else {
        format!(".{symbol}")
    }
}
