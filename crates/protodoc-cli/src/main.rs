//! protodoc CLI
//!
//! Renders API documentation from a serialized Protobuf descriptor set:
//! - single messages, enums and methods as text declarations
//! - HTTP route pages and the path/query/body split of request fields
//! - type closures of arbitrary root messages
//! - one documentation file per routed method of a service (or of all of them)

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use protodoc_core::index::{FieldDescriptor, ServiceDescriptor};
use protodoc_core::{DocConfig, RouteSpec, RpcSections, SchemaIndex, Want};
use serde::Serialize;

mod docs;
mod logging;

use docs::{qualify, DocReport};

#[derive(Parser)]
#[command(name = "protodoc")]
#[command(author, version, about = "protodoc: API documentation from Protobuf descriptor sets")]
struct Cli {
    /// JSON configuration file (every field optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Serialized `FileDescriptorSet`; overrides the configured path.
    #[arg(long, global = true)]
    descriptor_set: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a message as an interface declaration.
    Message {
        symbol: String,
        /// Field (json name) to leave out; repeatable.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Render an enum declaration.
    Enum { symbol: String },

    /// Render the request, response and related types of a method.
    ///
    /// Without section flags every section is rendered.
    Rpc {
        method: String,
        #[arg(long)]
        input: bool,
        #[arg(long)]
        output: bool,
        #[arg(long)]
        related: bool,
    },

    /// Show the HTTP route of a method.
    Route {
        method: String,
        /// Print the route and field partition as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the types reachable from one or more root messages.
    Closure {
        #[arg(required = true)]
        roots: Vec<String>,
        /// List enums instead of messages.
        #[arg(long)]
        enums: bool,
        /// Symbol to leave out (and not expand); repeatable.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Write one documentation file per routed method of a service.
    Service {
        service: String,
        /// Output directory; overrides the configured one.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write documentation for every configured service.
    All {
        /// Output directory; overrides the configured one.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.descriptor_set {
        config.descriptor_set = path;
    }
    let schema = load_schema(&config)?;

    match cli.command {
        Commands::Message { symbol, exclude } => {
            print!("{}", schema.render_message(&qualify(&symbol), &exclude)?);
        }
        Commands::Enum { symbol } => {
            print!("{}", schema.render_enum(&qualify(&symbol))?);
        }
        Commands::Rpc {
            method,
            input,
            output,
            related,
        } => {
            let sections = if input || output || related {
                RpcSections {
                    input,
                    output,
                    related,
                }
            } else {
                RpcSections::all()
            };
            print!("{}", schema.render_rpc(&qualify(&method), sections)?);
        }
        Commands::Route { method, json } => cmd_route(&schema, &qualify(&method), json)?,
        Commands::Closure {
            roots,
            enums,
            exclude,
        } => {
            let roots: Vec<String> = roots.iter().map(|r| qualify(r)).collect();
            let excluded: BTreeSet<String> = exclude.iter().map(|s| qualify(s)).collect();
            let want = if enums { Want::Enums } else { Want::Messages };
            for symbol in schema.closure(&roots, &excluded, want)? {
                println!("{symbol}");
            }
        }
        Commands::Service { service, out } => {
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            let services = docs::select_services(&schema, Some(std::slice::from_ref(&service)))?;
            write_docs(&schema, &services, &out_dir)?;
        }
        Commands::All { out } => {
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            let services = docs::select_services(&schema, config.services.as_deref())?;
            write_docs(&schema, &services, &out_dir)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DocConfig> {
    let Some(path) = path else {
        return Ok(DocConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))
}

fn load_schema(config: &DocConfig) -> Result<SchemaIndex> {
    let path = &config.descriptor_set;
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read descriptor set: {}", path.display()))?;
    let schema = SchemaIndex::build_with_options(&bytes, config.render_options())
        .with_context(|| format!("failed to index descriptor set: {}", path.display()))?;

    let skipped = schema.skipped_locations().len();
    if skipped > 0 {
        tracing::warn!(skipped, "some comments were dropped (malformed source paths)");
    }
    Ok(schema)
}

#[derive(Serialize)]
struct RouteReport<'a> {
    method: &'a str,
    route: RouteSpec,
    path: Vec<&'a str>,
    query: Vec<&'a str>,
    body: Vec<&'a str>,
}

fn cmd_route(schema: &SchemaIndex, method: &str, json: bool) -> Result<()> {
    if !json {
        print!("{}", schema.render_route_doc(method)?);
        return Ok(());
    }

    let Some(route) = schema.route(method)? else {
        println!("null");
        return Ok(());
    };
    let partition = schema
        .partition_fields(method)?
        .ok_or_else(|| anyhow!("{method} has a route but no field partition"))?;
    let report = RouteReport {
        method,
        route,
        path: json_names(&partition.path),
        query: json_names(&partition.query),
        body: json_names(&partition.body),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn json_names<'a>(fields: &[&'a FieldDescriptor]) -> Vec<&'a str> {
    fields.iter().map(|f| f.json_name.as_str()).collect()
}

fn write_docs(schema: &SchemaIndex, services: &[&ServiceDescriptor], out_dir: &Path) -> Result<()> {
    let mut report = DocReport::default();
    for service in services {
        eprintln!("{} {}", "Documenting".green().bold(), service.symbol);
        docs::write_service(schema, service, out_dir, &mut report)?;
    }

    for path in &report.written {
        eprintln!("  {} {}", "→".cyan(), path.display());
    }
    eprintln!(
        "{} {} file(s), {} method(s) without route",
        "wrote".green().bold(),
        report.written.len(),
        report.unrouted.len()
    );

    if report.failed.is_empty() {
        return Ok(());
    }
    for (method, error) in &report.failed {
        eprintln!("  {} {method}: {error}", "failed".red().bold());
    }
    Err(anyhow!("{} method(s) failed to render", report.failed.len()))
}
