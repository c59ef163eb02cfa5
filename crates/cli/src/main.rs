use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kindex_core::{extract_meta, extract_versions, Document, Errors, ResourceMeta};
use kindex_registry::{Policy, Registry};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "kindexctl", version, about = "Extract resource descriptors from discovery documents")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Registration policy for documents with field errors (strict|lenient)
    #[arg(long = "policy", global = true, env = "KINDEX_POLICY", default_value = "lenient")]
    policy: Policy,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a descriptor from every document in a file and report field errors
    Extract {
        /// JSON or YAML file: one document, an APIResourceList, or an array of either
        file: PathBuf,
    },
    /// List the versions (name, served) declared by CRD-style documents
    Versions {
        file: PathBuf,
    },
    /// Register documents from one or more files and list the resulting kinds
    Register {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Resolve a short name, plural/singular name or GVK key
    Resolve {
        /// e.g. "dr", "deployments" or "apps/v1/Deployment"
        alias: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Per-document extraction warnings come from the registry; adapter chatter
/// about skipped subresources stays off unless asked for.
const DEFAULT_LOG: &str = "info,kindex_kubehub=warn";

/// Filter from `KINDEX_LOG`, or the default when unset or unparsable.
/// The second value carries a rejected directive so it can be reported once
/// the subscriber exists.
fn log_filter(raw: Option<&str>) -> (tracing_subscriber::EnvFilter, Option<String>) {
    match raw {
        Some(s) => match tracing_subscriber::EnvFilter::from_str(s) {
            Ok(f) => (f, None),
            Err(_) => (tracing_subscriber::EnvFilter::new(DEFAULT_LOG), Some(s.to_string())),
        },
        None => (tracing_subscriber::EnvFilter::new(DEFAULT_LOG), None),
    }
}

fn init_tracing() {
    let raw = std::env::var("KINDEX_LOG").ok();
    let (filter, rejected) = log_filter(raw.as_deref());
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
    if let Some(bad) = rejected {
        warn!(filter = %bad, default = DEFAULT_LOG, "invalid KINDEX_LOG; using default filter");
    }
}

fn init_metrics() {
    let Ok(addr) = std::env::var("KINDEX_METRICS_ADDR") else { return };
    let Ok(sock) = addr.parse::<std::net::SocketAddr>() else {
        warn!(addr = %addr, "invalid KINDEX_METRICS_ADDR; expected host:port");
        return;
    };
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().add_global_label("tool", "kindexctl");
    match builder.with_http_listener(sock).install() {
        Ok(_) => {
            metrics::describe_counter!("registry_registered_total", "discovery documents indexed by the registry");
            metrics::describe_counter!("registry_skipped_total", "discovery documents rejected by policy or lacking kind/version");
            metrics::describe_counter!("registry_field_errors_total", "field errors reported while extracting descriptors");
            metrics::describe_gauge!("registry_kinds", "resource kinds currently indexed");
            info!(addr = %addr, "Prometheus metrics exporter listening");
        }
        Err(e) => warn!(error = %e, "failed to install metrics exporter"),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

fn parse_documents(text: &str, yaml: bool) -> Result<Vec<Document>> {
    let value: serde_json::Value = if yaml {
        serde_yaml::from_str(text).context("parsing YAML")?
    } else {
        serde_json::from_str(text).context("parsing JSON")?
    };
    kindex_kubehub::documents_from_json(&value)
}

fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let docs = parse_documents(&text, is_yaml(path)).with_context(|| format!("loading {}", path.display()))?;
    info!(file = %path.display(), documents = docs.len(), "loaded discovery documents");
    Ok(docs)
}

fn load_all(files: &[PathBuf]) -> Result<Vec<Document>> {
    let mut out = Vec::new();
    for f in files {
        out.extend(load_documents(f)?);
    }
    Ok(out)
}

fn build_registry(policy: Policy, files: &[PathBuf]) -> Result<Registry> {
    let docs = load_all(files)?;
    let mut reg = Registry::new(policy);
    reg.register_all(&docs);
    Ok(reg)
}

fn scope(m: &ResourceMeta) -> &'static str { if m.namespaced { "namespaced" } else { "cluster" } }

fn group_version(m: &ResourceMeta) -> String {
    if m.group.is_empty() { m.version.clone() } else { format!("{}/{}", m.group, m.version) }
}

fn print_errors(errors: &Errors) {
    for e in errors {
        println!("  ! {}", e);
    }
}

fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { file } => {
            info!(file = %file.display(), "extract invoked");
            let docs = load_documents(&file)?;
            let results: Vec<(ResourceMeta, Errors)> = docs.iter().map(extract_meta).collect();
            let failed = results.iter().filter(|(_, e)| !e.is_empty()).count();
            if failed > 0 {
                warn!(failed, total = results.len(), "some documents had field errors");
            }
            match cli.output {
                Output::Human => {
                    for (m, errors) in &results {
                        let short = if m.short_names.is_empty() { "-".to_string() } else { m.short_names.join(",") };
                        println!("{} • {} • {} • {} • [{}]", group_version(m), m.kind, m.name, scope(m), short);
                        print_errors(errors);
                    }
                }
                Output::Json => {
                    #[derive(serde::Serialize)]
                    struct Row<'a> { descriptor: &'a ResourceMeta, errors: &'a Errors }
                    let rows: Vec<_> = results.iter().map(|(m, e)| Row { descriptor: m, errors: e }).collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }
        Commands::Versions { file } => {
            info!(file = %file.display(), "versions invoked");
            let docs = load_documents(&file)?;
            for (idx, doc) in docs.iter().enumerate() {
                let (versions, errors) = extract_versions(doc);
                match cli.output {
                    Output::Human => {
                        for v in &versions {
                            println!("{}\t{}\t{}", idx, v.name, if v.served { "served" } else { "not-served" });
                        }
                        print_errors(&errors);
                    }
                    Output::Json => {
                        println!("{}", serde_json::to_string(&serde_json::json!({ "index": idx, "versions": versions, "errors": errors }))?);
                    }
                }
            }
        }
        Commands::Register { files } => {
            info!(files = files.len(), policy = ?cli.policy, "register invoked");
            let reg = build_registry(cli.policy, &files)?;
            match cli.output {
                Output::Human => {
                    for m in reg.list() {
                        let aliases = reg.aliases_of(&m.gvk()).join(",");
                        println!("{} • {} • {} • {}", group_version(m), m.kind, scope(m), aliases);
                    }
                    for d in reg.diagnostics() {
                        let state = if d.registered { "registered" } else { "skipped" };
                        println!("#{} {} ({})", d.seq, d.gvk, state);
                        print_errors(&d.errors);
                    }
                }
                Output::Json => {
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                        "resources": reg.list(),
                        "diagnostics": reg.diagnostics(),
                    }))?);
                }
            }
        }
        Commands::Resolve { alias, files } => {
            info!(alias = %alias, "resolve invoked");
            let reg = build_registry(cli.policy, &files)?;
            match reg.resolve(&alias) {
                Some(m) => match cli.output {
                    Output::Human => println!("{}", m.gvk()),
                    Output::Json => println!("{}", serde_json::to_string_pretty(m)?),
                },
                None => {
                    eprintln!("no resource kind matches {:?}", alias);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
