//! Spectral Reality Model CLI
//!
//! The `spectral` command loads excavated records from NDJSON files into a
//! fresh registry and runs one query or export against it.
//!
//! ## Commands
//!
//! - `ingest`: Report how the input files loaded
//! - `get`: Show one record by id
//! - `kind`: List records of a kind
//! - `stable`: List high-stability records
//! - `domain`: List records observed in an origin domain
//! - `snapshot`: Export every record as JSON or NDJSON
//! - `digest`: Print the snapshot digest

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use spectral_core::{
    ingest_path, snapshot_digest, write_snapshot_json, write_snapshot_ndjson, CatalogSpan,
    IngestReport, LogFormat, ObjectSnapshot, RegistryConfig, SpectralObject, SpectralRegistry,
};

#[derive(Parser)]
#[command(name = "spectral")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query and export a catalog of spectral objects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// NDJSON file of raw records; repeat to load several, in order
    #[arg(short, long = "input", global = true)]
    inputs: Vec<PathBuf>,

    /// Fail if any input line is malformed or invalid
    #[arg(long, global = true)]
    strict: bool,

    /// Catalog name attached to log lines
    #[arg(long, global = true, default_value = "default")]
    catalog: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the inputs and report accepted and rejected lines
    Ingest,

    /// Show one record by id
    Get {
        id: String,
    },

    /// List records whose kind matches exactly
    Kind {
        kind: String,

        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// List records with stability >= threshold and drift <= 1 - threshold
    Stable {
        /// Defaults to SPECTRAL_STABILITY_THRESHOLD, then 0.8
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// List records whose origin.domain matches exactly
    Domain {
        domain: String,

        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },

    /// Export every record
    Snapshot {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// Print the SHA-256 digest of the snapshot
    Digest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Ndjson,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = RegistryConfig::from_env().context("Invalid SPECTRAL_* environment")?;
    if cli.verbose {
        config = config.with_log_level(Level::DEBUG);
    }
    if cli.json {
        config = config.with_log_format(LogFormat::Json);
    }
    spectral_core::init_from_config(&config);
    let _span = CatalogSpan::enter(&cli.catalog);

    let mut registry = SpectralRegistry::new();
    let reports = load_inputs(&mut registry, &cli.inputs)?;
    let rejected: usize = reports.iter().map(|(_, r)| r.rejected.len()).sum();
    if cli.strict && rejected > 0 {
        bail!("{} input line(s) rejected (--strict)", rejected);
    }

    match cli.command {
        Commands::Ingest => {
            print!("{}", render_ingest_reports(&reports));
            Ok(())
        }
        Commands::Get { id } => cmd_get(&registry, &id),
        Commands::Kind { kind, format } => {
            print_listing(&registry.list_by_kind(&kind), format)
        }
        Commands::Stable { threshold, format } => {
            let threshold = threshold.unwrap_or(config.stability_threshold);
            print_listing(&registry.list_high_stability(threshold), format)
        }
        Commands::Domain { domain, format } => {
            print_listing(&registry.list_by_origin_domain(&domain), format)
        }
        Commands::Snapshot { output, format } => {
            cmd_snapshot(&registry, output.as_deref(), format).map(|_| ())
        }
        Commands::Digest => {
            println!("{}", snapshot_digest(&registry.snapshot())?);
            Ok(())
        }
    }
}

fn load_inputs(
    registry: &mut SpectralRegistry,
    inputs: &[PathBuf],
) -> Result<Vec<(PathBuf, IngestReport)>> {
    let mut reports = Vec::with_capacity(inputs.len());
    for path in inputs {
        let report = ingest_path(registry, path)
            .with_context(|| format!("Failed to read records from {:?}", path))?;
        for rejection in &report.rejected {
            warn!(path = %path.display(), "{}", rejection);
        }
        reports.push((path.clone(), report));
    }
    Ok(reports)
}

fn cmd_get(registry: &SpectralRegistry, id: &str) -> Result<()> {
    let obj = registry
        .get_by_id(id)
        .ok_or_else(|| anyhow!("No spectral object with id {:?}", id))?;
    println!("{}", serde_json::to_string_pretty(&obj.to_snapshot())?);
    Ok(())
}

/// Export the snapshot and report its digest.
///
/// The digest goes to stdout after a file export, and to stderr when the
/// records themselves are on stdout. Returns the digest.
fn cmd_snapshot(
    registry: &SpectralRegistry,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<String> {
    let snapshot = registry.snapshot();
    let digest = snapshot_digest(&snapshot)?;

    match (output, format) {
        (Some(path), ExportFormat::Json) => {
            write_snapshot_json(path, &snapshot)
                .with_context(|| format!("Failed to write {:?}", path))?;
        }
        (Some(path), ExportFormat::Ndjson) => {
            let file =
                File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
            write_snapshot_ndjson(BufWriter::new(file), &snapshot)?;
        }
        (None, ExportFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        (None, ExportFormat::Ndjson) => {
            write_snapshot_ndjson(std::io::stdout().lock(), &snapshot)?;
        }
    }

    spectral_core::emit_snapshot_taken(snapshot.len(), &digest);
    match output {
        Some(path) => {
            info!("Wrote {} object(s) to {:?}", snapshot.len(), path);
            println!("{}", digest);
        }
        None => eprintln!("digest {}", digest),
    }
    Ok(digest)
}

fn print_listing(objects: &[&SpectralObject], format: ListFormat) -> Result<()> {
    match format {
        ListFormat::Json => {
            let snapshots: Vec<ObjectSnapshot> =
                objects.iter().map(|o| o.to_snapshot()).collect();
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        }
        ListFormat::Text => print!("{}", render_listing(objects)),
    }
    Ok(())
}

fn render_listing(objects: &[&SpectralObject]) -> String {
    if objects.is_empty() {
        return "No matching spectral objects\n".to_string();
    }
    let mut out = String::new();
    for obj in objects {
        out.push_str(&format!(
            "{}\t{}\tstability={:.2}\tdrift={:.2}\tconfidence={:.2}\tdomain={}\n",
            obj.id(),
            obj.kind(),
            obj.stability(),
            obj.drift(),
            obj.confidence(),
            obj.origin_domain().unwrap_or("-"),
        ));
    }
    out
}

fn render_ingest_reports(reports: &[(PathBuf, IngestReport)]) -> String {
    if reports.is_empty() {
        return "No inputs given (use --input <file.ndjson>)\n".to_string();
    }
    let mut out = String::new();
    for (path, report) in reports {
        out.push_str(&format!(
            "{:?}: {} line(s), {} applied, {} rejected\n",
            path,
            report.lines,
            report.applied,
            report.rejected.len()
        ));
        for rejection in &report.rejected {
            out.push_str(&format!("  {}\n", rejection));
        }
    }
    out
}
