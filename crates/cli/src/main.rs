//! Diploma Registry Command Line Interface
//!
//! Issues and verifies diplomas against a registry snapshot file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use diploma_registry::{
    compute_fingerprint, hash_document, DiplomaDetails, DiplomaMetadata, DiplomaRegistry,
    Fingerprint, Identity, TracingEventSink, VerificationReport,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod settings;
mod state_lock;

use settings::CliConfig;
use state_lock::StateLock;

#[derive(Parser)]
#[command(name = "diploma-cli")]
#[command(about = "Diploma issuance registry command line interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registry snapshot file (overrides config / DIPLOMA_STATE_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Identity performing admin-gated commands (overrides config / DIPLOMA_CALLER)
    #[arg(long, global = true)]
    caller: Option<Identity>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty registry owned by an admin
    Init {
        /// Admin identity (0x-prefixed hex)
        #[arg(long)]
        admin: Identity,
    },
    /// Issue a diploma (admin only)
    Issue {
        /// Diploma fingerprint (32-byte hex)
        fingerprint: Fingerprint,
        /// Recipient identity (20-byte hex)
        recipient: Identity,
        /// Comma-separated scores, e.g. 85,90,88
        #[arg(long, value_delimiter = ',')]
        scores: Vec<u64>,
    },
    /// Verify a diploma fingerprint
    Verify {
        fingerprint: Fingerprint,
    },
    /// Show the full stored record
    Record {
        fingerprint: Fingerprint,
    },
    /// List fingerprints issued to a recipient
    DiplomasOf {
        recipient: Identity,
    },
    /// Total number of issued diplomas
    Total,
    /// Show the current admin
    Admin,
    /// Hand admin authority to another identity (admin only)
    TransferAdmin {
        new_admin: Identity,
    },
    /// Compute a diploma fingerprint from its metadata
    Hash(HashCommand),
    /// Keccak-256 of a document file
    HashFile {
        path: PathBuf,
    },
}

#[derive(Args)]
struct HashCommand {
    /// Hash of the diploma document (32-byte hex)
    #[arg(long)]
    document_hash: Fingerprint,
    #[arg(long)]
    student_id: String,
    /// Graduation date, YYYY-MM-DD
    #[arg(long)]
    graduation_date: String,
    #[arg(long)]
    degree: String,
    #[arg(long, requires_all = ["gpa", "honors"])]
    major: Option<String>,
    #[arg(long, requires_all = ["major", "honors"])]
    gpa: Option<String>,
    #[arg(long, requires_all = ["major", "gpa"])]
    honors: Option<String>,
}

impl HashCommand {
    fn into_metadata(self) -> DiplomaMetadata {
        let details = match (self.major, self.gpa, self.honors) {
            (Some(major), Some(gpa), Some(honors)) => Some(DiplomaDetails { major, gpa, honors }),
            _ => None,
        };
        DiplomaMetadata {
            document_hash: self.document_hash.0,
            student_id: self.student_id,
            graduation_date: self.graduation_date,
            degree: self.degree,
            details,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(state) = cli.state.clone() {
        config.state_path = state;
    }
    if cli.caller.is_some() {
        config.caller = cli.caller;
    }

    init_logging(&config)?;
    run(cli.command, &config, cli.json)
}

fn init_logging(config: &CliConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.log_format == "compact" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.compact())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    }

    Ok(())
}

fn run(command: Commands, config: &CliConfig, json: bool) -> Result<()> {
    let state_path = config.state_path.as_path();

    match command {
        Commands::Init { admin } => {
            let _lock = StateLock::exclusive(state_path, "init")?;
            if state_path.exists() {
                anyhow::bail!(
                    "Registry state {} already exists; refusing to overwrite",
                    state_path.display()
                );
            }
            let registry = DiplomaRegistry::new(admin)?;
            registry.save(state_path)?;
            info!(path = %state_path.display(), %admin, "Registry created");
            print_output(json, &serde_json::json!({ "admin": admin, "state": state_path }), || {
                println!("Registry created at {}", state_path.display());
                println!("Admin: {admin}");
            })
        }
        Commands::Issue {
            fingerprint,
            recipient,
            scores,
        } => {
            let caller = require_caller(config)?;
            let _lock = StateLock::exclusive(state_path, "issue")?;
            let registry = open_registry(state_path)?;
            let record = registry.issue(&caller, fingerprint, recipient, scores)?;
            registry.save(state_path)?;
            print_output(json, &record, || {
                println!("Diploma issued");
                println!("Fingerprint: {}", record.fingerprint);
                println!("Recipient:   {}", record.recipient);
                println!("Issued at:   {}", format_timestamp(record.issued_at));
            })
        }
        Commands::Verify { fingerprint } => {
            let registry = open_shared(state_path)?;
            let report = VerificationReport::build(&registry, fingerprint);
            print_output(json, &report, || print_report(&report))
        }
        Commands::Record { fingerprint } => {
            let registry = open_shared(state_path)?;
            let record = registry.full_record(&fingerprint);
            print_output(json, &record, || {
                println!("Fingerprint: {}", record.fingerprint);
                println!("Recipient:   {}", record.recipient);
                println!("Issued at:   {}", format_timestamp(record.issued_at));
                println!("Scores:      {}", join_scores(&record.scores));
                println!("Exists:      {}", record.exists);
            })
        }
        Commands::DiplomasOf { recipient } => {
            let registry = open_shared(state_path)?;
            let diplomas = registry.diplomas_of(&recipient);
            print_output(json, &diplomas, || {
                println!("{} diploma(s) for {recipient}", diplomas.len());
                for fingerprint in &diplomas {
                    println!("  {fingerprint}");
                }
            })
        }
        Commands::Total => {
            let registry = open_shared(state_path)?;
            let total = registry.total_count();
            print_output(json, &total, || println!("Total diplomas: {total}"))
        }
        Commands::Admin => {
            let registry = open_shared(state_path)?;
            let admin = registry.admin();
            print_output(json, &admin, || println!("Admin: {admin}"))
        }
        Commands::TransferAdmin { new_admin } => {
            let caller = require_caller(config)?;
            let _lock = StateLock::exclusive(state_path, "transfer-admin")?;
            let registry = open_registry(state_path)?;
            registry.transfer_admin(&caller, new_admin)?;
            registry.save(state_path)?;
            print_output(
                json,
                &serde_json::json!({ "previous": caller, "current": new_admin }),
                || println!("Admin changed: {caller} -> {new_admin}"),
            )
        }
        Commands::Hash(cmd) => {
            let metadata = cmd.into_metadata();
            let fingerprint = compute_fingerprint(&metadata);
            print_output(json, &fingerprint, || println!("{fingerprint}"))
        }
        Commands::HashFile { path } => {
            let bytes =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let digest = Fingerprint::new(hash_document(&bytes));
            print_output(json, &digest, || println!("{digest}"))
        }
    }
}

/// Load a snapshot for reading; the shared lock is released once loaded.
fn open_shared(state_path: &Path) -> Result<DiplomaRegistry> {
    let _lock = StateLock::shared(state_path)?;
    open_registry(state_path)
}

fn open_registry(state_path: &Path) -> Result<DiplomaRegistry> {
    let registry = DiplomaRegistry::load(state_path).with_context(|| {
        format!(
            "failed to open registry state {} (run `diploma-cli init` first)",
            state_path.display()
        )
    })?;
    Ok(registry.with_sink(Arc::new(TracingEventSink)))
}

fn require_caller(config: &CliConfig) -> Result<Identity> {
    config
        .caller
        .context("this command requires a caller identity (--caller or DIPLOMA_CALLER)")
}

fn print_output<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

fn print_report(report: &VerificationReport) {
    println!("Fingerprint: {}", report.fingerprint);
    if report.verified() {
        let verification = &report.verification;
        println!("Status:      VERIFIED");
        println!("Recipient:   {}", verification.recipient);
        println!("Issued at:   {}", format_timestamp(verification.issued_at));
        println!("Scores:      {}", join_scores(&verification.scores));
        if let Some(average) = report.average_score() {
            println!("Average:     {average}");
        }
        println!("Diplomas held by recipient: {}", report.recipient_diplomas);
    } else {
        println!("Status:      NOT FOUND");
    }
    println!("Total diplomas in registry: {}", report.registry_total);
}

fn join_scores(scores: &[u64]) -> String {
    scores
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
