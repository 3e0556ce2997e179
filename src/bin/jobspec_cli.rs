//! jobspec CLI - Render job descriptions to Nomad job files
//!
//! Commands: render, artifacts, hash
//! Errors are printed as JSON to stdout
//! Returns 1 on bad input, 2 on render failure

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobspec_core::{
    document_hash, ArtifactRegistry, JobDescription, RenderOptions, Renderer, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "jobspec-cli")]
#[command(about = "jobspec CLI - Job Specification Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to artifact definitions directory
    #[arg(short, long, default_value = "artifacts")]
    artifacts_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a job description
    Render {
        /// JSON job description
        #[arg(short, long)]
        input: PathBuf,

        /// Print a JSON envelope with the document hash
        #[arg(long)]
        json: bool,

        /// Also echo the document to stderr
        #[arg(long)]
        echo: bool,
    },

    /// List available artifacts
    Artifacts,

    /// Print the SHA-256 of the rendered document
    Hash {
        /// JSON job description
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn fail(error: impl std::fmt::Display, code: u8) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    ExitCode::from(code)
}

fn load_description(path: &Path) -> Result<JobDescription, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    JobDescription::from_json(&content).map_err(|e| format!("Invalid job description: {}", e))
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobspec_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let registry = match ArtifactRegistry::load_from_dir(&cli.artifacts_dir) {
        Ok(r) => r,
        Err(e) => return fail(format!("Failed to load artifacts: {}", e), 1),
    };

    match cli.command {
        Commands::Artifacts => {
            let artifacts: Vec<_> = registry
                .list()
                .into_iter()
                .map(|(id, artifact)| {
                    serde_json::json!({
                        "id": id,
                        "artifact": artifact,
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(artifacts));
            ExitCode::SUCCESS
        }

        Commands::Render { input, json, echo } => {
            let description = match load_description(&input) {
                Ok(d) => d,
                Err(e) => return fail(e, 1),
            };
            let renderer = Renderer::new(registry, RenderOptions { echo });

            match renderer.render_description(&description) {
                Ok(document) if json => {
                    let output = serde_json::json!({
                        "success": true,
                        "job": description.job,
                        "engine_version": ENGINE_VERSION,
                        "document_hash": document_hash(&document),
                        "document": document,
                    });
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Ok(document) => {
                    print!("{}", document);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e, 2),
            }
        }

        Commands::Hash { input } => {
            let description = match load_description(&input) {
                Ok(d) => d,
                Err(e) => return fail(e, 1),
            };
            let renderer = Renderer::new(registry, RenderOptions::default());

            match renderer.render_description(&description) {
                Ok(document) => {
                    println!("{}", document_hash(&document));
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e, 2),
            }
        }
    }
}
