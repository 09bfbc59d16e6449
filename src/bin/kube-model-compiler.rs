//! Kubernetes Model Compiler CLI
//!
//! Command-line interface for compiling Kubernetes API schemas into model
//! manifests and API binding tables.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kube_model_compiler::{
    bind_operations, build_binding_table, build_manifest, compile, load_document_auto,
    CompileOptions, SchemaDocument,
};
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kube-model-compiler")]
#[command(about = "Resolve and classify Kubernetes API schema definitions")]
#[command(version)]
struct Cli {
    /// Log compilation progress (debug level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schema definitions into a model manifest
    Compile {
        /// Schema source: file path (JSON or YAML) or URL (http:// or https://)
        schema: String,

        /// Additional definition to skip (repeatable)
        #[arg(long = "ignore", value_name = "NAME")]
        ignore: Vec<String>,

        /// Don't skip the stock well-known definitions (Time, Quantity, ...)
        #[arg(long)]
        no_default_ignores: bool,

        /// File extension of generated artifacts
        #[arg(long, default_value = "cs")]
        ext: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the table of API operations bound to each kind
    Bindings {
        /// Schema source: file path (JSON or YAML) or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            schema,
            ignore,
            no_default_ignores,
            ext,
            output,
            pretty,
        } => {
            let mut options = CompileOptions::new();
            if no_default_ignores {
                options = options.without_default_ignores();
            }
            for name in ignore {
                options = options.ignore(name);
            }
            run_compile(&schema, &options, &ext, output, pretty)
        }

        Commands::Bindings {
            schema,
            output,
            pretty,
        } => run_bindings(&schema, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "kube_model_compiler=debug"
    } else {
        "kube_model_compiler=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .try_init();
}

fn run_compile(
    schema_source: &str,
    options: &CompileOptions,
    ext: &str,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let document = load(schema_source)?;

    let compiled = compile(&document, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    tracing::info!(
        models = compiled.graph().len(),
        kinds = compiled.bindings().len(),
        "compiled schema"
    );

    let manifest = build_manifest(&compiled, ext);
    write_json(&manifest, output, pretty)
}

fn run_bindings(schema_source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let document = load(schema_source)?;

    let bindings = bind_operations(&document.paths);
    tracing::info!(
        kinds = bindings.len(),
        skipped = bindings.skipped().len(),
        "bound operations"
    );

    write_json(&build_binding_table(&bindings), output, pretty)
}

fn load(schema_source: &str) -> Result<SchemaDocument, u8> {
    load_document_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn write_json<T: Serialize>(value: &T, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
