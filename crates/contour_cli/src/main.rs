//! CONTOUR CLI
//!
//! Command-line interface to check schemas and validate YAML/JSON documents
//! against them.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use console::style;
use contour_core::Error;
use contour_match::{DEFAULT_ENTRY, Validator};
use contour_schema::{Options, Schema, SchemaCompiler};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contour")]
#[command(about = "CONTOUR - Schema compiler and validator for YAML/JSON documents", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a schema and report every schema error
    Check {
        /// Path to the schema file
        schema: PathBuf,
        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Validate documents against a schema rule
    Validate(ValidateArgs),
}

/// Flags mapping onto compile options
#[derive(Args, Debug, Clone, Default)]
struct CompileFlags {
    /// Treat unknown rule references as `any`
    #[arg(long)]
    bypass_missing_rule: bool,
    /// Report rules no other rule references
    #[arg(long)]
    warn_unused_rule: bool,
    /// Report exported rules (`name:`) since the CLI registers no builder
    #[arg(long)]
    warn_unimplemented_builder: bool,
    /// Stop at the first error
    #[arg(long)]
    fail_fast: bool,
}

impl CompileFlags {
    fn options(&self) -> Options {
        Options::new()
            .with_bypass_missing_rule(self.bypass_missing_rule)
            .with_warn_unused_rule(self.warn_unused_rule)
            .with_warn_unimplemented_builder(self.warn_unimplemented_builder)
            .with_stop_at_first_schema_error(self.fail_fast)
            .with_stop_at_first_content_error(self.fail_fast)
    }
}

#[derive(Args, Debug, Clone)]
struct ValidateArgs {
    /// Path to the schema file
    #[arg(short, long)]
    schema: PathBuf,
    /// Entry rule
    #[arg(short, long, default_value = DEFAULT_ENTRY)]
    rule: String,
    /// Print the result tree of each valid document as JSON
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    flags: CompileFlags,
    /// Documents to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut out = std::io::stdout().lock();
    let passed = match cli.command {
        Commands::Check { schema, flags } => check(&schema, flags.options(), &mut out)?,
        Commands::Validate(args) => validate(&args, &mut out)?,
    };

    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compile_schema(path: &Path, options: Options) -> Result<std::result::Result<Schema, Vec<Error>>> {
    let document = contour_yaml::load_file(path)
        .wrap_err_with(|| format!("Failed to load schema {}", path.display()))?;
    Ok(SchemaCompiler::new().with_options(options).compile(&document))
}

fn report(out: &mut impl Write, source: &str, errors: &[Error]) -> Result<()> {
    writeln!(out, "{} {} ({} errors)", style("FAIL").red().bold(), source, errors.len())?;
    for error in errors {
        writeln!(out, "  {}", error)?;
    }
    Ok(())
}

/// Compile a schema; `Ok(false)` when it has schema errors
fn check(path: &Path, options: Options, out: &mut impl Write) -> Result<bool> {
    match compile_schema(path, options)? {
        Ok(schema) => {
            writeln!(
                out,
                "{} {} ({} rules)",
                style("ok").green().bold(),
                path.display(),
                schema.user_rules().count()
            )?;
            Ok(true)
        }
        Err(errors) => {
            report(out, &path.display().to_string(), &errors)?;
            Ok(false)
        }
    }
}

/// Validate every file; `Ok(false)` when the schema or any file fails
fn validate(args: &ValidateArgs, out: &mut impl Write) -> Result<bool> {
    let schema = match compile_schema(&args.schema, args.flags.options())? {
        Ok(schema) => schema,
        Err(errors) => {
            report(out, &args.schema.display().to_string(), &errors)?;
            return Ok(false);
        }
    };
    let validator = Validator::new(&schema).with_entry(args.rule.as_str());
    debug!(files = args.files.len(), rule = %args.rule, "Validating files");

    let mut passed = true;
    for file in &args.files {
        let source = file.display().to_string();
        let document = match contour_yaml::load_file(file) {
            Ok(document) => document,
            Err(e) => {
                writeln!(out, "{} {}: {}", style("FAIL").red().bold(), source, e)?;
                passed = false;
                continue;
            }
        };

        match validator.validate(&document) {
            Ok(output) if args.json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&output.to_json())?)?;
            }
            Ok(_) => writeln!(out, "{} {}", style("ok").green().bold(), source)?,
            Err(errors) => {
                report(out, &source, &errors)?;
                passed = false;
            }
        }
    }
    Ok(passed)
}
