use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formfill_core::{forms, label_mapping, Config, Module};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "formfill",
    about = "Fill organizational PDF forms from the command line",
    version,
    author
)]
struct Cli {
    /// Configuration file (defaults to $FORMFILL_CONFIG when set)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log mapping and fill decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the form fields of a PDF
    Fields {
        /// Input PDF file
        input: PathBuf,

        /// Print name, kind and current value as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every field's own name into it
    Label {
        /// Input PDF file
        input: PathBuf,

        /// Output file path (defaults to labeled_<input>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Truncate labels to this many characters
        #[arg(long)]
        max_len: Option<usize>,
    },

    /// Fill a form with organization and representative data
    Generate {
        /// Input PDF file
        input: PathBuf,

        /// Business module: PRIMARY or SECONDARY
        #[arg(short, long)]
        module: String,

        /// Output file path (defaults to <module>_<input>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("formfill_core=trace,formfill=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Fields { input, json } => {
            let document = read_pdf(&input)?;
            let fields = forms::list_fields(&document)
                .with_context(|| format!("Failed to read fields of {}", input.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else if fields.is_empty() {
                println!("No form fields found in {}", input.display());
            } else {
                println!("Form fields in {}: {}", input.display(), fields.len());
                for field in &fields {
                    match &field.value {
                        Some(value) => println!("  {} ({:?}) = {}", field.name, field.kind, value),
                        None => println!("  {} ({:?})", field.name, field.kind),
                    }
                }
            }
        }

        Commands::Label {
            input,
            output,
            max_len,
        } => {
            let document = read_pdf(&input)?;
            let names = forms::field_names(&document)?;
            let mapping = label_mapping(&names, max_len.or(config.mapping.label_max_len));
            let outcome = forms::fill_with_report(&document, &mapping)
                .with_context(|| format!("Failed to label {}", input.display()))?;

            let output = output.unwrap_or_else(|| prefixed_path(&input, "labeled"));
            write_pdf(&output, &outcome.bytes)?;
            println!(
                "Labeled {} fields: {}",
                outcome.report.filled.len(),
                output.display()
            );
        }

        Commands::Generate {
            input,
            module,
            output,
        } => {
            let module = Module::parse(&module)?;
            let document = read_pdf(&input)?;

            let registry = config.registry();
            let mapper = config.mapper();
            let names = forms::field_names(&document)?;
            let mapping =
                mapper.build_mapping(&names, &config.organization, registry.resolve(module));
            let outcome = forms::fill_with_report(&document, &mapping)
                .with_context(|| format!("Failed to fill {}", input.display()))?;

            let output = output.unwrap_or_else(|| {
                prefixed_path(&input, &module.as_str().to_ascii_lowercase())
            });
            write_pdf(&output, &outcome.bytes)?;

            println!(
                "Filled {} of {} fields for {}: {}",
                outcome.report.filled.len(),
                names.len(),
                module,
                output.display()
            );
            for name in &outcome.report.unmatched {
                tracing::warn!(field = %name, "mapped field not present in document");
            }
            for name in &outcome.report.skipped {
                tracing::warn!(field = %name, "field cannot be written; left as is");
            }
        }
    }

    Ok(())
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    formfill_core::ensure_pdf_filename(&path.to_string_lossy())?;
    let document =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if document.is_empty() {
        return Err(formfill_core::FormError::EmptyUpload.into());
    }
    Ok(document)
}

fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// `dir/form.pdf` becomes `dir/<prefix>_form.pdf`
fn prefixed_path(input: &Path, prefix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    input.with_file_name(format!("{prefix}_{name}"))
}
