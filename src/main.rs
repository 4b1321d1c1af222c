//! accessonix - ONIX accessibility remediation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use accessonix::{Error, FeatureSet, PublisherOverride};

/// EPUB upload limit.
const DEFAULT_MAX_EPUB_BYTES: u64 = 10 * 1024 * 1024;
/// ONIX upload limit.
const DEFAULT_MAX_ONIX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "accessonix")]
#[command(version, about = "Add EPUB accessibility metadata to ONIX records", long_about = None)]
#[command(after_help = "EXAMPLES:
    accessonix analyze book.epub
    accessonix convert --epub book.epub --onix record.xml --isbn 9781234567890")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the accessibility features detected in an EPUB
    Analyze {
        #[arg(value_name = "EPUB")]
        epub: PathBuf,

        /// Print a JSON map of code to presence
        #[arg(long)]
        json: bool,

        #[arg(long, default_value_t = DEFAULT_MAX_EPUB_BYTES)]
        max_epub_bytes: u64,
    },
    /// Write an ONIX 3.0 record carrying the EPUB's accessibility features
    Convert {
        #[arg(long, value_name = "EPUB")]
        epub: PathBuf,

        #[arg(long, value_name = "ONIX")]
        onix: PathBuf,

        /// 13-digit ISBN of the EPUB edition
        #[arg(long)]
        isbn: String,

        /// JSON file with sender, product code, language, and price overrides
        #[arg(long, value_name = "JSON")]
        publisher: Option<PathBuf>,

        /// Output path [default: AccessONIX_<isbn>_<timestamp>.xml]
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_MAX_EPUB_BYTES)]
        max_epub_bytes: u64,

        #[arg(long, default_value_t = DEFAULT_MAX_ONIX_BYTES)]
        max_onix_bytes: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Analyze {
            epub,
            json,
            max_epub_bytes,
        } => analyze(&epub, json, max_epub_bytes),
        Command::Convert {
            epub,
            onix,
            isbn,
            publisher,
            output,
            max_epub_bytes,
            max_onix_bytes,
        } => convert(
            &epub,
            &onix,
            &isbn,
            publisher.as_deref(),
            output,
            (max_epub_bytes, max_onix_bytes),
            cli.quiet,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_input_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Read a file, refusing anything over `limit` bytes.
fn read_limited(path: &Path, limit: u64, what: &str) -> Result<Vec<u8>, Error> {
    let len = std::fs::metadata(path)?.len();
    if len > limit {
        return Err(Error::InvalidInput(format!(
            "{what} file {} is {len} bytes; the limit is {limit}",
            path.display()
        )));
    }
    Ok(std::fs::read(path)?)
}

fn analyze(epub: &Path, json: bool, limit: u64) -> Result<(), Error> {
    let bytes = read_limited(epub, limit, "EPUB")?;
    let features = accessonix::analyze_accessibility(&bytes)?;

    if json {
        let out = serde_json::to_string_pretty(&features.to_map())
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        println!("{out}");
        return Ok(());
    }

    print_features(&features);
    Ok(())
}

fn print_features(features: &FeatureSet) {
    if features.is_empty() {
        println!("No accessibility features detected");
        return;
    }
    for code in features.iter() {
        println!("{code}  {}", code.description());
    }
}

fn load_publisher(path: &Path) -> Result<PublisherOverride, Error> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| Error::InvalidInput(format!("publisher overrides {}: {e}", path.display())))
}

fn default_output(isbn: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("AccessONIX_{}_{stamp}.xml", isbn.trim()))
}

fn convert(
    epub: &Path,
    onix: &Path,
    isbn: &str,
    publisher: Option<&Path>,
    output: Option<PathBuf>,
    (max_epub_bytes, max_onix_bytes): (u64, u64),
    quiet: bool,
) -> Result<(), Error> {
    let epub_bytes = read_limited(epub, max_epub_bytes, "EPUB")?;
    let onix_bytes = read_limited(onix, max_onix_bytes, "ONIX")?;
    let publisher = publisher.map(load_publisher).transpose()?;

    let features = accessonix::analyze_accessibility(&epub_bytes)?;
    if !quiet {
        print_features(&features);
    }

    let out = accessonix::transform_onix(&features, &onix_bytes, isbn, publisher.as_ref())?;
    let output = output.unwrap_or_else(|| default_output(isbn));
    std::fs::write(&output, out)?;

    if !quiet {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
