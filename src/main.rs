//! CLI for the XSD-to-Rust generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "xsdgen")]
#[command(about = "Generate Rust data structures, a validating loader, and a writer from an XSD 1.0 schema")]
struct Args {
    /// Path to the XSD schema file.
    schema: PathBuf,

    /// Write generated source to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let source = xsdgen::generate_from_path(&args.schema)?;

    match args.output {
        Some(path) => std::fs::write(&path, source)?,
        None => {
            use std::io::Write;
            std::io::stdout().write_all(source.as_bytes())?;
        }
    }

    Ok(())
}
