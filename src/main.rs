use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use huffzip::config::CompressionConfig;
use huffzip::Compressor;

#[derive(Debug, Parser)]
#[command(name = "huffzip")]
#[command(about = "Static Huffman compressor for text files")]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compress a text file into <name>_compressed.bin
    Compress { input: PathBuf },
    /// Restore <name>_decompressed.txt from an artifact
    Decompress { input: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => CompressionConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CompressionConfig::default(),
    };
    let compressor = Compressor::new(config);

    match args.command {
        Command::Compress { input } => {
            let output = compressor
                .compress_file(&input)
                .with_context(|| format!("compressing {}", input.display()))?;
            println!("Compressed '{}' to '{}'", input.display(), output.display());
        }
        Command::Decompress { input } => {
            let output = compressor
                .decompress_file(&input)
                .with_context(|| format!("decompressing {}", input.display()))?;
            println!("Decompressed '{}' to '{}'", input.display(), output.display());
        }
    }

    Ok(())
}
