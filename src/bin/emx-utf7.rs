//! emx-utf7 CLI
//!
//! Encode and decode UTF-7 text, or show the UTF-7 form of file names.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emx_utf7::{Decoder, Encoder};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "emx-utf7")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "UTF-7 (RFC 2152) encoding tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode text to UTF-7
    Encode {
        /// Input file (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode UTF-7 text
    Decode {
        /// Input file (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Verbose output (repeat for more detail)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },

    /// List files under a directory with their UTF-7 encoded names
    Names {
        /// Directory to walk
        directory: PathBuf,

        /// Also list directories
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { input, output, verbose } => {
            encode_text(input, output, verbose)?;
        }
        Commands::Decode { input, output, verbose } => {
            decode_text(input, output, verbose)?;
        }
        Commands::Names { directory, verbose } => {
            list_names(&directory, verbose)?;
        }
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    if let Some(input_path) = input {
        fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read: {}", input_path.display()))
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, content)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;
    } else {
        print!("{}", content);
    }
    Ok(())
}

// Line terminators are kept as-is instead of being escaped.
fn encode_text(input: Option<PathBuf>, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let text = read_input(input.as_deref())?;

    let encoder = Encoder::new();
    let encoded = text
        .split('\n')
        .map(|line| encoder.encode(line))
        .collect::<Vec<_>>()
        .join("\n");

    write_output(output.as_deref(), &encoded)?;

    if verbose {
        eprintln!("Encoded: {} chars -> {} bytes", text.chars().count(), encoded.len());
    }

    Ok(())
}

fn decode_text(input: Option<PathBuf>, output: Option<PathBuf>, verbose: u8) -> Result<()> {
    let text = read_input(input.as_deref())?;

    let decoder = Decoder::new().with_verbose(verbose);
    let mut lines = Vec::new();
    for (line_num, line) in text.split('\n').enumerate() {
        let decoded = decoder
            .decode(line)
            .with_context(|| format!("Failed to decode line {}", line_num + 1))?;
        lines.push(decoded);
    }
    let decoded = lines.join("\n");

    write_output(output.as_deref(), &decoded)?;

    if verbose > 0 {
        eprintln!("Decoded: {} bytes -> {} chars", text.len(), decoded.chars().count());
    }

    Ok(())
}

fn list_names(dir: &Path, verbose: bool) -> Result<()> {
    #[cfg(feature = "walkdir")]
    {
        let encoder = Encoder::new();
        let entries = walkdir::WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| verbose || e.file_type().is_file())
            .collect::<Vec<_>>();

        for entry in entries {
            let relative_path = entry
                .path()
                .strip_prefix(dir)
                .map_err(|_| anyhow::anyhow!("Failed to get relative path"))?;

            let name = relative_path.to_string_lossy().replace('\\', "/");
            let kind = if entry.file_type().is_dir() { "dir " } else { "file" };

            if verbose {
                println!("{}  {}  {}", kind, name, encoder.encode(&name));
            } else {
                println!("{}  {}", name, encoder.encode(&name));
            }
        }
    }

    #[cfg(not(feature = "walkdir"))]
    {
        let _ = (dir, verbose);
        anyhow::bail!("Directory traversal requires the 'cli' feature");
    }

    Ok(())
}
