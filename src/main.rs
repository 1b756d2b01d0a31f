//! huffpack CLI
//! Usage:
//!   huffpack <input>                  compress to <input>.comp
//!   huffpack -d <input>               decompress to <input>.decomp.txt
//!   huffpack -o <path> [-d] <input>   explicit output path

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;

use huffpack::{compress_file, decompress_file, Result};

#[derive(Parser)]
#[command(name = "huffpack", version, about = "prefix-code file compressor / decompressor")]
struct Cli {
    /// Decompress the input instead of compressing it
    #[arg(short = 'd', long = "decode")]
    decode: bool,

    /// Output file path
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Input file path
    input: PathBuf,
}

fn default_output(input: &PathBuf, decode: bool) -> PathBuf {
    let mut name: OsString = input.clone().into_os_string();
    name.push(if decode { ".decomp.txt" } else { ".comp" });
    PathBuf::from(name)
}

fn run(cli: &Cli, output: &PathBuf) -> Result<()> {
    if cli.decode {
        decompress_file(&cli.input, output)?;
        let original = fs::metadata(&cli.input)?.len();
        let restored = fs::metadata(output)?.len();
        println!("Done. {} bytes → {} bytes", original, restored);
    } else {
        let stats = compress_file(&cli.input, output)?;
        println!(
            "header length: {}, original length: {}, compressed length: {}, reduction: {:.2}%",
            stats.header_bytes,
            stats.input_bytes,
            stats.compressed_bytes(),
            stats.reduction_percent(),
        );
        println!(
            "Done. {} bytes → {} bytes",
            stats.input_bytes,
            stats.compressed_bytes()
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(1);
    });
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, cli.decode));

    let started = Instant::now();
    if let Err(e) = run(&cli, &output) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    println!("Elapsed time: {:.2?}", started.elapsed());
}
