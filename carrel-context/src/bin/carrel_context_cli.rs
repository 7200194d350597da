use carrel_context::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TokenWindowChunker};
use clap::Parser;
use std::fs;
use std::io::{self, Read};

/// A CLI tool to chunk text files into JSON output using carrel-context.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input text file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Window size in tokens.
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Tokens shared between consecutive windows.
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    overlap: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let text = if let Some(input_path) = args.input {
        fs::read_to_string(input_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let chunker = TokenWindowChunker::new(args.chunk_size, args.overlap);
    let chunks = chunker.chunk(&text)?;

    println!("{}", serde_json::to_string_pretty(&chunks)?);

    Ok(())
}
