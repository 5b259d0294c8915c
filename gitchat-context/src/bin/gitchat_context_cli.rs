use clap::Parser;
use gitchat_context::chunk::Chunker;
use gitchat_context::extract::extract_text;
use std::fs;
use std::io::{self, Read};

/// A CLI tool to chunk a source file into JSON output using gitchat-context.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input file. If not provided, reads from stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// File path recorded on each chunk (defaults to the input path).
    #[arg(short, long)]
    path: Option<String>,

    /// Maximum accumulated size for each chunk, in characters.
    #[arg(short, long, default_value_t = 500)]
    max_chunk_size: usize,

    /// Overlap budget in characters; its tenth (in lines) seeds the next chunk.
    #[arg(short, long, default_value_t = 50)]
    overlap: usize,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let (content, default_path) = if let Some(input_path) = &args.input {
        (fs::read_to_string(input_path)?, input_path.clone())
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        (buffer, "stdin".to_string())
    };

    let file_path = args.path.unwrap_or(default_path);

    let Some(text) = extract_text(&content, &file_path) else {
        eprintln!("{file_path}: binary file, nothing to chunk");
        return Ok(());
    };

    let chunker = Chunker::new(args.max_chunk_size, args.overlap);
    let chunks = chunker.chunk(&text, &file_path);

    let json_output = serde_json::to_string_pretty(&chunks)?;
    println!("{}", json_output);

    Ok(())
}
