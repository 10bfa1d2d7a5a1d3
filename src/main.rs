use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use lzchunk::{
    compress_stream, decode, decompress_stream, encode, ChunkReader, Observer, Silent, Token,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an input file to an output file
    Compress {
        /// Input file path (use - for stdin)
        input: String,
        /// Output file path (use - for stdout)
        output: String,
        /// Print every emitted token to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Decompress an input file to an output file
    Decompress {
        /// Input file path (use - for stdin)
        input: String,
        /// Output file path (use - for stdout)
        output: String,
        /// Print every decoded token to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Compress and decompress a file in memory and check the result matches
    Verify {
        /// Input file path (use - for stdin)
        input: String,
    },
    /// List the chunks and tokens of a compressed file
    Inspect {
        /// Input file path (use - for stdin)
        input: String,
    },
}

/// Prints tokens as they go by
struct StderrTrace;

impl Observer for StderrTrace {
    fn token(&mut self, _position: usize, token: &Token) {
        eprintln!("inserted {}", describe(token));
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Literal(byte) => format!("'{}'", byte.escape_ascii()),
        Token::Match(reference, byte) => format!(
            "<{}, {}> '{}'",
            reference.offset(),
            reference.length(),
            byte.escape_ascii()
        ),
    }
}

fn observer(trace: bool) -> Box<dyn Observer> {
    if trace {
        Box::new(StderrTrace)
    } else {
        Box::new(Silent)
    }
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn read_all(path: &str) -> Result<Vec<u8>> {
    let mut reader = open_input(path)?;
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read input: {}", path))?;
    Ok(buffer)
}

fn verify(input: &str) -> Result<()> {
    let original = read_all(input)?;
    let compressed = encode(&original);
    let decompressed = decode(&compressed).context("Decompression of freshly compressed data failed")?;

    if decompressed.len() != original.len() {
        bail!(
            "Data is corrupted: input length {} != decompressed length {}",
            original.len(),
            decompressed.len()
        );
    }
    if decompressed != original {
        bail!("Data is corrupted: input != decompressed data");
    }

    eprintln!(
        "Verified {}: {} bytes -> {} bytes compressed",
        input,
        original.len(),
        compressed.len()
    );
    Ok(())
}

fn inspect(input: &str) -> Result<()> {
    let encoded = read_all(input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, chunk) in ChunkReader::new(&encoded).enumerate() {
        let chunk = chunk.with_context(|| format!("Failed to read chunk {} of {}", index, input))?;
        writeln!(
            out,
            "chunk {}: {} slots, flags {:012b}, {} references, {} bytes",
            index,
            chunk.used_slots(),
            chunk.flags(),
            chunk.references().len(),
            chunk.encoded_len()
        )?;
        for (slot, token) in chunk.tokens().enumerate() {
            writeln!(out, "  {:2}: {}", slot, describe(&token))?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            input,
            output,
            trace,
        } => {
            let mut reader = open_input(&input)?;
            let mut writer = open_output(&output)?;

            eprintln!("Compressing {} to {}...", input, output);
            let stats = compress_stream(&mut reader, &mut writer, observer(trace).as_mut())
                .with_context(|| format!("Compression failed from {} to {}", input, output))?;
            eprintln!(
                "Compression successful: {} bytes -> {} bytes.",
                stats.read, stats.written
            );
        }
        Commands::Decompress {
            input,
            output,
            trace,
        } => {
            let mut reader = open_input(&input)?;
            let mut writer = open_output(&output)?;

            eprintln!("Decompressing {} to {}...", input, output);
            let stats = decompress_stream(&mut reader, &mut writer, observer(trace).as_mut())
                .with_context(|| format!("Decompression failed from {} to {}", input, output))?;
            eprintln!(
                "Decompression successful: {} bytes -> {} bytes.",
                stats.read, stats.written
            );
        }
        Commands::Verify { input } => verify(&input)?,
        Commands::Inspect { input } => inspect(&input)?,
    }

    Ok(())
}
