use std::{
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use linescan::{Line, LineReader, DEFAULT_BUFFER_CAPACITY};

/// Print the lines of a file together with the number of bytes each one
/// occupies, delimiter included.
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Options {
    /// Path to the file to scan.
    path: PathBuf,

    /// Size of the read buffer in bytes.
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_size: usize,

    /// Prefix every line with the byte offset it starts at.
    #[arg(short, long)]
    offsets: bool,

    /// Only print the number of lines and bytes.
    #[arg(short, long, conflicts_with_all = ["offsets", "json"])]
    count: bool,

    /// Print one JSON object per line.
    #[arg(short, long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Record<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u64>,
    #[serde(flatten)]
    line: &'a Line,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let options = Options::parse();
    tracing::debug!(?options, "starting scan");

    let reader = LineReader::open_with_capacity(&options.path, options.buffer_size)
        .with_context(|| format!("Unable to scan file: {}", options.path.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    scan(reader, &mut out, &options)?;
    out.flush()?;
    Ok(())
}

fn scan<R: Read, W: Write>(
    reader: LineReader<R>,
    out: &mut W,
    options: &Options,
) -> anyhow::Result<()> {
    if options.count {
        let mut offsets = reader.with_offsets();
        let mut lines = 0u64;
        for res in offsets.by_ref() {
            res.with_context(|| "Failed reading lines")?;
            lines += 1;
        }
        writeln!(out, "{} lines, {} bytes", lines, offsets.next_offset())?;
    } else {
        for res in reader.with_offsets() {
            let (offset, line) = res.with_context(|| "Failed reading lines")?;
            print_line(out, options, offset, &line)?;
        }
    }
    Ok(())
}

fn print_line<W: Write>(
    out: &mut W,
    options: &Options,
    offset: u64,
    line: &Line,
) -> anyhow::Result<()> {
    if options.json {
        let record = Record {
            offset: options.offsets.then_some(offset),
            line,
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    } else if options.offsets {
        writeln!(out, "{}\t{}", offset, line)?;
    } else {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const INPUT: &[u8] = b"a\r\nb\rc\n\nd";

    fn options(args: &[&str]) -> Options {
        let mut argv = vec!["linescan", "input.txt"];
        argv.extend_from_slice(args);
        Options::parse_from(argv)
    }

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let reader = LineReader::new(Cursor::new(INPUT.to_vec()))?;
        let mut out = Vec::new();
        scan(reader, &mut out, &options(args))?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_plain_output() -> anyhow::Result<()> {
        assert_eq!(run(&[])?, "a:3\nb:2\nc:2\n:1\nd:1\n");
        Ok(())
    }

    #[test]
    fn test_offsets_output() -> anyhow::Result<()> {
        assert_eq!(
            run(&["--offsets"])?,
            "0\ta:3\n3\tb:2\n5\tc:2\n7\t:1\n8\td:1\n"
        );
        Ok(())
    }

    #[test]
    fn test_json_output() -> anyhow::Result<()> {
        let output = run(&["--json"])?;
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], r#"{"content":"a","length":3}"#);
        assert_eq!(lines[3], r#"{"content":"","length":1}"#);
        Ok(())
    }

    #[test]
    fn test_json_output_with_offsets() -> anyhow::Result<()> {
        let output = run(&["--json", "--offsets"])?;
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], r#"{"offset":0,"content":"a","length":3}"#);
        assert_eq!(lines[4], r#"{"offset":8,"content":"d","length":1}"#);
        Ok(())
    }

    #[test]
    fn test_count_output() -> anyhow::Result<()> {
        assert_eq!(run(&["--count"])?, "5 lines, 9 bytes\n");
        Ok(())
    }

    #[test]
    fn test_count_conflicts_with_json() {
        let res = Options::try_parse_from(["linescan", "input.txt", "-c", "-j"]);
        assert!(res.is_err());
    }
}
