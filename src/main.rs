use clap::Parser;
use rayon::prelude::*;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::time::Instant;

use khmer_segmenter::{Segmenter, SegmenterConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a baked .kdic dictionary file
    #[arg(long)]
    dict: String,

    /// Input text file, one sentence per line
    #[arg(short, long)]
    input: String,

    /// Output file (JSONL) - optional, skip to benchmark only
    #[arg(short, long)]
    output: Option<String>,

    /// Separator inserted between segments in the JSONL `joined` field
    #[arg(long, default_value = "\u{200b}")]
    separator: String,

    /// Limit the number of lines processed
    #[arg(short, long)]
    limit: Option<usize>,

    /// Optional JSON file of SegmenterConfig toggles; defaults to all on
    #[arg(long)]
    config: Option<String>,
}

fn load_config(path: &Option<String>) -> anyhow::Result<SegmenterConfig> {
    match path {
        None => Ok(SegmenterConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

const HEX_DIGITS: &[u8] = b"0123456789abcdef";

thread_local! {
    static JSON_BUFFER: RefCell<String> = RefCell::new(String::with_capacity(1024));
}

/// Fast JSON string escaper - appends directly to buffer
#[inline]
fn escape_json_to(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let code = c as u8;
                out.push_str("\\u00");
                out.push(HEX_DIGITS[(code >> 4) as usize] as char);
                out.push(HEX_DIGITS[(code & 0xF) as usize] as char);
            }
            c => out.push(c),
        }
    }
}

#[inline]
fn append_int(out: &mut String, val: usize) {
    if val == 0 {
        out.push('0');
        return;
    }
    let mut buf = [0u8; 20];
    let mut i = 20;
    let mut v = val;
    while v > 0 {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    for j in i..20 {
        out.push(buf[j] as char);
    }
}

/// Build JSON record directly using a thread-local buffer, a fast-path
/// JSON writer avoiding `serde_json`'s per-record allocation.
#[inline]
fn build_json_record(id: usize, input: &str, segments: &[String], separator: &str) -> String {
    JSON_BUFFER.with(|buf| {
        let mut buffer = buf.borrow_mut();
        buffer.clear();

        buffer.push_str("{\"id\":");
        append_int(&mut buffer, id);
        buffer.push_str(",\"input\":\"");
        escape_json_to(&mut buffer, input);
        buffer.push_str("\",\"segments\":[");

        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                buffer.push(',');
            }
            buffer.push('"');
            escape_json_to(&mut buffer, seg);
            buffer.push('"');
        }

        buffer.push_str("],\"joined\":\"");
        escape_json_to(&mut buffer, &segments.join(separator));
        buffer.push_str("\"}");
        buffer.clone()
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = load_config(&args.config)?;

    println!("Loading dictionary: {}", args.dict);
    let start_load = Instant::now();
    let segmenter = Segmenter::load_with_config(&args.dict, config)?;
    println!("Dictionary loaded in {:.2}s", start_load.elapsed().as_secs_f32());

    println!("Reading source: {}", args.input);
    let file = File::open(&args.input)?;
    let reader = BufReader::new(file);
    let mut lines: Vec<String> = reader
        .lines()
        .collect::<Result<Vec<String>, _>>()?
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(limit) = args.limit {
        if limit < lines.len() {
            lines.truncate(limit);
        }
    }

    println!("Processing {} lines...", lines.len());
    let start_process = Instant::now();

    let results: Vec<String> = lines
        .par_iter()
        .enumerate()
        .map(|(i, line)| {
            let segments = segmenter.segment_str(line);
            build_json_record(i, line, &segments, &args.separator)
        })
        .collect();

    if let Some(ref output_path) = args.output {
        let output_file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(262144, output_file);
        for result in &results {
            writeln!(writer, "{}", result)?;
        }
        writer.flush()?;
    }

    let duration = start_process.elapsed();
    if let Some(ref output_path) = args.output {
        println!("Done. Saved to {}", output_path);
    }
    println!("Time taken: {:.2}s", duration.as_secs_f32());
    println!(
        "Speed: {:.2} lines/sec",
        lines.len() as f32 / duration.as_secs_f32()
    );

    Ok(())
}
