use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use netrep_tools::{
    decode_capture, format_decode_pretty, inspect_capture, parse_manifest, InspectReport,
};

#[derive(Parser)]
#[command(
    name = "netrep-tools",
    version,
    about = "netrep channel capture inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarise message counts, signatures and sizes.
    Inspect {
        /// Capture file, or a directory of captures.
        capture_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected captures.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected captures (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode every message of a capture.
    Decode {
        /// Capture file.
        capture_file: PathBuf,
        /// Property manifest JSON used to name property sync entries.
        #[arg(long)]
        props: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            capture_path,
            glob,
            sort,
            limit,
        } => {
            if capture_path.is_dir() {
                let entries = collect_capture_entries(&capture_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let report = inspect_file(&entry.path)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&report);
                }
            } else {
                let report = inspect_file(&capture_path)?;
                print_inspect_report(&report);
            }
        }
        Command::Decode {
            capture_file,
            props,
            format,
        } => {
            let bytes = fs::read(&capture_file)
                .with_context(|| format!("read capture {}", capture_file.display()))?;
            let properties = props
                .as_deref()
                .map(load_manifest)
                .transpose()
                .context("load property manifest")?;
            let output = decode_capture(
                &bytes,
                properties.as_ref(),
                &wire::Limits::default(),
                &codec::CodecLimits::default(),
            )?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
    }
    Ok(())
}

fn inspect_file(path: &Path) -> Result<InspectReport> {
    let bytes = fs::read(path).with_context(|| format!("read capture {}", path.display()))?;
    inspect_capture(&bytes, &wire::Limits::default())
        .with_context(|| format!("inspect {}", path.display()))
}

fn load_manifest(path: &Path) -> Result<schema::PropertySet> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    parse_manifest(&contents)
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(CaptureEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<CaptureEntry>,
    sort: Option<InspectSort>,
) -> Vec<CaptureEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "messages: {} ({} bytes, {} payload bytes)",
        report.messages, report.total_bytes, report.payload_bytes
    );
    println!(
        "init: {} signature defs: {} calls: {} malformed: {}",
        report.inits, report.signature_defs, report.calls, report.malformed
    );
    if !report.signatures.is_empty() {
        println!("signatures:");
        for (id, signature) in &report.signatures {
            println!("  #{id} = {signature}");
        }
    }
    if !report.calls_by_signature.is_empty() {
        println!("calls by signature:");
        let mut counts: Vec<_> = report.calls_by_signature.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (signature, count) in counts {
            println!("  {signature}: {count}");
        }
    }
}
