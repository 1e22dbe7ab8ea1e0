//! `stmtocr convert`: submit statements, report each session, write CSVs.

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stmtocr_core::{Applied, FileSession, StatementSummary, Status};
use stmtocr_extract::{CSV_MIME, ExtractionConfig, GeminiExtractor, Tracker, converted_file_name, to_csv};
use stmtocr_ingest::{RawFile, ReadError};
use tracing::{info, warn};

pub struct ConvertOptions {
    pub files: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub export: bool,
}

pub async fn run_convert(opts: ConvertOptions, extraction: ExtractionConfig) -> Result<()> {
    let mut raw = Vec::new();
    for path in &opts.files {
        match RawFile::from_path(path) {
            Ok(f) => raw.push(f),
            Err(e @ ReadError::Unsupported(_)) => {
                warn!(path = %path.display(), "skipping unsupported file");
                eprintln!("Skipping {}: {e}", path.display());
            }
            Err(e) => return Err(e).with_context(|| format!("opening {}", path.display())),
        }
    }

    if raw.is_empty() {
        bail!("no image or PDF statements to process");
    }

    let mut tracker = Tracker::new(Arc::new(GeminiExtractor::new(extraction)));
    let ids = tracker.submit(raw);
    println!("Processing {} file(s)...\n", ids.len());

    while tracker.store().in_flight() > 0 {
        let Some((id, applied)) = tracker.next_update().await else {
            break;
        };
        if let (Applied::Updated(_), Some(session)) = (applied, tracker.get(&id)) {
            println!("{}", status_line(session));
        }
    }

    let mut failed = 0;
    let mut written = HashSet::new();
    for session in tracker.sessions() {
        match session.status {
            Status::Completed => {
                println!("\n{}", summary_block(session));
                if opts.export {
                    let csv = to_csv(&session.transactions)
                        .with_context(|| format!("exporting {}", session.name))?;
                    let file_name = unique_export_name(&session.name, &mut written);
                    let path = write_csv(&opts.out_dir, &file_name, &csv)?;
                    println!("  wrote {}", path.display());
                }
            }
            Status::Error => failed += 1,
            Status::Pending | Status::Processing => {}
        }
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) failed", ids.len());
    }
    Ok(())
}

fn status_line(session: &FileSession) -> String {
    match session.status {
        Status::Completed => format!(
            "[completed] {} ({} transactions)",
            session.name,
            session.transactions.len()
        ),
        Status::Error => format!(
            "[error] {}: {}",
            session.name,
            session.error_message.as_deref().unwrap_or("unknown error")
        ),
        other => format!("[{other}] {}", session.name),
    }
}

fn summary_block(session: &FileSession) -> String {
    if session.transactions.is_empty() {
        return format!("## {}\n  No transactions found", session.name);
    }

    let s = StatementSummary::from_transactions(&session.transactions);
    let mut out = format!(
        "## {}\n  transactions={} | credits=+{:.2} | debits={:.2} | net={:.2}",
        session.name,
        s.count,
        s.total_credits,
        s.total_debits,
        s.net()
    );
    if let (Some(first), Some(last)) = (s.earliest, s.latest) {
        out.push_str(&format!("\n  period {first} .. {last}"));
    }
    out
}

/// `<stem>_converted.csv`, suffixed `_2`, `_3`, ... when an earlier input in
/// this run already claimed the name.
fn unique_export_name(name: &str, written: &mut HashSet<String>) -> String {
    let base = converted_file_name(name);
    let mut candidate = base.clone();
    let mut n = 1;
    while written.contains(&candidate) {
        n += 1;
        candidate = format!("{}_{n}.csv", base.trim_end_matches(".csv"));
    }
    if n > 1 {
        warn!(file = %name, export = %candidate, "export name already used in this run");
        eprintln!("Warning: {base} already written; saving {name} as {candidate}");
    }
    written.insert(candidate.clone());
    candidate
}

/// Persist an exported CSV; the CLI's equivalent of a browser download.
pub fn write_csv(dir: &Path, file_name: &str, csv: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, csv).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = csv.len(), mime = CSV_MIME, "exported csv");
    Ok(path)
}
