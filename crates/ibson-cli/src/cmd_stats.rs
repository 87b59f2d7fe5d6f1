/// Implementation of `ibson stats`.
///
/// Decodes every document with an observer attached and prints a report
/// of file size, document and element counts, nesting depth, work-queue
/// high-water mark and the element-type distribution.
///
/// # Example output
///
/// ```text
/// File:        dump.bson  (1412 bytes)
/// Documents:   3
/// Elements:    57 in 9 containers
/// Max depth:   2
/// Max queue:   4 pending containers
///
/// Type                  Count   Bytes
/// ────────────────────────────────────
/// string                   21     402
/// int                      18      72
/// document                  6     311
/// ────────────────────────────────────
/// Total                    57     869
/// ```
///
/// `Bytes` sums value lengths, so nested values are also counted inside
/// their containers. `--json` prints the same report as a JSON object.
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ibson_decoder::{ElementEvent, IterDecoder};
use ibson_types::ElementType;
use serde::Serialize;

use crate::StatsArgs;
use crate::input;

/// Everything `ibson stats` reports.
#[derive(Debug, Default, Serialize)]
struct Report {
    bytes: usize,
    documents: usize,
    elements: usize,
    containers: usize,
    max_depth: usize,
    max_queue_len: usize,
    types: Vec<TypeCount>,
}

#[derive(Debug, Serialize)]
struct TypeCount {
    #[serde(rename = "type")]
    name: &'static str,
    count: usize,
    bytes: usize,
}

/// Run the `ibson stats` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any document fails to
/// decode.
pub fn run(args: &StatsArgs) -> Result<()> {
    let bytes = input::read(&args.file)?;
    let report = collect(&bytes)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File:        {}  ({} bytes)", args.file.display(), report.bytes);
    println!("Documents:   {}", report.documents);
    println!(
        "Elements:    {} in {} containers",
        report.elements, report.containers
    );
    println!("Max depth:   {}", report.max_depth);
    println!("Max queue:   {} pending containers", report.max_queue_len);
    println!();

    let sep = "─".repeat(36);
    println!("{:<20}{:>8}{:>8}", "Type", "Count", "Bytes");
    println!("{sep}");
    for t in &report.types {
        println!("{:<20}{:>8}{:>8}", t.name, t.count, t.bytes);
    }
    println!("{sep}");
    let total_bytes: usize = report.types.iter().map(|t| t.bytes).sum();
    println!("{:<20}{:>8}{:>8}", "Total", report.elements, total_bytes);

    Ok(())
}

/// Decode every document in `bytes` and aggregate the counters.
fn collect(bytes: &[u8]) -> Result<Report> {
    let docs = input::documents(bytes)?;
    let decoder = IterDecoder::default();

    let mut by_type: BTreeMap<ElementType, (usize, usize)> = BTreeMap::new();
    let mut report = Report {
        bytes: bytes.len(),
        documents: docs.len(),
        ..Report::default()
    };

    for slice in &docs {
        let mut observer = |event: &ElementEvent| {
            let entry = by_type.entry(event.element_type).or_default();
            entry.0 += 1;
            entry.1 += event.value_length;
        };
        let decoded = decoder
            .decode_observed(slice.bytes, &mut observer)
            .with_context(|| {
                format!("failed to decode document {} at offset {}", slice.index, slice.offset)
            })?;
        let stats = decoded.stats;
        report.elements += stats.elements;
        report.containers += stats.jobs_processed;
        report.max_depth = report.max_depth.max(stats.max_depth);
        report.max_queue_len = report.max_queue_len.max(stats.max_queue_len);
    }

    report.types = by_type
        .into_iter()
        .map(|(ty, (count, bytes))| TypeCount {
            name: ty.name(),
            count,
            bytes,
        })
        .collect();
    Ok(report)
}
