/// Implementation of `ibson validate`.
///
/// Fully decodes every document in the file and reports either a series
/// of success checkmarks (`✓`) or a diagnostic for the first failure
/// (`✗`). The main dispatcher turns the failure into exit code 1.
///
/// # Success output
///
/// ```text
/// ✓ Framing: 3 documents, 1412 bytes
/// ✓ Structure: 57 elements in 9 containers, max depth 2
/// ✓ Queue: 9 jobs enqueued, 9 processed
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: document 1 at offset 410: unknown element type 0x42 at offset 37 (file offset 447)
/// ```
use anyhow::{Result, anyhow};
use ibson_decoder::{DecodeError, DecodeStats, DecoderConfig, IterDecoder, NoopObserver, Utf8Mode};

use crate::ValidateArgs;
use crate::input;

/// Run the `ibson validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any document fails
/// structural validation.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes = input::read(&args.file)?;

    let docs = match input::documents(&bytes) {
        Ok(docs) => docs,
        Err(e) => {
            println!("✗ Error: {e:#}");
            return Err(anyhow!("validation failed"));
        }
    };

    let utf8 = if args.lossy {
        Utf8Mode::Lossy
    } else {
        Utf8Mode::Strict
    };
    let decoder = IterDecoder::new(DecoderConfig::default().with_utf8(utf8));

    let mut totals = DecodeStats::default();
    for slice in &docs {
        match decoder.decode_observed(slice.bytes, &mut NoopObserver) {
            Ok(decoded) => {
                let stats = decoded.stats;
                totals.jobs_enqueued += stats.jobs_enqueued;
                totals.jobs_processed += stats.jobs_processed;
                totals.elements += stats.elements;
                totals.max_depth = totals.max_depth.max(stats.max_depth);
            }
            Err(e) => {
                println!(
                    "✗ Error: document {} at offset {}: {}",
                    slice.index,
                    slice.offset,
                    diagnostic(&e, slice.offset)
                );
                return Err(anyhow!("validation failed"));
            }
        }
    }

    println!(
        "✓ Framing: {} document{}, {} bytes",
        docs.len(),
        if docs.len() == 1 { "" } else { "s" },
        bytes.len()
    );
    println!(
        "✓ Structure: {} elements in {} containers, max depth {}",
        totals.elements, totals.jobs_processed, totals.max_depth
    );
    println!(
        "✓ Queue: {} jobs enqueued, {} processed",
        totals.jobs_enqueued, totals.jobs_processed
    );
    Ok(())
}

// ── Error formatting ──────────────────────────────────────────────────────────

/// The error's own message, plus its position in the file when it has one.
///
/// Decoder offsets are relative to the document; `base` is where the
/// document starts in the file.
fn diagnostic(e: &DecodeError, base: usize) -> String {
    match e.offset() {
        Some(offset) => format!("{e} (file offset {})", base + offset),
        None => e.to_string(),
    }
}
