/// Implementation of `ibson decode`.
///
/// Decodes every document of a `.bson` file and writes its extended-JSON
/// rendering (see [`crate::json`]) to stdout or `-o <file>`, one document
/// per line, or indented with `--pretty`.
///
/// # Input paths
///
/// ```text
/// ┌──────────────────────┬─────────────────────────────────────────────────┐
/// │ Invocation           │ Decoder                                         │
/// ├──────────────────────┼─────────────────────────────────────────────────┤
/// │ decode file.bson     │ IterDecoder, one document after another         │
/// │ decode --workers N   │ ParallelDecoder, N threads, output in file order│
/// │ decode -             │ DocumentStream over stdin, constant memory      │
/// └──────────────────────┴─────────────────────────────────────────────────┘
/// ```
///
/// The first failing document aborts the command; documents before it
/// have already been written.
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use ibson_decoder::{DecoderConfig, DocumentStream, IterDecoder, ParallelDecoder, Utf8Mode};
use ibson_types::Document;

use crate::DecodeArgs;
use crate::input;
use crate::json;

/// Run the `ibson decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the output cannot be
/// written, or any document fails to decode.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let config = config(args);
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if args.file.as_os_str() == "-" {
        decode_stdin(config, args.pretty, &mut out)?;
    } else {
        decode_file(args, config, &mut out)?;
    }
    out.flush().context("cannot flush output")
}

fn config(args: &DecodeArgs) -> DecoderConfig {
    let utf8 = if args.lossy {
        Utf8Mode::Lossy
    } else {
        Utf8Mode::Strict
    };
    DecoderConfig::default()
        .with_utf8(utf8)
        .with_max_depth(args.max_depth)
}

fn decode_file(args: &DecodeArgs, config: DecoderConfig, out: &mut dyn Write) -> Result<()> {
    let bytes = input::read(&args.file)?;
    let docs = input::documents(&bytes)?;
    tracing::debug!(documents = docs.len(), workers = args.workers, "decoding file");

    if args.workers > 1 {
        let decoder = ParallelDecoder::new(args.workers, config)?;
        let buffers = docs.iter().map(|d| d.bytes.to_vec()).collect();
        for (slice, result) in docs.iter().zip(decoder.decode_all(buffers)) {
            let doc = result.with_context(|| {
                format!("failed to decode document {} at offset {}", slice.index, slice.offset)
            })?;
            write_document(out, &doc, args.pretty)?;
        }
    } else {
        let decoder = IterDecoder::new(config);
        for slice in &docs {
            let doc = decoder.decode_with(slice.bytes).with_context(|| {
                format!("failed to decode document {} at offset {}", slice.index, slice.offset)
            })?;
            write_document(out, &doc, args.pretty)?;
        }
    }
    Ok(())
}

fn decode_stdin(config: DecoderConfig, pretty: bool, out: &mut dyn Write) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("cannot start async runtime")?;

    runtime.block_on(async {
        let mut stream = DocumentStream::with_config(tokio::io::stdin(), config);
        while let Some(result) = stream.next().await {
            let doc = result.with_context(|| {
                format!(
                    "failed to decode document {} at offset {}",
                    stream.documents(),
                    stream.document_offset()
                )
            })?;
            write_document(out, &doc, pretty)?;
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn write_document(out: &mut dyn Write, doc: &Document, pretty: bool) -> Result<()> {
    let rendered = json::document(doc);
    if pretty {
        serde_json::to_writer_pretty(&mut *out, &rendered)?;
    } else {
        serde_json::to_writer(&mut *out, &rendered)?;
    }
    writeln!(out).context("cannot write output")
}
