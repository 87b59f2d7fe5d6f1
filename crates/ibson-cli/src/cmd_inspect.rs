/// Implementation of `ibson inspect`.
///
/// Walks each document with [`traverse`], without building a tree, and
/// prints one line per element: its type, name, absolute value offset in
/// the file, value length and a hex preview of leaf values. Indentation
/// follows nesting depth; with the default LIFO order the walk is
/// depth-first.
///
/// # Output format
///
/// ```text
/// Document 0 at offset 0 (37 bytes)
///   string              name             @10       8 bytes  04000000 61646100
///   array               tags             @24      12 bytes  […]
///     int               0                @31       4 bytes  01000000
/// ---
/// 1 document, 3 elements
/// ```
use anyhow::{Context, Result, anyhow};
use ibson_decoder::{ElementEvent, TraversalOrder, traverse};
use ibson_types::ElementType;

use crate::InspectArgs;
use crate::input;

/// Leaf bytes shown before the preview is cut off.
const PREVIEW_BYTES: usize = 12;

/// Run the `ibson inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, `--order` is not
/// recognised, `--document` is out of range, or a document is
/// structurally invalid.
pub fn run(args: &InspectArgs) -> Result<()> {
    let order = parse_order(&args.order)?;
    let bytes = input::read(&args.file)?;
    let docs = input::documents(&bytes)?;

    if let Some(target) = args.document
        && target >= docs.len()
    {
        return Err(anyhow!(
            "document {target} out of range ({} document{} in file)",
            docs.len(),
            if docs.len() == 1 { "" } else { "s" }
        ));
    }

    let mut shown = 0;
    let mut elements = 0;
    for slice in &docs {
        // When --document N is specified, skip all other indices.
        if let Some(target) = args.document
            && slice.index != target
        {
            continue;
        }

        println!(
            "Document {} at offset {} ({} bytes)",
            slice.index,
            slice.offset,
            slice.bytes.len()
        );
        let mut observer = |event: &ElementEvent| {
            println!("{}", element_line(event, slice.bytes, slice.offset));
        };
        let stats = traverse(slice.bytes, order, &mut observer).with_context(|| {
            format!("failed to walk document {} at offset {}", slice.index, slice.offset)
        })?;
        shown += 1;
        elements += stats.elements;
    }

    println!("---");
    println!(
        "{shown} document{}, {elements} element{}",
        if shown == 1 { "" } else { "s" },
        if elements == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Parse the `--order` flag.
fn parse_order(s: &str) -> Result<TraversalOrder> {
    match s {
        "lifo" => Ok(TraversalOrder::Lifo),
        "fifo" => Ok(TraversalOrder::Fifo),
        other => Err(anyhow!("unknown order {other:?}; expected lifo or fifo")),
    }
}

// ── Element formatting ────────────────────────────────────────────────────────

/// One output line for `event`. `doc` is the document the event's offsets
/// are relative to and `base` is where that document starts in the file.
fn element_line(event: &ElementEvent, doc: &[u8], base: usize) -> String {
    let indent = "  ".repeat(event.depth + 1);
    let name = String::from_utf8_lossy(event.name(doc));
    let preview = match event.element_type {
        ElementType::Array => "[…]".to_string(),
        ElementType::Document | ElementType::CodeWithScope => "{…}".to_string(),
        _ => hex_preview(event.value(doc)),
    };
    format!(
        "{indent}{:<20}{name:<17}@{:<6}{:>5} bytes  {preview}",
        event.element_type.name(),
        base + event.value_offset,
        event.value_length,
    )
}

/// Space-separated hex of up to [`PREVIEW_BYTES`] bytes in groups of four.
fn hex_preview(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(PREVIEW_BYTES)];
    let mut out = shown
        .chunks(4)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > PREVIEW_BYTES {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibson_decoder::{ContainerKind, NodeId};

    #[test]
    fn order_names() {
        assert_eq!(parse_order("lifo").unwrap(), TraversalOrder::Lifo);
        assert_eq!(parse_order("fifo").unwrap(), TraversalOrder::Fifo);
        assert!(parse_order("dfs").is_err());
    }

    #[test]
    fn preview_groups_and_truncates() {
        assert_eq!(hex_preview(&[1, 0, 0, 0]), "01000000");
        assert_eq!(hex_preview(&[0xAB; 6]), "abababab abab");
        let long = hex_preview(&[0; 20]);
        assert!(long.ends_with('…'));
        assert_eq!(long.matches(' ').count(), 2);
    }

    #[test]
    fn line_uses_absolute_offsets() {
        // { "a": 1i32 }
        let doc = [0x0C, 0, 0, 0, 0x10, b'a', 0, 0x01, 0, 0, 0, 0];
        let event = ElementEvent {
            container_offset: 0,
            container_length: 12,
            container_kind: ContainerKind::Map,
            container_node: NodeId::ROOT,
            depth: 0,
            element_type: ElementType::Int32,
            name_offset: 5,
            name_length: 1,
            value_offset: 7,
            value_length: 4,
        };
        let line = element_line(&event, &doc, 100);
        assert!(line.starts_with("  int "));
        assert!(line.contains("@107 "));
        assert!(line.ends_with("4 bytes  01000000"));
    }
}
