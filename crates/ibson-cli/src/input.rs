/// File loading shared by every sub-command.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ibson_wire::split_documents;

/// One document's bytes and where it starts in the file.
pub struct DocumentSlice<'a> {
    pub index: usize,
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Read a whole file.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Frame every document in `buf` by its length prefix.
///
/// # Errors
///
/// The framing error of the first document whose prefix is unusable,
/// with its absolute offset.
pub fn documents(buf: &[u8]) -> Result<Vec<DocumentSlice<'_>>> {
    split_documents(buf)
        .enumerate()
        .map(|(index, part)| {
            let (offset, bytes) =
                part.with_context(|| format!("cannot frame document {index}"))?;
            Ok(DocumentSlice {
                index,
                offset,
                bytes,
            })
        })
        .collect()
}
