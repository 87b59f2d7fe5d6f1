use ibson_types::Document;
use ibson_wire::WireError;
use ibson_wire::bytes::read_length;
use ibson_wire::header::{LENGTH_PREFIX_SIZE, MIN_DOCUMENT_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::DecoderConfig;
use crate::decoder::IterDecoder;
use crate::error::DecodeError;

/// Asynchronous decoder for a stream of back-to-back documents, such as a
/// `mongodump` `.bson` file or a socket carrying one document after
/// another.
///
/// Each call to [`next`](Self::next) reads exactly one document: the
/// 4-byte length prefix first, then the rest of the document into a
/// reused buffer, which is then decoded with [`IterDecoder`]. The length
/// is checked against [`DecoderConfig::max_document_size`] before
/// anything is allocated for the body.
///
/// Error offsets are relative to the failing document;
/// [`document_offset`](Self::document_offset) says where that document
/// starts in the stream. After the first error the stream yields nothing
/// more.
///
/// # Example
///
/// ```rust,no_run
/// use ibson_decoder::DocumentStream;
/// use tokio::io::AsyncRead;
///
/// async fn count(reader: impl AsyncRead + Unpin) -> usize {
///     let mut stream = DocumentStream::new(reader);
///     let mut n = 0;
///     while let Some(doc) = stream.next().await {
///         doc.unwrap();
///         n += 1;
///     }
///     n
/// }
/// ```
pub struct DocumentStream<R> {
    reader: R,
    decoder: IterDecoder,
    state: StreamState,
    /// Body buffer, reused across documents.
    buf: Vec<u8>,
    /// Stream offset of the document most recently started.
    document_offset: usize,
    /// Stream offset just past the last byte read.
    position: usize,
    documents: usize,
}

/// ```text
///   ReadPrefix ──(clean EOF or error)──▶ Done
///     │    ▲
///     └────┘ document decoded
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    ReadPrefix,
    Done,
}

impl<R: AsyncRead + Unpin> DocumentStream<R> {
    /// Stream documents with the default configuration.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            decoder: IterDecoder::new(config),
            state: StreamState::ReadPrefix,
            buf: Vec::with_capacity(4096),
            document_offset: 0,
            position: 0,
            documents: 0,
        }
    }

    /// Read and decode the next document.
    ///
    /// Returns `None` once the stream ends cleanly between documents or
    /// after an error has been reported.
    pub async fn next(&mut self) -> Option<Result<Document, DecodeError>> {
        if self.state == StreamState::Done {
            return None;
        }
        match self.read_document().await {
            Ok(Some(doc)) => {
                self.documents += 1;
                Some(Ok(doc))
            }
            Ok(None) => {
                self.state = StreamState::Done;
                None
            }
            Err(e) => {
                self.state = StreamState::Done;
                Some(Err(e))
            }
        }
    }

    /// Stream offset at which the most recent document started.
    #[must_use]
    pub fn document_offset(&self) -> usize {
        self.document_offset
    }

    /// Documents decoded so far.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.documents
    }

    async fn read_document(&mut self) -> Result<Option<Document>, DecodeError> {
        self.document_offset = self.position;

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let got = self.read_full(&mut prefix).await?;
        if got == 0 {
            return Ok(None);
        }
        if got < LENGTH_PREFIX_SIZE {
            return Err(DecodeError::MalformedLength {
                offset: 0,
                declared: 4,
                available: got,
            });
        }

        let length = read_length(&prefix, 0)?;
        if length < MIN_DOCUMENT_SIZE {
            return Err(DecodeError::Malformed(WireError::DocumentTooSmall { offset: 0, length }));
        }
        let limit = self.decoder.config().max_document_size;
        if length > limit {
            return Err(DecodeError::DocumentTooLarge { size: length, limit });
        }

        tracing::trace!(offset = self.document_offset, length, "stream document");

        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        buf.extend_from_slice(&prefix);
        buf.resize(length, 0);
        let got = self.read_full(&mut buf[LENGTH_PREFIX_SIZE..]).await;
        let result = match got {
            Ok(n) if n + LENGTH_PREFIX_SIZE < length => Err(DecodeError::MalformedLength {
                offset: 0,
                declared: i64::try_from(length).unwrap_or(i64::MAX),
                available: n + LENGTH_PREFIX_SIZE,
            }),
            Ok(_) => self.decoder.decode_with(&buf).map(Some),
            Err(e) => Err(e),
        };
        self.buf = buf;
        result
    }

    /// Fill `out` unless the stream ends first; returns the bytes read.
    async fn read_full(&mut self, out: &mut [u8]) -> Result<usize, DecodeError> {
        let mut filled = 0;
        while filled < out.len() {
            let n = self.reader.read(&mut out[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.position += filled;
        Ok(filled)
    }
}
