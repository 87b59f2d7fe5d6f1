pub use ibson_wire::bytes::Utf8Mode;

/// Default cap on a single document read from a stream: 16 MiB, the
/// largest document MongoDB will store.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Decoder configuration.
///
/// All limits are checked before any work is done on the affected
/// container, so a rejected input never allocates past the limit.
///
/// ```text
/// ┌──────────────────────┬──────────────┬──────────────────────────────────┐
/// │ Field                │ Default      │ Effect                           │
/// ├──────────────────────┼──────────────┼──────────────────────────────────┤
/// │ utf8                 │ Strict       │ Lossy maps bad bytes to U+FFFD   │
/// │ max_depth            │ None         │ DepthLimitExceeded past the cap  │
/// │ allow_trailing_bytes │ false        │ ignore bytes after the root      │
/// │ max_document_size    │ 16 MiB       │ DocumentTooLarge on streams      │
/// └──────────────────────┴──────────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// How string payloads with invalid UTF-8 are handled.
    pub utf8: Utf8Mode,

    /// Maximum container nesting depth. The root document is depth 0.
    /// `None` means unbounded; the decoder never recurses, so deep inputs
    /// only cost heap.
    pub max_depth: Option<usize>,

    /// Accept input that continues past the root document's declared
    /// length. The extra bytes are ignored.
    pub allow_trailing_bytes: bool,

    /// Largest document [`DocumentStream`](crate::DocumentStream) will
    /// buffer.
    pub max_document_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            utf8: Utf8Mode::Strict,
            max_depth: None,
            allow_trailing_bytes: false,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_utf8(mut self, utf8: Utf8Mode) -> Self {
        self.utf8 = utf8;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[must_use]
    pub fn with_trailing_bytes(mut self, allow: bool) -> Self {
        self.allow_trailing_bytes = allow;
        self
    }

    #[must_use]
    pub fn with_max_document_size(mut self, limit: usize) -> Self {
        self.max_document_size = limit;
        self
    }
}
