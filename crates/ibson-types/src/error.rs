/// Errors raised when interpreting raw wire values as typed ones.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A type byte outside the closed set of element types.
    ///
    /// There is no catch-all variant: without a known layout the value
    /// cannot be sized, so nothing after it in the container is readable.
    #[error("unknown element type: {value:#04X}")]
    UnknownElementType { value: u8 },
}
