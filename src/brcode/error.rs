use thiserror::Error;

/// Errors from payload assembly and validation. All of them are local
/// and synchronous; nothing here is transient or retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrCodeError {
    /// Key is empty or does not fit the merchant account field.
    #[error("invalid PIX key: {0}")]
    InvalidPixKey(&'static str),

    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// A value longer than the 99 bytes a 2-digit length can declare.
    #[error("value of field {tag} is {len} bytes, limit is 99")]
    FieldOverflow { tag: &'static str, len: usize },

    /// Decoder: a TLV record that is truncated or garbled.
    #[error("malformed field at offset {offset}: {reason}")]
    MalformedField { offset: usize, reason: &'static str },

    /// Decoder: the declared CRC does not match the recomputed one.
    #[error("CRC mismatch: payload declares {declared}, computed {computed}")]
    ChecksumMismatch { declared: String, computed: String },
}
