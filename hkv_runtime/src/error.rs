use thiserror::Error;

/// A stored value could not be turned back into its field type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid {target} value {text:?}")]
    InvalidNumber { target: &'static str, text: String },

    #[error("invalid bool value {0:?}")]
    InvalidBool(String),

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("opaque value decode failed: {0}")]
    Opaque(#[source] bincode::Error),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("opaque value encode failed: {0}")]
    Opaque(#[source] bincode::Error),
}

/// Per-field failure reported by generated `HashRecord` implementations.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("unknown field tag {0}")]
    UnknownField(u32),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors from the store capability. Propagated to callers unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with an error reply.
    #[error("server error: {0}")]
    Server(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single `write_fields` / `read_fields` call.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("unknown field tag {tag} for message {message}")]
    UnknownField { message: &'static str, tag: u32 },

    #[error("failed to decode {message}.{field} (tag {tag}): {source}")]
    Decode {
        message: &'static str,
        field: &'static str,
        tag: u32,
        #[source]
        source: DecodeError,
    },

    #[error("failed to encode {message}.{field} (tag {tag}): {source}")]
    Encode {
        message: &'static str,
        field: &'static str,
        tag: u32,
        #[source]
        source: EncodeError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AccessError {
    /// Attaches message and field context to a per-field error.
    pub fn from_field(
        message: &'static str,
        field: &'static str,
        tag: u32,
        err: FieldError,
    ) -> Self {
        match err {
            FieldError::UnknownField(tag) => AccessError::UnknownField { message, tag },
            FieldError::Decode(source) => AccessError::Decode {
                message,
                field,
                tag,
                source,
            },
            FieldError::Encode(source) => AccessError::Encode {
                message,
                field,
                tag,
                source,
            },
        }
    }

    /// Tag of the selector the call failed on, when the failure is field-specific.
    pub fn tag(&self) -> Option<u32> {
        match self {
            AccessError::UnknownField { tag, .. }
            | AccessError::Decode { tag, .. }
            | AccessError::Encode { tag, .. } => Some(*tag),
            AccessError::Store(_) => None,
        }
    }
}
