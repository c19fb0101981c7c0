use crate::error::{DecodeError, EncodeError};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Upper bound for a single opaque value; matches the largest Redis string.
pub const MAX_OPAQUE_LEN: u64 = 512 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_OPAQUE_LEN)
        .reject_trailing_bytes()
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    options().serialize(value).map_err(EncodeError::Opaque)
}

pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    options().deserialize(raw).map_err(DecodeError::Opaque)
}
