use crate::error::DecodeError;

pub fn encode_string(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn decode_string(raw: &[u8]) -> Result<String, DecodeError> {
    Ok(std::str::from_utf8(raw)?.to_owned())
}

pub fn encode_bool(value: bool) -> Vec<u8> {
    if value { b"1".to_vec() } else { b"0".to_vec() }
}

/// Accepts the spellings common Redis clients write for booleans.
pub fn decode_bool(raw: &[u8]) -> Result<bool, DecodeError> {
    match raw {
        b"1" | b"t" | b"T" | b"TRUE" | b"true" | b"True" => Ok(true),
        b"0" | b"f" | b"F" | b"FALSE" | b"false" | b"False" => Ok(false),
        _ => Err(DecodeError::InvalidBool(
            String::from_utf8_lossy(raw).into_owned(),
        )),
    }
}

/// Bytes are already a blob; they are stored verbatim.
pub fn encode_bytes(value: &[u8]) -> Vec<u8> {
    value.to_vec()
}

pub fn decode_bytes(raw: &[u8]) -> Vec<u8> {
    raw.to_vec()
}
