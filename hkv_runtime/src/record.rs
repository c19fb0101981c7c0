use crate::error::{AccessError, FieldError};
use crate::key::CompositeKey;
use crate::store::HashStore;
use tracing::debug;

/// Field-addressable message, implemented by generated code.
///
/// `encode_field` and `decode_field` are total over the message's tags and
/// return [`FieldError::UnknownField`] for anything else.
pub trait HashRecord {
    const MESSAGE_NAME: &'static str;

    fn field_name(tag: u32) -> Option<&'static str>;

    fn encode_field(&self, tag: u32) -> Result<Vec<u8>, FieldError>;

    fn decode_field(&mut self, tag: u32, value: &[u8]) -> Result<(), FieldError>;
}

fn check_tag<R: HashRecord>(tag: u32) -> Result<&'static str, AccessError> {
    R::field_name(tag).ok_or(AccessError::UnknownField {
        message: R::MESSAGE_NAME,
        tag,
    })
}

/// Stores the selected fields of `record` with one `multi_set`.
///
/// Every field is encoded before the store is touched, so an unknown
/// selector or encode failure leaves the stored hash unchanged.
pub fn write_fields<S, R, F>(
    store: &mut S,
    key: &CompositeKey<'_>,
    record: &R,
    fields: &[F],
) -> Result<(), AccessError>
where
    S: HashStore + ?Sized,
    R: HashRecord,
    F: Copy + Into<u32>,
{
    if fields.is_empty() {
        return Ok(());
    }
    let mut pairs = Vec::with_capacity(fields.len());
    for field in fields {
        let tag = (*field).into();
        let name = check_tag::<R>(tag)?;
        let value = record
            .encode_field(tag)
            .map_err(|e| AccessError::from_field(R::MESSAGE_NAME, name, tag, e))?;
        pairs.push((tag, value));
    }
    let key = key.to_string();
    debug!(message = R::MESSAGE_NAME, %key, fields = pairs.len(), "write fields");
    store.multi_set(&key, &pairs)?;
    Ok(())
}

/// Loads the selected fields into `record` with one `multi_get`.
///
/// Fields with no stored value keep their current value. The first value
/// that fails to decode aborts the call; fields decoded before it stay
/// updated.
pub fn read_fields<S, R, F>(
    store: &mut S,
    key: &CompositeKey<'_>,
    record: &mut R,
    fields: &[F],
) -> Result<(), AccessError>
where
    S: HashStore + ?Sized,
    R: HashRecord,
    F: Copy + Into<u32>,
{
    if fields.is_empty() {
        return Ok(());
    }
    let mut requested = Vec::with_capacity(fields.len());
    for field in fields {
        let tag = (*field).into();
        requested.push((tag, check_tag::<R>(tag)?));
    }
    let tags: Vec<u32> = requested.iter().map(|(tag, _)| *tag).collect();
    let key = key.to_string();
    debug!(message = R::MESSAGE_NAME, %key, fields = tags.len(), "read fields");
    let values = store.multi_get(&key, &tags)?;
    if values.len() != tags.len() {
        return Err(crate::error::StoreError::Protocol(format!(
            "store returned {} values for {} fields",
            values.len(),
            tags.len()
        ))
        .into());
    }
    for ((tag, name), value) in requested.into_iter().zip(values) {
        let Some(value) = value else {
            continue;
        };
        record
            .decode_field(tag, &value)
            .map_err(|e| AccessError::from_field(R::MESSAGE_NAME, name, tag, e))?;
    }
    Ok(())
}
