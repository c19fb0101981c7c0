use crate::error::StoreResult;

/// Hash-oriented key-value store capability.
///
/// Both operations are single round trips. Implementations must not split a
/// call into several commands: batching is what makes a write or read atomic
/// with respect to the fields it touches.
pub trait HashStore {
    /// Sets every `(field, value)` pair on the hash at `key` in one command.
    fn multi_set(&mut self, key: &str, pairs: &[(u32, Vec<u8>)]) -> StoreResult<()>;

    /// Fetches `fields` from the hash at `key` in one command.
    ///
    /// The reply has one slot per requested field, in request order. A field
    /// with no stored value yields `None`.
    fn multi_get(&mut self, key: &str, fields: &[u32]) -> StoreResult<Vec<Option<Vec<u8>>>>;
}

impl<S: HashStore + ?Sized> HashStore for &mut S {
    fn multi_set(&mut self, key: &str, pairs: &[(u32, Vec<u8>)]) -> StoreResult<()> {
        (**self).multi_set(key, pairs)
    }

    fn multi_get(&mut self, key: &str, fields: &[u32]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        (**self).multi_get(key, fields)
    }
}

impl<S: HashStore + ?Sized> HashStore for Box<S> {
    fn multi_set(&mut self, key: &str, pairs: &[(u32, Vec<u8>)]) -> StoreResult<()> {
        (**self).multi_set(key, pairs)
    }

    fn multi_get(&mut self, key: &str, fields: &[u32]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        (**self).multi_get(key, fields)
    }
}
