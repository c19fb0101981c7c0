use crate::error::StoreResult;
use crate::store::HashStore;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    MultiSet,
    MultiGet,
}

/// One command received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCommand {
    pub kind: CommandKind,
    pub key: String,
    pub fields: Vec<u32>,
}

/// In-process hash store.
///
/// Keeps a log of every command it serves so callers can check how many
/// round trips an operation took.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: HashMap<String, HashMap<u32, Vec<u8>>>,
    log: Vec<StoreCommand>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[StoreCommand] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn hash(&self, key: &str) -> Option<&HashMap<u32, Vec<u8>>> {
        self.hashes.get(key)
    }

    pub fn raw_field(&self, key: &str, field: u32) -> Option<&[u8]> {
        self.hashes
            .get(key)
            .and_then(|hash| hash.get(&field))
            .map(Vec::as_slice)
    }

    /// Stores a value without logging a command.
    pub fn insert_raw(&mut self, key: &str, field: u32, value: impl Into<Vec<u8>>) {
        self.hashes
            .entry(key.to_owned())
            .or_default()
            .insert(field, value.into());
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl HashStore for MemoryStore {
    fn multi_set(&mut self, key: &str, pairs: &[(u32, Vec<u8>)]) -> StoreResult<()> {
        self.log.push(StoreCommand {
            kind: CommandKind::MultiSet,
            key: key.to_owned(),
            fields: pairs.iter().map(|(field, _)| *field).collect(),
        });
        let hash = self.hashes.entry(key.to_owned()).or_default();
        for (field, value) in pairs {
            hash.insert(*field, value.clone());
        }
        Ok(())
    }

    fn multi_get(&mut self, key: &str, fields: &[u32]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        self.log.push(StoreCommand {
            kind: CommandKind::MultiGet,
            key: key.to_owned(),
            fields: fields.to_vec(),
        });
        let hash = self.hashes.get(key);
        Ok(fields
            .iter()
            .map(|field| hash.and_then(|h| h.get(field)).cloned())
            .collect())
    }
}
