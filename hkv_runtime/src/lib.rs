//! Runtime support for generated hash accessors.
//!
//! Generated code implements [`HashRecord`] for every message and forwards its
//! `set_fields` / `get_fields` methods to [`write_fields`] and [`read_fields`].
//! Those two functions own the whole wire contract: one composite key per
//! record, one batched command per call, per-field codecs chosen at build time.
//!
//! The store itself is a capability supplied by the caller through
//! [`HashStore`]. [`MemoryStore`] backs tests and embedding, [`RespConnection`]
//! speaks RESP2 to a Redis-compatible server.

pub mod codec;
pub mod error;
pub mod key;
pub mod memory;
pub mod record;
pub mod resp;
pub mod store;

pub use error::{AccessError, DecodeError, EncodeError, FieldError, StoreError, StoreResult};
pub use key::CompositeKey;
pub use memory::{CommandKind, MemoryStore, StoreCommand};
pub use record::{read_fields, write_fields, HashRecord};
pub use resp::{ConnectOptions, RespConnection, RespValue};
pub use store::HashStore;
