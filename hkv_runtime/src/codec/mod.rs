//! Field codecs used by generated accessors.
//!
//! * [`numeric`]: integers, floats and enum values as decimal text.
//! * [`plain`]: strings, bools and raw bytes with no extra encoding layer.
//! * [`opaque`]: structure-preserving binary encoding for nested messages,
//!   repeated fields and maps.
//!
//! A generated unit imports only the modules its fields need.

pub mod numeric;
pub mod opaque;
pub mod plain;
