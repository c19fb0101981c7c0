use std::fmt;

/// Address of one logical record: `namespace:id_a:id_b`.
///
/// Built fresh for every call and never cached. The rendering is a pure
/// function of its three parts, so writers and readers of one deployment
/// always agree on the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey<'a> {
    pub namespace: &'a str,
    pub id_a: u64,
    pub id_b: u64,
}

impl<'a> CompositeKey<'a> {
    pub const DELIMITER: char = ':';

    pub fn new(namespace: &'a str, id_a: u64, id_b: u64) -> Self {
        Self {
            namespace,
            id_a,
            id_b,
        }
    }
}

impl fmt::Display for CompositeKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.namespace,
            Self::DELIMITER,
            self.id_a,
            Self::DELIMITER,
            self.id_b
        )
    }
}
