use crate::error::DecodeError;

/// Scalars stored as human-readable decimal text.
///
/// Integers use their canonical decimal form. Floats use the shortest text
/// that parses back to the identical value, so NaN, infinities and `-0.0`
/// survive a round trip.
pub trait Numeric: Sized + Copy {
    const TYPE_NAME: &'static str;

    fn to_text(self) -> String;

    fn from_text(text: &str) -> Option<Self>;
}

macro_rules! impl_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Numeric for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn to_text(self) -> String {
                    self.to_string()
                }

                fn from_text(text: &str) -> Option<Self> {
                    text.parse::<$ty>().ok()
                }
            }
        )*
    };
}

impl_numeric!(u32, u64, i32, i64, f32, f64);

pub fn encode<T: Numeric>(value: &T) -> Vec<u8> {
    value.to_text().into_bytes()
}

pub fn decode<T: Numeric>(raw: &[u8]) -> Result<T, DecodeError> {
    let invalid = || DecodeError::InvalidNumber {
        target: T::TYPE_NAME,
        text: String::from_utf8_lossy(raw).into_owned(),
    };
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    T::from_text(text).ok_or_else(invalid)
}
