//! Decoders for numeric fields that older documents store as doubles or
//! strings. Values that cannot be read as a whole number decode as absent
//! instead of failing the whole document.

use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer};

fn whole_number(value: Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(n)),
        Bson::Int64(n) => Some(n),
        Bson::Double(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(value
        .and_then(whole_number)
        .and_then(|n| T::try_from(n).ok()))
}

/// Like [`int`], with absent values counting as zero.
pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(int(deserializer)?.unwrap_or_default())
}
