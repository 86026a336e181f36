//! Lenient deserializers for form-style request bodies.
//!
//! Browser forms submit every value as text and leave untouched fields as
//! `""`. These helpers accept either the typed JSON value or its text form,
//! and read blank text as an absent value.

use serde::{Deserialize, Deserializer, de::Error as _};
use std::{fmt::Display, str::FromStr};

#[derive(Deserialize)]
#[serde(untagged)]
enum TypedOrText<T> {
    Typed(T),
    Text(String),
}

/// Deserializes an optional `T` from its JSON form, its text form, `""` or `null`.
///
/// # Errors
///
/// Fails when the value is neither a `T` nor text that parses as one.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<TypedOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TypedOrText::Typed(value)) => Ok(Some(value)),
        Some(TypedOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid value \"{text}\": {e}")))
        }
    }
}

/// Like [`optional`], falling back to `T::default()` for blank or missing values.
///
/// # Errors
///
/// Same as [`optional`].
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Default,
    T::Err: Display,
{
    optional(deserializer).map(Option::unwrap_or_default)
}
