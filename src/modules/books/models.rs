use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Store-assigned identifier of a book.
pub type BookId = i64;

/// Caller-editable attributes of a book.
///
/// Doubles as the request payload for create and update: any attribute
/// missing from the JSON body, or sent as `null`, takes its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct BookFields {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publisher: String,
    /// `YYYY-Mon-DD`, e.g. `2010-Dec-26`. Kept as text to preserve the
    /// external format exactly.
    #[serde(deserialize_with = "null_as_default")]
    pub publish_date: String,
    /// `0` means unrated, otherwise `1..=3`.
    #[serde(deserialize_with = "null_as_default")]
    pub rating: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub checked_out: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: BookFields,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Soft-delete marker. Always `None` for books returned by finds.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}
