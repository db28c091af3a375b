//! Field rules applied to a candidate book before it is written.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use super::models::BookFields;

/// Longest accepted `title`, `author` and `publisher`, in characters.
pub const MAX_TEXT_LEN: usize = 255;

const TOO_LONG: &str = "too long";

/// `2010-Dec-26`
const PUBLISH_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month repr:short]-[day]");

/// Field-keyed complaints returned to the caller verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(BTreeMap<&'static str, Value>);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    fn insert(&mut self, field: &'static str, detail: impl Into<Value>) {
        self.0.insert(field, detail.into());
    }

    /// Diagnostics for a request body that could not be read as a book.
    pub fn malformed_body(err: &serde_json::Error) -> Self {
        let mut diagnostics = Self::default();
        diagnostics.insert("body", err.to_string());
        diagnostics
    }
}

impl From<Diagnostics> for Value {
    fn from(diagnostics: Diagnostics) -> Self {
        Value::Object(
            diagnostics
                .0
                .into_iter()
                .map(|(field, detail)| (field.to_string(), detail))
                .collect(),
        )
    }
}

/// Check every rule and report all violations together.
///
/// An empty `publish_date` does not parse and is therefore reported; callers
/// that only want to check a supplied date must guard the call themselves.
pub fn validate(book: &BookFields) -> Result<(), Diagnostics> {
    let mut diagnostics = Diagnostics::default();

    for (field, value) in [
        ("title", &book.title),
        ("author", &book.author),
        ("publisher", &book.publisher),
    ] {
        if value.chars().count() > MAX_TEXT_LEN {
            diagnostics.insert(field, TOO_LONG);
        }
    }

    if !is_valid_rating(book.rating) {
        diagnostics.insert("rating", book.rating);
    }

    if !is_valid_publish_date(&book.publish_date) {
        diagnostics.insert("publish_date", book.publish_date.as_str());
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn is_valid_rating(rating: i64) -> bool {
    rating == 0 || (1..=3).contains(&rating)
}

/// `[year]` also takes a leading sign, which `YYYY-Mon-DD` does not allow.
fn is_valid_publish_date(raw: &str) -> bool {
    raw.as_bytes().first().is_some_and(u8::is_ascii_digit)
        && Date::parse(raw, PUBLISH_DATE_FORMAT).is_ok()
}
