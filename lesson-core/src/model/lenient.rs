//! Field readers for stored payloads.
//!
//! Each reader accepts any JSON value. A field of the wrong shape reads as
//! its default instead of failing the whole payload, so one bad field never
//! costs the rest of a block's content. Scalars are accepted where text is
//! expected.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::question::Question;

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .map(|v| scalar_text(v).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// Ids are strings, but older pages stored some as numbers
pub(crate) fn id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Entries keep their position; an unreadable entry becomes empty text
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(items(&Value::deserialize(deserializer)?))
}

/// Like [`string_list`], but `None` when there is no list at all
pub(crate) fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.is_array().then(|| items(&value)))
}

pub(crate) fn string_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows.iter().map(items).collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(true))
}

/// Questions are read one by one; only an entry that is not a question at
/// all is skipped
pub(crate) fn questions<'de, D>(deserializer: D) -> Result<Vec<Question>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(question) => Some(question),
            Err(err) => {
                log::warn!("skipping unreadable question: {}", err);
                None
            }
        })
        .collect())
}
