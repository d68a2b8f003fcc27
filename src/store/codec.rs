use std::collections::HashSet;

use tracing::warn;

use crate::error::DecodeError;

/// Decode a slot holding a JSON array of string ids. An absent slot is an
/// empty list.
pub fn decode_ids(raw: Option<&str>) -> Result<Vec<String>, DecodeError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => Ok(serde_json::from_str(raw)?),
    }
}

/// Encode ids as a JSON array.
pub fn encode_ids(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| String::from("[]"))
}

/// Decode for reading. Unreadable slots read as empty; the bad value is
/// replaced by the next write.
pub(crate) fn ids_or_default(key: &str, raw: Option<&str>) -> Vec<String> {
    decode_ids(raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "reading unreadable slot as empty");
        Vec::new()
    })
}

/// Drop repeated ids, keeping the first occurrence.
pub(crate) fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
