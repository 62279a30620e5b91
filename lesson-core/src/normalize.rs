//! Canonicalization of block lists at every ingestion boundary.
//!
//! After normalization every block has a non-empty id that is unique within
//! the list, a type (the legacy `paragraph` is read as `intro`), and a
//! payload that satisfies its type's invariants. Blocks of a type this crate
//! does not know are carried through untouched. Normalizing an already
//! normalized list changes nothing.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::{BlockData, BlockId, BlockType, ContentBlock, RawBlock, UnknownData};

/// Normalize a list of stored blocks.
///
/// Order is kept. Only entries without any type name are dropped.
pub fn normalize(raw: Vec<RawBlock>) -> Vec<ContentBlock> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|block| normalize_block(block, &mut seen))
        .collect()
}

/// Normalize arbitrary JSON. Anything that is not an array of block-shaped
/// objects contributes no blocks.
pub fn normalize_value(value: &Value) -> Vec<ContentBlock> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            log::warn!("expected a list of blocks, got {}", json_kind(value));
        }
        return Vec::new();
    };

    let raw = items
        .iter()
        .filter_map(|item| match RawBlock::deserialize(item) {
            Ok(raw) if item.is_object() => Some(raw),
            Ok(_) => {
                log::warn!("skipping {} in block list", json_kind(item));
                None
            }
            Err(err) => {
                log::warn!("skipping unreadable block: {}", err);
                None
            }
        })
        .collect();
    normalize(raw)
}

/// Re-run normalization over blocks that are already typed.
///
/// Only ids and payload invariants can be off here; the type is fixed by
/// construction. Returns true if anything was repaired.
pub fn renormalize(blocks: &mut [ContentBlock]) -> bool {
    let mut seen = HashSet::new();
    let mut repaired = false;
    for block in blocks.iter_mut() {
        if !seen.insert(block.id().clone()) {
            let fresh = BlockId::generate();
            log::warn!("duplicate block id {}, reassigned {}", block.id(), fresh);
            seen.insert(fresh.clone());
            block.reassign_id(fresh);
            repaired = true;
        }
        repaired |= block.data.canonicalize();
    }
    repaired
}

fn normalize_block(raw: RawBlock, seen: &mut HashSet<BlockId>) -> Option<ContentBlock> {
    if raw.kind.trim().is_empty() {
        log::warn!("dropping block without a type");
        return None;
    }

    let data = match BlockType::from_wire(&raw.kind) {
        Some(kind) => {
            let mut data = BlockData::from_value(kind, raw.data);
            if data.canonicalize() {
                log::warn!("repaired {} payload", kind);
            }
            data
        }
        None => {
            log::warn!("keeping block of unknown type {:?} unchanged", raw.kind);
            BlockData::Unknown(UnknownData {
                kind: raw.kind,
                data: raw.data,
            })
        }
    };

    let id = match raw.id.as_deref().and_then(BlockId::parse) {
        Some(id) if !seen.contains(&id) => id,
        Some(id) => {
            log::warn!("duplicate block id {}, assigning a fresh one", id);
            BlockId::generate()
        }
        None => BlockId::generate(),
    };
    seen.insert(id.clone());

    Some(ContentBlock::with_id(id, data))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// serde adapter: read a block list through the normalizer
pub(crate) fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(normalize_value(&value))
}
