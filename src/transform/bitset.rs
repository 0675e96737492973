//! Presence-bitset codec
//!
//! Packs a set of bit positions into the smallest JSON shape that can hold
//! it: a bare 64-bit integer when every set bit is below 64 (the common
//! small-schema case, avoiding sequence overhead), otherwise an array of
//! 64-bit words, little end first, with trailing all-zero words omitted.
//! `unpack` accepts either shape.

use serde_json::Value;

use super::errors::{TransformError, TransformResult};
use super::json_kind;

/// Packs set bit positions into a bare integer or a word array.
///
/// An empty position set packs to the bare integer `0`.
pub fn pack(positions: &[u64]) -> Value {
    let mut words: Vec<u64> = Vec::new();
    for &pos in positions {
        let word = (pos / 64) as usize;
        if words.len() <= word {
            words.resize(word + 1, 0);
        }
        words[word] |= 1u64 << (pos % 64);
    }
    while words.last() == Some(&0) {
        words.pop();
    }

    match words.len() {
        0 => Value::from(0u64),
        1 => Value::from(words[0]),
        _ => Value::Array(words.into_iter().map(Value::from).collect()),
    }
}

/// Reconstructs the exact set bit positions, in ascending order.
pub fn unpack(packed: &Value) -> TransformResult<Vec<u64>> {
    let words: Vec<u64> = match packed {
        Value::Number(n) => vec![n
            .as_u64()
            .ok_or_else(|| TransformError::malformed("bitset word is not a u64"))?],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .ok_or_else(|| TransformError::malformed("bitset word is not a u64"))
            })
            .collect::<TransformResult<_>>()?,
        other => {
            return Err(TransformError::malformed(format!(
                "bitset must be an integer or an array of integers, got {}",
                json_kind(other)
            )))
        }
    };

    let mut positions = Vec::new();
    for (word_index, word) in words.iter().enumerate() {
        let mut remaining = *word;
        while remaining != 0 {
            let bit = remaining.trailing_zeros() as u64;
            positions.push(word_index as u64 * 64 + bit);
            remaining &= remaining - 1;
        }
    }
    Ok(positions)
}
