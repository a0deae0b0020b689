//! Batch generation of unique codes.
//!
//! A batch is `count` distinct codes of a fixed length sharing a normalized
//! prefix, with the remaining characters drawn uniformly from [`ALPHABET`].
//!
//! Generation is refused unless the suffix space holds at least
//! [`SAFETY_FACTOR`] times as many codes as requested. That is a birthday-style
//! heuristic, not a bound on collision probability: it keeps the share of the
//! space a batch occupies at or below 1%, so collisions between draws (and the
//! chance that a guessed code is valid) stay small.

use crate::types::{ALPHABET, Code, normalize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use thiserror::Error;

/// Minimum ratio between the suffix space and the batch size.
pub const SAFETY_FACTOR: u128 = 100;

/// Draws allowed per requested code before generation gives up.
///
/// With the space at least [`SAFETY_FACTOR`] times the batch, the expected
/// number of draws per code is below 1.02, so hitting this means the random
/// source is broken.
pub const MAX_DRAWS_PER_CODE: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeygenError {
    #[error("prefix is not in the code alphabet: {prefix}")]
    InvalidPrefix { prefix: String },

    #[error("key length {key_len} is shorter than prefix {prefix}")]
    PrefixTooLong { prefix: String, key_len: usize },

    #[error("batch size must be at least 1")]
    EmptyBatch,

    #[error("suffix space too small: keylen {key_len}, suffix {suffix_len}, size {size}")]
    KeylenTooShort {
        key_len: usize,
        suffix_len: usize,
        size: usize,
    },

    #[error("generated code is not valid: {0}")]
    InvalidCode(String),

    #[error("gave up after {draws} draws with {unique} of {size} unique codes")]
    DrawLimitExceeded {
        draws: usize,
        unique: usize,
        size: usize,
    },
}

/// Number of distinct suffixes of `suffix_len` symbols, or `None` if it does
/// not fit in a `u128` (which is more than any batch can need).
fn suffix_space(suffix_len: usize) -> Option<u128> {
    let exp = u32::try_from(suffix_len).ok()?;
    (ALPHABET.len() as u128).checked_pow(exp)
}

/// Returns `true` if `suffix_len` random symbols leave enough room for `count`
/// codes.
pub fn has_room(suffix_len: usize, count: usize) -> bool {
    let needed = count as u128 * SAFETY_FACTOR;
    suffix_space(suffix_len).is_none_or(|space| space >= needed)
}

/// Generates `count` unique codes of `key_len` characters starting with the
/// normalized `prefix`, sorted ascending.
///
/// The random source is seeded once per call.
pub fn generate_batch(
    prefix: &str,
    key_len: usize,
    count: usize,
) -> Result<Vec<Code>, KeygenError> {
    generate_batch_with(&mut StdRng::from_entropy(), prefix, key_len, count)
}

/// Like [`generate_batch`], drawing from a caller-supplied random source.
pub fn generate_batch_with<R: Rng>(
    rng: &mut R,
    prefix: &str,
    key_len: usize,
    count: usize,
) -> Result<Vec<Code>, KeygenError> {
    let prefix = normalize(prefix).ok_or_else(|| KeygenError::InvalidPrefix {
        prefix: prefix.to_string(),
    })?;

    let suffix_len = key_len
        .checked_sub(prefix.len())
        .ok_or_else(|| KeygenError::PrefixTooLong {
            prefix: prefix.clone(),
            key_len,
        })?;

    if count == 0 {
        return Err(KeygenError::EmptyBatch);
    }

    if !has_room(suffix_len, count) {
        return Err(KeygenError::KeylenTooShort {
            key_len,
            suffix_len,
            size: count,
        });
    }

    let max_draws = count.saturating_mul(MAX_DRAWS_PER_CODE);
    let mut codes = BTreeSet::new();
    let mut draws = 0;

    while codes.len() < count {
        if draws == max_draws {
            return Err(KeygenError::DrawLimitExceeded {
                draws,
                unique: codes.len(),
                size: count,
            });
        }
        draws += 1;
        codes.insert(draw_one(rng, &prefix, suffix_len));
    }

    codes
        .into_iter()
        .map(|code| Code::try_new(code.clone()).map_err(|_| KeygenError::InvalidCode(code)))
        .collect()
}

fn draw_one<R: Rng>(rng: &mut R, prefix: &str, suffix_len: usize) -> String {
    let mut code = String::with_capacity(prefix.len() + suffix_len);
    code.push_str(prefix);
    for _ in 0..suffix_len {
        code.push(char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]));
    }
    code
}
