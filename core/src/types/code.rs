//! Code alphabet and normalization.
//!
//! Codes use a 32-symbol alphabet: digits and uppercase letters without the
//! visually ambiguous `I`, `L`, `O` and `U`. Input is folded into the alphabet
//! before it is stored or looked up, so `o` reads as `0` and `i`/`l` read as `1`.

use nutype::nutype;
use redb::TypeName;
use std::cmp::Ordering;
use std::str;

/// Symbols a generated code suffix is drawn from, in ascending byte order.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Placeholder for characters outside the alphabet. Never part of a valid code.
const INVALID: char = '?';

fn fold_char(c: char) -> Option<char> {
    match c.to_ascii_uppercase() {
        'O' => Some('0'),
        'I' | 'L' => Some('1'),
        'U' => None,
        c @ ('0'..='9' | 'A'..='Z') => Some(c),
        _ => None,
    }
}

fn fold_lossy(s: String) -> String {
    s.chars().map(|c| fold_char(c).unwrap_or(INVALID)).collect()
}

/// Returns `true` if `c` belongs to [`ALPHABET`].
pub fn is_alphabet_char(c: char) -> bool {
    c.is_ascii() && ALPHABET.contains(&(c as u8))
}

/// Canonicalizes `input` into the code alphabet.
///
/// Lowercase letters are uppercased, `O` becomes `0`, `I` and `L` become `1`.
/// Returns `None` if the input contains `U` or any character that is not an
/// ASCII letter or digit. The empty string normalizes to itself.
pub fn normalize(input: &str) -> Option<String> {
    input.chars().map(fold_char).collect()
}

/// A normalized, non-empty redemption code.
///
/// Construction folds the input the same way [`normalize`] does and rejects
/// anything left outside the alphabet.
#[nutype(
    sanitize(with = fold_lossy),
    validate(not_empty, predicate = |s: &str| s.chars().all(is_alphabet_char)),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct Code(String);

impl redb::Key for Code {
    fn compare(data1: &[u8], data2: &[u8]) -> Ordering {
        // Codes are ASCII, so byte order is lexicographic order.
        data1.cmp(data2)
    }
}

impl redb::Value for Code {
    type SelfType<'a> = Self;
    type AsBytes<'a> = &'a [u8];

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        // The keys table is only ever written through `as_bytes`, so stored
        // bytes are always a valid code.
        let s = str::from_utf8(data).expect("invalid UTF-8 in code");
        Self::try_new(s.to_owned()).expect("invalid code in key store")
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.as_bytes()
    }

    fn type_name() -> TypeName {
        TypeName::new("cdkey::Code")
    }
}

#[cfg(test)]
mod tests;
