use redb::TypeName;
use serde::Serialize;
use std::fmt;

/// Redemption state of a single code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyStatus {
    Ready,
    Used,
}

impl KeyStatus {
    const READY_MARKER: &'static [u8] = b"R";
    const USED_MARKER: &'static [u8] = b"U";

    pub fn is_ready(self) -> bool {
        self == KeyStatus::Ready
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyStatus::Ready => "Ready",
            KeyStatus::Used => "Used",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored as a single byte. Anything but `R` reads as used, so a damaged
/// record can never be redeemed.
impl redb::Value for KeyStatus {
    type SelfType<'a> = KeyStatus;
    type AsBytes<'a> = &'static [u8];

    fn fixed_width() -> Option<usize> {
        Some(1)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        if data == Self::READY_MARKER {
            KeyStatus::Ready
        } else {
            KeyStatus::Used
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        match value {
            KeyStatus::Ready => Self::READY_MARKER,
            KeyStatus::Used => Self::USED_MARKER,
        }
    }

    fn type_name() -> TypeName {
        TypeName::new("cdkey::KeyStatus")
    }
}
