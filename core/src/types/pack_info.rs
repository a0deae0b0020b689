use crate::types::{Code, KeyStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a pack.
///
/// Persisted as a plain string: `"initial"`, `"ready"`, or the free-text reason
/// the pack was disabled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackStatus {
    /// Created but never enabled.
    Initial,
    /// Accepts redemptions.
    Ready,
    /// Disabled, with an optional reason. Never holds `"ready"`.
    Disabled(String),
}

impl PackStatus {
    const INITIAL: &'static str = "initial";
    const READY: &'static str = "ready";

    /// Builds the status a pack gets when disabled with `reason`.
    ///
    /// A reason spelled `"ready"` is folded to the empty string so a disabled
    /// pack can never read back as enabled.
    pub fn disabled(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason == Self::READY {
            PackStatus::Disabled(String::new())
        } else {
            PackStatus::Disabled(reason)
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PackStatus::Ready)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PackStatus::Initial => Self::INITIAL,
            PackStatus::Ready => Self::READY,
            PackStatus::Disabled(reason) => reason,
        }
    }
}

impl From<String> for PackStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            Self::INITIAL => PackStatus::Initial,
            Self::READY => PackStatus::Ready,
            _ => PackStatus::Disabled(s),
        }
    }
}

impl From<PackStatus> for String {
    fn from(status: PackStatus) -> Self {
        match status {
            PackStatus::Disabled(reason) => reason,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pack metadata, persisted as `pack.json` inside the pack directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub name: String,
    pub prefix: String,
    #[serde(rename = "keylen")]
    pub key_len: usize,
    #[serde(rename = "packsize")]
    pub pack_size: usize,
    pub status: PackStatus,
    pub note: String,
    #[serde(rename = "createTime")]
    pub create_time: DateTime<Utc>,
}

/// Parameters for creating a pack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPack {
    pub name: String,
    pub prefix: String,
    #[serde(rename = "keylen")]
    pub key_len: usize,
    #[serde(rename = "packsize")]
    pub pack_size: usize,
    #[serde(default)]
    pub note: String,
}

/// One code and its redemption state, as returned by key listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    pub key: Code,
    pub status: KeyStatus,
}
