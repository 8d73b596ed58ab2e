//! # Domain Models
//!
//! The entities managed by vitrine. A banner's identity is its served `url`;
//! no surrogate id exists in the metadata layer. Lifecycle state (active vs
//! disabled) is derived from set membership, never stored as a field.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Weekday eligibility tag for an active banner.
///
/// `All` is the default and means "display every day". The tag only carries
/// meaning while the banner is in the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayRule {
    #[serde(rename = "MON")]
    Mon,
    #[serde(rename = "TUE")]
    Tue,
    #[serde(rename = "WED")]
    Wed,
    #[serde(rename = "THU")]
    Thu,
    #[serde(rename = "FRI")]
    Fri,
    #[serde(rename = "SAT")]
    Sat,
    #[serde(rename = "SUN")]
    Sun,
    #[default]
    #[serde(rename = "ALL")]
    All,
}

impl DayRule {
    pub fn as_tag(&self) -> &'static str {
        match self {
            DayRule::Mon => "MON",
            DayRule::Tue => "TUE",
            DayRule::Wed => "WED",
            DayRule::Thu => "THU",
            DayRule::Fri => "FRI",
            DayRule::Sat => "SAT",
            DayRule::Sun => "SUN",
            DayRule::All => "ALL",
        }
    }

    /// Whether a banner carrying this rule is displayable on `weekday`.
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            DayRule::All => true,
            other => *other == DayRule::from_weekday(weekday),
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayRule::Mon,
            Weekday::Tue => DayRule::Tue,
            Weekday::Wed => DayRule::Wed,
            Weekday::Thu => DayRule::Thu,
            Weekday::Fri => DayRule::Fri,
            Weekday::Sat => DayRule::Sat,
            Weekday::Sun => DayRule::Sun,
        }
    }
}

impl FromStr for DayRule {
    type Err = AppError;

    /// Case-insensitive parse against the closed tag set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MON" => Ok(DayRule::Mon),
            "TUE" => Ok(DayRule::Tue),
            "WED" => Ok(DayRule::Wed),
            "THU" => Ok(DayRule::Thu),
            "FRI" => Ok(DayRule::Fri),
            "SAT" => Ok(DayRule::Sat),
            "SUN" => Ok(DayRule::Sun),
            "ALL" => Ok(DayRule::All),
            other => Err(AppError::Validation(format!("invalid day tag: {other}"))),
        }
    }
}

impl fmt::Display for DayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A banner currently in the active ordered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBanner {
    pub url: String,
    pub day: DayRule,
    /// Display rank; lower is shown first. Unique at rest, not necessarily
    /// contiguous.
    pub position: u64,
}

/// Result of a media-store upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    /// Stable public URL issued by the media store. Primary key of the item.
    pub url: String,
    /// Store-side identifier used for deletion.
    pub asset_id: String,
}

/// What the media store reported for a delete call.
///
/// A transport failure is an `Err` at the port instead; `NotFound` here means
/// the store answered and the asset was already gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaDeleteStatus {
    Deleted,
    NotFound,
    Other(String),
}

/// Media-side outcome of a destructive operation. The metadata side has
/// already committed by the time this is produced and is never rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// Asset deleted from the media store.
    Deleted,
    /// The media store no longer had the asset; only metadata was removed.
    RemovedFromStoreOnly,
    /// No asset id could be derived from the url; media side untouched.
    SkippedUnparsableUrl,
    /// The delete call failed; metadata removal stands regardless.
    Failed(String),
}

/// Outcome of `destroy`: how many metadata entries went away, and what
/// happened on the media side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyOutcome {
    pub removed: u64,
    pub media: MediaStatus,
}

/// Aggregate tally of a cleanup sweep. One failing item never aborts the
/// rest; it lands in `errors` and the sweep moves on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub deleted: u64,
    pub errors: u64,
    pub skipped: u64,
}
