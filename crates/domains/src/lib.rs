//! vitrine/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for vitrine.

pub mod error;
pub mod models;
pub mod ports;

#[cfg(feature = "testing")]
pub mod testing;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Weekday;
    use std::str::FromStr;

    #[test]
    fn day_rule_parses_case_insensitively() {
        assert_eq!(DayRule::from_str("fri").unwrap(), DayRule::Fri);
        assert_eq!(DayRule::from_str("ALL").unwrap(), DayRule::All);
        assert!(DayRule::from_str("someday").is_err());
    }

    #[test]
    fn day_rule_round_trips_through_serde_tags() {
        let json = serde_json::to_string(&DayRule::Tue).unwrap();
        assert_eq!(json, "\"TUE\"");
        let back: DayRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DayRule::Tue);
    }

    #[test]
    fn all_matches_every_weekday() {
        assert!(DayRule::All.matches(Weekday::Mon));
        assert!(DayRule::All.matches(Weekday::Sun));
        assert!(DayRule::Sat.matches(Weekday::Sat));
        assert!(!DayRule::Sat.matches(Weekday::Sun));
    }

    #[test]
    fn media_status_serializes_snake_case() {
        let json = serde_json::to_value(MediaStatus::RemovedFromStoreOnly).unwrap();
        assert_eq!(json, serde_json::json!("removed_from_store_only"));
    }
}
