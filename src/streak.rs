use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Consecutive days with at least one completed item. Only the last active day is remembered.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    #[serde(default)]
    pub count: u32,
    #[serde(default, with = "last_date")]
    pub last_date: Option<NaiveDate>,
}

impl StreakRecord {
    /// Resets the count when more than one calendar day passed since the last active day.
    /// Returns true when the record changed and needs saving.
    pub fn check(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.last_date else {
            return false;
        };
        let gap = (today - last).num_days().abs();
        if gap > 1 && self.count != 0 {
            info!(count = self.count, gap, "streak broken");
            self.count = 0;
            return true;
        }
        false
    }

    /// Counts today at most once. Returns true when the record changed.
    pub fn record_completion(&mut self, today: NaiveDate) -> bool {
        if self.last_date == Some(today) {
            return false;
        }
        self.count += 1;
        self.last_date = Some(today);
        info!(count = self.count, %today, "streak extended");
        true
    }
}

/// `YYYY-MM-DD` on disk, empty string when unset.
mod last_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    const FORMAT: &str = "%Y-%m-%d";
    const LEGACY_FORMAT: &str = "%a %b %d %Y";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(parse(&raw))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed = NaiveDate::parse_from_str(trimmed, FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, LEGACY_FORMAT))
            .ok();
        if parsed.is_none() {
            warn!(value = trimmed, "ignoring unreadable streak date");
        }
        parsed
    }
}
