use chrono::{FixedOffset, Offset, Utc};
use std::collections::BTreeSet;

use crate::{Error, Result};

/// Thread-id allow-list applied while decoding. Empty admits every thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    ids: BTreeSet<i64>,
}

impl ThreadFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a comma separated list of decimal or `0x`-prefixed hex ids.
    pub fn parse(value: &str) -> Result<Self> {
        let mut filter = Self::default();
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            filter.ids.insert(parse_thread_id(token)?);
        }
        Ok(filter)
    }

    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn admits(&self, thread_id: i64) -> bool {
        self.ids.is_empty() || self.ids.contains(&thread_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }
}

fn parse_thread_id(token: &str) -> Result<i64> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).map(|v| v as i64),
        None => token.parse::<i64>(),
    };
    parsed.map_err(|_| {
        Error::Parse(format!(
            "The specified thread id, \"{}\" is not valid. Ids must be a number",
            token
        ))
    })
}

/// Offset applied to formatted timestamps, in signed minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimezoneOffset {
    minutes: i32,
}

impl TimezoneOffset {
    pub const UTC: TimezoneOffset = TimezoneOffset { minutes: 0 };

    /// Parse `+HH:MM` or `-HH:MM`; hours up to 12, minutes up to 60.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid =
            || Error::Parse("The specified timezone offset is not valid. Format is +|-HH:MM".into());

        let value = value.trim();
        let (negative, rest) = if let Some(rest) = value.strip_prefix('+') {
            (false, rest)
        } else if let Some(rest) = value.strip_prefix('-') {
            (true, rest)
        } else {
            return Err(invalid());
        };

        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=12).contains(&hours) || !(0..=60).contains(&minutes) {
            return Err(invalid());
        }

        let total = hours * 60 + minutes;
        Ok(Self {
            minutes: if negative { -total } else { total },
        })
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    pub fn fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
