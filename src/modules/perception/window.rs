use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::errors::FetchError;

/// NVD 要求的格式: yyyy-MM-dd'T'HH:mm:ss:SSS z
pub const NVD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S:%3f UTC%:z";

/// Publication window `[start, end]` rendered in a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> Result<Self, FetchError> {
        if start >= end {
            return Err(FetchError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self {
            start: start.with_timezone(&offset),
            end: end.with_timezone(&offset),
        })
    }

    /// The window ending at `now` and reaching `lookback` into the past.
    pub fn trailing(now: DateTime<Utc>, lookback: Duration, offset: FixedOffset) -> Result<Self, FetchError> {
        Self::new(now - lookback, now, offset)
    }

    #[cfg(test)]
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    #[cfg(test)]
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    pub fn start_param(&self) -> String {
        self.start.format(NVD_TIME_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(NVD_TIME_FORMAT).to_string()
    }
}
