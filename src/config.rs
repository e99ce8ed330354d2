//! Runtime configuration for a `DealsTable`.

use crate::columns::WidthLimits;
use crate::prefs::STORAGE_KEY;
use chrono::{Local, NaiveDate, Utc};

/// Source of "today" for closing-soon totals and of timestamps for copy ids.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now_millis(&self) -> i64;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: i64,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        FixedClock { today, millis: 0 }
    }

    pub fn with_millis(mut self, millis: i64) -> Self {
        self.millis = millis;
        self
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Bounds for column resizing
    pub width_limits: WidthLimits,
    /// Key the UI preferences are stored under
    pub storage_key: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            width_limits: WidthLimits::default(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl TableConfig {
    pub fn with_width_limits(mut self, min: f64, max: f64) -> Self {
        self.width_limits = WidthLimits::new(min, max);
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}
