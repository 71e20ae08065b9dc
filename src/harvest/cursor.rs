//! Cursor state for the adaptive fetch loop: floor, lookback window, day tracking

use chrono::NaiveDate;

/// Initial lookback window in days
pub const INITIAL_DELTA_DAYS: i64 = 7;

/// Outcome of the per-cycle window adaptation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    /// Raw page filled the batch; keep scanning forward
    Full,
    /// Undersized page; window shrunk to the contained value and the
    /// floor reset for a fresh pass
    Shrunk(i64),
    /// Undersized page at the minimum window; source exhausted for now
    Exhausted,
}

/// Fetch-loop cursor. Owned exclusively by the fetch task and mutated once
/// per cycle; never persisted, so a restart begins again at floor 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    floor: u64,
    delta_days: i64,
    last_day: NaiveDate,
}

impl Cursor {
    /// New cursor at floor 0 with the default 7-day window
    pub fn new(today: NaiveDate) -> Self {
        Self::with_window(today, INITIAL_DELTA_DAYS)
    }

    /// New cursor with an explicit initial window
    pub fn with_window(today: NaiveDate, delta_days: i64) -> Self {
        Self {
            floor: 0,
            delta_days: delta_days.max(1),
            last_day: today,
        }
    }

    /// Lowest identifier not yet fetched in the current pass
    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Current lookback window in days
    pub fn delta_days(&self) -> i64 {
        self.delta_days
    }

    /// Calendar date of the last observed cycle
    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Advance the floor to the raw-page maximum. Monotonic: a candidate at
    /// or below the current floor is ignored. Returns true if it moved.
    pub fn advance(&mut self, candidate: Option<u64>) -> bool {
        match candidate {
            Some(id) if id > self.floor => {
                self.floor = id;
                true
            }
            _ => false,
        }
    }

    /// Daily reset: on the first cycle of a new calendar date, drop the
    /// floor to 0 so the whole identifier space is re-walked once per day.
    /// Returns true when a reset happened.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if today == self.last_day {
            return false;
        }
        self.floor = 0;
        self.last_day = today;
        true
    }

    /// Window adaptation from the raw (unfiltered) page size. An undersized
    /// page shrinks the window by one day and restarts the pass from floor
    /// 0; once the window is at its 1-day minimum the source is exhausted.
    pub fn adapt_window(&mut self, raw_len: usize, batch_size: usize) -> PageVerdict {
        if raw_len >= batch_size {
            return PageVerdict::Full;
        }
        if self.delta_days > 1 {
            self.delta_days -= 1;
            self.floor = 0;
            PageVerdict::Shrunk(self.delta_days)
        } else {
            PageVerdict::Exhausted
        }
    }
}
