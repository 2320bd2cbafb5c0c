use chrono::{DateTime, Days, Duration, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{ReminderError, Result};
use crate::notifications::Repeat;
use crate::time_of_day::TimeOfDay;

/// One configured daily reminder. Identity is its position in the installed list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderSlot {
    pub slot_index: usize,
    pub time_of_day: TimeOfDay,
}

impl ReminderSlot {
    /// Next instant this slot should fire, strictly after `now`.
    pub fn next_fire<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        next_occurrence(self.time_of_day, now).ok_or_else(|| ReminderError::Unschedulable {
            time: self.time_of_day.to_string(),
        })
    }
}

/// A concrete future fire derived from a slot or a snooze.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArmedOccurrence {
    pub id: u32,
    pub slot_index: Option<usize>,
    pub fire_at: DateTime<Local>,
    pub repeat: Repeat,
}

/// Parses every entry before returning, so a single bad entry rejects the whole list.
pub fn parse_schedule<S: AsRef<str>>(times: &[S]) -> Result<Vec<ReminderSlot>> {
    times
        .iter()
        .enumerate()
        .map(|(slot_index, raw)| -> Result<ReminderSlot> {
            Ok(ReminderSlot {
                slot_index,
                time_of_day: raw.as_ref().parse()?,
            })
        })
        .collect()
}

/// Today's `time` if that instant is still ahead of `now`, otherwise tomorrow's.
///
/// Local times that fall into a DST gap are pushed forward by an hour; ambiguous
/// ones resolve to the earlier instant.
pub fn next_occurrence<Tz: TimeZone>(time: TimeOfDay, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..=2u64).find_map(|offset| {
        let date = today.checked_add_days(Days::new(offset))?;
        let candidate = resolve_local(&tz, date.and_time(time.as_naive()))?;
        (candidate > *now).then_some(candidate)
    })
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}
