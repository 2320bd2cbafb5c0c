use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ReminderError;

/// Wall-clock time of day at minute resolution, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn as_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Twelve-hour rendering used in reminder prompts, e.g. `8:05 PM`.
    pub fn display_12h(&self) -> String {
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        let hour = match self.hour % 12 {
            0 => 12,
            other => other,
        };
        format!("{}:{:02} {}", hour, self.minute, meridiem)
    }
}

impl FromStr for TimeOfDay {
    type Err = ReminderError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (hour_part, minute_part) = trimmed
            .split_once(':')
            .ok_or_else(|| ReminderError::validation(input, "expected HH:MM"))?;
        let hour = parse_component(input, hour_part, "hour")?;
        let minute = parse_component(input, minute_part, "minute")?;
        if hour > 23 {
            return Err(ReminderError::validation(input, "hour must be within 0-23"));
        }
        if minute > 59 {
            return Err(ReminderError::validation(
                input,
                "minute must be within 0-59",
            ));
        }
        Ok(Self { hour, minute })
    }
}

fn parse_component(input: &str, part: &str, label: &str) -> Result<u8, ReminderError> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReminderError::validation(
            input,
            format!("{label} must be one or two digits"),
        ));
    }
    part.parse()
        .map_err(|_| ReminderError::validation(input, format!("{label} is not a number")))
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ReminderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_unpadded_times() {
        let padded: TimeOfDay = "08:05".parse().unwrap();
        assert_eq!((padded.hour(), padded.minute()), (8, 5));
        let bare: TimeOfDay = "7:30".parse().unwrap();
        assert_eq!(bare, TimeOfDay::new(7, 30).unwrap());
        assert_eq!(bare.to_string(), "07:30");
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for input in ["25:00", "23:60", "25:99", "ab:cd", "1200", "12:", ":30", "-1:30", "123:00"] {
            let err = input.parse::<TimeOfDay>().unwrap_err();
            assert!(
                matches!(err, ReminderError::Validation { .. }),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn renders_twelve_hour_form() {
        assert_eq!(TimeOfDay::new(0, 0).unwrap().display_12h(), "12:00 AM");
        assert_eq!(TimeOfDay::new(12, 15).unwrap().display_12h(), "12:15 PM");
        assert_eq!(TimeOfDay::new(20, 5).unwrap().display_12h(), "8:05 PM");
    }

    #[test]
    fn serializes_as_string() {
        let time = TimeOfDay::new(9, 0).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"09:00\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }
}
