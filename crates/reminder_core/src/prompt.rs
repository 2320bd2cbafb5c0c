use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time_of_day::TimeOfDay;

/// The three answers the reminder prompt offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChoice {
    NavigateNow,
    Snooze,
    Dismiss,
}

/// Request to show the reminder prompt. `delay` lets an in-flight foreground
/// transition settle; the host honours it before presenting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPrompt {
    pub title: String,
    pub message: String,
    pub scheduled_time: Option<TimeOfDay>,
    pub delay: Duration,
}

impl CallPrompt {
    pub(crate) fn for_time(scheduled_time: Option<TimeOfDay>, delay: Duration) -> Self {
        let message = match scheduled_time {
            Some(time) => format!("Your conversation was scheduled for {}.", time.display_12h()),
            None => "Would you like to start a conversation now?".to_string(),
        };
        Self {
            title: "Time for your scheduled conversation!".to_string(),
            message,
            scheduled_time,
            delay,
        }
    }
}

/// Informational messages surfaced to the user after a prompt decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Snoozed { minutes: u32 },
    NavigationUnavailable,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Snoozed { minutes } => {
                format!("We'll remind you again in {minutes} minutes.")
            }
            Notice::NavigationUnavailable => {
                "Unable to open the conversation screen. Please restart the app.".to_string()
            }
        }
    }
}

/// User-facing prompt surface supplied by the UI layer.
pub trait ChoicePrompt: Send + Sync {
    fn choose(&self, prompt: &CallPrompt) -> ReminderChoice;
    fn notify(&self, notice: &Notice);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_mentions_scheduled_time_when_known() {
        let prompt = CallPrompt::for_time(TimeOfDay::new(20, 5), Duration::from_millis(500));
        assert!(prompt.message.contains("8:05 PM"));

        let generic = CallPrompt::for_time(None, Duration::ZERO);
        assert!(generic.message.contains("start a conversation"));
    }

    #[test]
    fn snooze_notice_names_the_delay() {
        assert_eq!(
            Notice::Snoozed { minutes: 10 }.message(),
            "We'll remind you again in 10 minutes."
        );
    }
}
