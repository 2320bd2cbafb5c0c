use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{ReminderError, Result},
    navigation::SPEAK_DESTINATION,
    notifications::{InteractionEvent, SCHEDULED_CALL_TAG},
    prompt::{CallPrompt, Notice, ReminderChoice},
    schedule::ArmedOccurrence,
    service::ReminderScheduler,
    time_of_day::TimeOfDay,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Shown without the user touching it.
    Passive,
    ForeignTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    Navigated { destination: String },
    Snoozed(ArmedOccurrence),
    Dismissed,
}

/// Buttons attached directly to the notification, handled without the prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderAction {
    TalkNow,
    Snooze,
}

impl ReminderAction {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim() {
            "talk_now" => Some(Self::TalkNow),
            "snooze" => Some(Self::Snooze),
            _ => None,
        }
    }
}

impl ReminderScheduler {
    /// Delivery callback. Only a touched `scheduled_call` notification leads
    /// anywhere, and then always through the three-way prompt.
    pub fn handle_interaction(&self, event: &InteractionEvent) -> Result<DispatchOutcome> {
        if !event.user_interacted {
            debug!(tag = %event.tag, "notification shown without interaction");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::Passive));
        }
        if event.tag != SCHEDULED_CALL_TAG {
            debug!(tag = %event.tag, "ignoring interaction for foreign tag");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::ForeignTag));
        }

        let scheduled_time = event.scheduled_time().and_then(|raw| {
            raw.parse::<TimeOfDay>()
                .map_err(|err| warn!(raw, error = %err, "unreadable scheduled time in payload"))
                .ok()
        });
        let prompt = CallPrompt::for_time(scheduled_time, self.config.prompt_delay());
        let choice = self.prompt.choose(&prompt);
        info!(?choice, "reminder prompt answered");
        self.apply_choice(choice)
    }

    pub fn handle_action(&self, action: ReminderAction) -> Result<DispatchOutcome> {
        info!(?action, "notification action pressed");
        match action {
            ReminderAction::TalkNow => self.apply_choice(ReminderChoice::NavigateNow),
            ReminderAction::Snooze => self.apply_choice(ReminderChoice::Snooze),
        }
    }

    pub fn apply_choice(&self, choice: ReminderChoice) -> Result<DispatchOutcome> {
        match choice {
            ReminderChoice::NavigateNow => {
                self.navigate_to_speak()?;
                Ok(DispatchOutcome::Navigated {
                    destination: SPEAK_DESTINATION.to_string(),
                })
            }
            ReminderChoice::Snooze => {
                let minutes = self.config.snooze_minutes;
                let occurrence = self.snooze(minutes)?;
                self.prompt.notify(&Notice::Snoozed { minutes });
                Ok(DispatchOutcome::Snoozed(occurrence))
            }
            ReminderChoice::Dismiss => Ok(DispatchOutcome::Dismissed),
        }
    }

    fn navigate_to_speak(&self) -> Result<()> {
        let outcome = match self.navigation.upgrade() {
            Some(context) => context.navigate(SPEAK_DESTINATION),
            None => {
                warn!("navigation context dropped before reminder interaction");
                Err(ReminderError::HookUnavailable)
            }
        };
        if let Err(ReminderError::HookUnavailable) = &outcome {
            self.prompt.notify(&Notice::NavigationUnavailable);
        }
        outcome
    }
}
