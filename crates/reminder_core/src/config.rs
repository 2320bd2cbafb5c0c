use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ReminderError, Result};
use crate::notifications::ChannelConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Anonymous identifier copied into every slot payload.
    pub user_id: String,
    pub snooze_minutes: u32,
    pub prompt_delay_ms: u64,
    /// Delivery id of slot 0; slot `n` arms under `slot_id_base + n`.
    pub slot_id_base: u32,
    /// Fixed delivery id shared by every snooze.
    pub snooze_id: u32,
    pub channel: ChannelConfig,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            snooze_minutes: 10,
            prompt_delay_ms: 500,
            slot_id_base: 1000,
            snooze_id: 3001,
            channel: ChannelConfig::default(),
        }
    }
}

impl ReminderConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(user_id) = std::env::var("REMINDER_USER_ID") {
            let user_id = user_id.trim();
            if !user_id.is_empty() {
                info!(user_id, "using configured reminder user");
                config.user_id = user_id.to_string();
            }
        }
        if let Ok(minutes) = std::env::var("REMINDER_SNOOZE_MINUTES") {
            match minutes.trim().parse::<u32>() {
                Ok(value) if value > 0 => config.snooze_minutes = value,
                _ => warn!(%minutes, "ignoring invalid REMINDER_SNOOZE_MINUTES"),
            }
        }
        if let Ok(delay) = std::env::var("REMINDER_PROMPT_DELAY_MS") {
            match delay.trim().parse::<u64>() {
                Ok(value) => config.prompt_delay_ms = value,
                Err(_) => warn!(%delay, "ignoring invalid REMINDER_PROMPT_DELAY_MS"),
            }
        }
        if let Ok(channel_id) = std::env::var("REMINDER_CHANNEL_ID") {
            let channel_id = channel_id.trim();
            if !channel_id.is_empty() {
                config.channel.id = channel_id.to_string();
            }
        }
        config
    }

    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }

    /// Largest schedule that fits below the snooze id without collisions.
    pub fn max_slots(&self) -> usize {
        match self.snooze_id.checked_sub(self.slot_id_base) {
            Some(gap) => gap as usize,
            None => (u32::MAX - self.slot_id_base) as usize,
        }
    }

    /// Rejects id layouts where slot 0 would arm under the snooze id.
    pub fn validate(&self) -> Result<()> {
        if self.max_slots() == 0 {
            return Err(ReminderError::validation(
                self.slot_id_base.to_string(),
                format!("slot ids must not start at the snooze id {}", self.snooze_id),
            ));
        }
        Ok(())
    }

    pub fn slot_id(&self, slot_index: usize) -> u32 {
        self.slot_id_base.saturating_add(slot_index as u32)
    }

    pub(crate) fn is_slot_id(&self, id: u32) -> bool {
        id != self.snooze_id
            && id >= self.slot_id_base
            && ((id - self.slot_id_base) as usize) < self.max_slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_keep_snooze_outside_slot_range() {
        let config = ReminderConfig::default();
        assert_eq!(config.slot_id(0), 1000);
        assert_eq!(config.slot_id(3), 1003);
        assert!(config.is_slot_id(1000));
        assert!(config.is_slot_id(3000));
        assert!(!config.is_slot_id(config.snooze_id));
        assert!(!config.is_slot_id(999));
        assert_eq!(config.max_slots(), 2001);
    }

    #[test]
    fn snooze_id_at_slot_base_is_rejected() {
        let config = ReminderConfig {
            slot_id_base: 3001,
            snooze_id: 3001,
            ..ReminderConfig::default()
        };
        assert_eq!(config.max_slots(), 0);
        assert!(!config.is_slot_id(3001));
        assert!(matches!(
            config.validate(),
            Err(ReminderError::Validation { .. })
        ));
    }

    #[test]
    fn snooze_id_below_slot_base_is_accepted() {
        let config = ReminderConfig {
            slot_id_base: 5000,
            snooze_id: 42,
            ..ReminderConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_slot_id(5000));
        assert!(!config.is_slot_id(42));
        assert!(ReminderConfig::default().validate().is_ok());
    }

    #[test]
    fn prompt_delay_defaults_to_half_a_second() {
        assert_eq!(
            ReminderConfig::default().prompt_delay(),
            Duration::from_millis(500)
        );
    }
}
