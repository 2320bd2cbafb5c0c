use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEDULED_CALL_TAG: &str = "scheduled_call";

pub const PAYLOAD_ACTION: &str = "action";
pub const PAYLOAD_SCHEDULED_TIME: &str = "scheduled_time";
pub const PAYLOAD_USER_ID: &str = "user_id";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    None,
    Daily,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Default,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub importance: Importance,
    pub sound: Option<String>,
    pub vibrate: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: "scheduled-call-high-v4".to_string(),
            display_name: "Scheduled conversation".to_string(),
            description: "Rings at the conversation times you picked".to_string(),
            importance: Importance::High,
            sound: Some("alarm.mp3".to_string()),
            vibrate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub sound: Option<String>,
    pub vibrate: bool,
    pub full_screen: bool,
}

/// One fire handed to the delivery service. Arming an `id` that is already
/// pending replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArmRequest {
    pub id: u32,
    pub fire_at: DateTime<Utc>,
    pub repeat: Repeat,
    pub tag: String,
    pub payload: BTreeMap<String, String>,
    pub content: NotificationContent,
}

pub trait DeliveryService: Send + Sync {
    fn arm(&self, request: ArmRequest) -> Result<()>;
    fn cancel(&self, id: u32) -> Result<()>;
    fn cancel_all(&self) -> Result<()>;
    fn pending_ids(&self) -> Result<Vec<u32>>;
    /// Returns whether the channel was newly created.
    fn ensure_channel(&self, channel: &ChannelConfig) -> Result<bool>;
    fn check_permission(&self) -> bool;
    fn request_permission(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionEvent {
    pub tag: String,
    pub payload: BTreeMap<String, String>,
    pub user_interacted: bool,
}

impl InteractionEvent {
    pub fn new(tag: impl Into<String>, user_interacted: bool) -> Self {
        Self {
            tag: tag.into(),
            payload: BTreeMap::new(),
            user_interacted,
        }
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn for_request(request: &ArmRequest, user_interacted: bool) -> Self {
        Self {
            tag: request.tag.clone(),
            payload: request.payload.clone(),
            user_interacted,
        }
    }

    // iOS hosts put the payload under `userInfo` instead of `data`.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        let object = raw
            .as_object()
            .context("notification callback is not a JSON object")?;
        let user_interacted = object
            .get("userInteraction")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let data = object
            .get("data")
            .filter(|value| value.as_object().is_some_and(|map| !map.is_empty()))
            .or_else(|| object.get("userInfo"));

        let mut payload = BTreeMap::new();
        if let Some(map) = data.and_then(serde_json::Value::as_object) {
            for (key, value) in map {
                let text = match value {
                    serde_json::Value::String(text) => text.clone(),
                    serde_json::Value::Null => continue,
                    other => other.to_string(),
                };
                payload.insert(key.clone(), text);
            }
        }
        let tag = payload.get(PAYLOAD_ACTION).cloned().unwrap_or_default();
        Ok(Self {
            tag,
            payload,
            user_interacted,
        })
    }

    pub fn scheduled_time(&self) -> Option<&str> {
        self.payload.get(PAYLOAD_SCHEDULED_TIME).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_android_style_callback() {
        let raw = json!({
            "userInteraction": true,
            "data": {
                "action": "scheduled_call",
                "scheduled_time": "08:00",
                "user_id": "user_1"
            }
        });
        let event = InteractionEvent::from_json(&raw).unwrap();
        assert!(event.user_interacted);
        assert_eq!(event.tag, SCHEDULED_CALL_TAG);
        assert_eq!(event.scheduled_time(), Some("08:00"));
    }

    #[test]
    fn falls_back_to_user_info_and_defaults_to_passive() {
        let raw = json!({
            "data": {},
            "userInfo": { "action": "scheduled_call", "id": 3001 }
        });
        let event = InteractionEvent::from_json(&raw).unwrap();
        assert!(!event.user_interacted);
        assert_eq!(event.tag, SCHEDULED_CALL_TAG);
        assert_eq!(event.payload.get("id").map(String::as_str), Some("3001"));
        assert_eq!(event.scheduled_time(), None);
    }

    #[test]
    fn missing_action_yields_empty_tag() {
        let event = InteractionEvent::from_json(&json!({ "userInteraction": true })).unwrap();
        assert!(event.tag.is_empty());
        assert!(InteractionEvent::from_json(&json!("nope")).is_err());
    }

    #[test]
    fn builder_style_payload_exposes_scheduled_time() {
        let event = InteractionEvent::new(SCHEDULED_CALL_TAG, true)
            .with_payload(PAYLOAD_SCHEDULED_TIME, "20:00")
            .with_payload(PAYLOAD_USER_ID, "user_1");
        assert_eq!(event.scheduled_time(), Some("20:00"));
        assert_eq!(event.payload.len(), 2);
    }

    #[test]
    fn channel_defaults_are_loud() {
        let channel = ChannelConfig::default();
        assert_eq!(channel.importance, Importance::High);
        assert!(channel.vibrate);
        assert_eq!(channel.sound.as_deref(), Some("alarm.mp3"));
    }
}
