use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Duration, Local, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::ReminderConfig,
    error::{ReminderError, Result},
    navigation::{NavigationContext, NavigationTarget},
    notifications::{
        ArmRequest, DeliveryService, NotificationContent, Repeat, PAYLOAD_ACTION,
        PAYLOAD_SCHEDULED_TIME, PAYLOAD_USER_ID, SCHEDULED_CALL_TAG,
    },
    prompt::ChoicePrompt,
    schedule::{self, ArmedOccurrence, ReminderSlot},
};

pub struct ReminderScheduler {
    pub(crate) config: ReminderConfig,
    pub(crate) delivery: Arc<dyn DeliveryService>,
    pub(crate) prompt: Arc<dyn ChoicePrompt>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) navigation: Weak<NavigationContext>,
    slots: RwLock<Vec<ReminderSlot>>,
}

pub struct ReminderSchedulerBuilder {
    config: ReminderConfig,
    delivery: Arc<dyn DeliveryService>,
    prompt: Arc<dyn ChoicePrompt>,
    clock: Arc<dyn Clock>,
    navigation: Weak<NavigationContext>,
}

impl ReminderSchedulerBuilder {
    pub fn new(delivery: Arc<dyn DeliveryService>, prompt: Arc<dyn ChoicePrompt>) -> Self {
        Self {
            config: ReminderConfig::default(),
            delivery,
            prompt,
            clock: Arc::new(SystemClock),
            navigation: Weak::new(),
        }
    }

    pub fn with_config(mut self, config: ReminderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The scheduler keeps only a weak reference; the caller stays the owner.
    pub fn with_navigation(mut self, context: &Arc<NavigationContext>) -> Self {
        self.navigation = Arc::downgrade(context);
        self
    }

    pub fn build(self) -> Result<ReminderScheduler> {
        self.config.validate()?;
        let scheduler = ReminderScheduler {
            config: self.config,
            delivery: self.delivery,
            prompt: self.prompt,
            clock: self.clock,
            navigation: self.navigation,
            slots: RwLock::new(Vec::new()),
        };
        scheduler.ensure_channel()?;
        Ok(scheduler)
    }
}

impl ReminderScheduler {
    pub fn builder(
        delivery: Arc<dyn DeliveryService>,
        prompt: Arc<dyn ChoicePrompt>,
    ) -> ReminderSchedulerBuilder {
        ReminderSchedulerBuilder::new(delivery, prompt)
    }

    /// All entries are validated before anything is cancelled or armed. If an
    /// arm is rejected midway, whatever this call armed is cancelled again
    /// before the error is returned. A pending snooze is left alone.
    #[instrument(skip(self, times), fields(count = times.len()))]
    pub fn install_schedule<S: AsRef<str>>(&self, times: &[S]) -> Result<()> {
        let slots = schedule::parse_schedule(times)?;
        if slots.len() > self.config.max_slots() {
            return Err(ReminderError::validation(
                format!("{} entries", slots.len()),
                format!("at most {} reminder times are supported", self.config.max_slots()),
            ));
        }

        let now = self.clock.now();
        let requests = slots
            .iter()
            .map(|slot| self.slot_request(slot, &now))
            .collect::<Result<Vec<_>>>()?;

        self.cancel_slot_occurrences()?;
        self.slots.write().clear();

        let mut armed_ids = Vec::with_capacity(requests.len());
        for request in requests {
            let id = request.id;
            let fire_at = request.fire_at;
            if let Err(err) = self.delivery.arm(request) {
                warn!(id, error = %err, "arm rejected, rolling back schedule");
                self.rollback(&armed_ids);
                return Err(ReminderError::delivery("arm", err));
            }
            debug!(id, %fire_at, "armed daily reminder");
            armed_ids.push(id);
        }

        info!(armed = armed_ids.len(), "reminder schedule installed");
        *self.slots.write() = slots;
        Ok(())
    }

    // Snooze included.
    pub fn cancel_all_reminders(&self) -> Result<()> {
        self.delivery
            .cancel_all()
            .map_err(|err| ReminderError::delivery("cancel_all", err))?;
        self.slots.write().clear();
        info!("all reminders cancelled");
        Ok(())
    }

    pub fn slots(&self) -> Vec<ReminderSlot> {
        self.slots.read().clone()
    }

    pub fn upcoming(&self) -> Result<Vec<ArmedOccurrence>> {
        let now = self.clock.now();
        let slots = self.slots.read();
        slots
            .iter()
            .map(|slot| -> Result<ArmedOccurrence> {
                Ok(ArmedOccurrence {
                    id: self.config.slot_id(slot.slot_index),
                    slot_index: Some(slot.slot_index),
                    fire_at: slot.next_fire(&now)?,
                    repeat: Repeat::Daily,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub fn snooze(&self, delay_minutes: u32) -> Result<ArmedOccurrence> {
        if delay_minutes == 0 {
            return Err(ReminderError::validation(
                delay_minutes.to_string(),
                "snooze delay must be at least one minute",
            ));
        }
        let fire_at = self.clock.now() + Duration::minutes(i64::from(delay_minutes));
        let request = ArmRequest {
            id: self.config.snooze_id,
            fire_at: fire_at.with_timezone(&Utc),
            repeat: Repeat::None,
            tag: SCHEDULED_CALL_TAG.to_string(),
            payload: BTreeMap::from([(PAYLOAD_ACTION.to_string(), SCHEDULED_CALL_TAG.to_string())]),
            content: self.content("Your postponed conversation", "Shall we start talking now?"),
        };
        self.delivery
            .arm(request)
            .map_err(|err| ReminderError::delivery("arm", err))?;
        info!(id = self.config.snooze_id, %fire_at, "snooze armed");
        Ok(ArmedOccurrence {
            id: self.config.snooze_id,
            slot_index: None,
            fire_at,
            repeat: Repeat::None,
        })
    }

    // At most one consent request per call.
    pub fn ensure_permission(&self) -> bool {
        if self.delivery.check_permission() {
            return true;
        }
        let granted = self.delivery.request_permission();
        if granted {
            info!("notification permission granted");
        } else {
            warn!("notification permission denied");
        }
        granted
    }

    pub fn check_permission(&self) -> bool {
        self.delivery.check_permission()
    }

    pub fn ensure_channel(&self) -> Result<()> {
        let channel = &self.config.channel;
        let created = self
            .delivery
            .ensure_channel(channel)
            .map_err(|err| ReminderError::delivery("ensure_channel", err))?;
        info!(channel = %channel.id, created, "notification channel ready");
        Ok(())
    }

    pub fn register_navigation_hook(&self, hook: impl NavigationTarget + 'static) -> Result<()> {
        let context = self
            .navigation
            .upgrade()
            .ok_or(ReminderError::HookUnavailable)?;
        context.register(hook);
        Ok(())
    }

    pub fn clear_navigation_hook(&self) {
        if let Some(context) = self.navigation.upgrade() {
            context.clear();
        }
    }
}

impl ReminderScheduler {
    fn slot_request(&self, slot: &ReminderSlot, now: &DateTime<Local>) -> Result<ArmRequest> {
        let fire_at = slot.next_fire(now)?;
        let payload = BTreeMap::from([
            (PAYLOAD_ACTION.to_string(), SCHEDULED_CALL_TAG.to_string()),
            (
                PAYLOAD_SCHEDULED_TIME.to_string(),
                slot.time_of_day.to_string(),
            ),
            (PAYLOAD_USER_ID.to_string(), self.config.user_id.clone()),
        ]);
        Ok(ArmRequest {
            id: self.config.slot_id(slot.slot_index),
            fire_at: fire_at.with_timezone(&Utc),
            repeat: Repeat::Daily,
            tag: SCHEDULED_CALL_TAG.to_string(),
            payload,
            content: self.content(
                "Time for your scheduled conversation!",
                "Would you like to start talking? Tap to open the app.",
            ),
        })
    }

    fn content(&self, title: &str, body: &str) -> NotificationContent {
        let channel = &self.config.channel;
        NotificationContent {
            title: title.to_string(),
            body: body.to_string(),
            channel_id: channel.id.clone(),
            sound: channel.sound.clone(),
            vibrate: channel.vibrate,
            full_screen: true,
        }
    }

    fn cancel_slot_occurrences(&self) -> Result<()> {
        let pending = self
            .delivery
            .pending_ids()
            .map_err(|err| ReminderError::delivery("pending_ids", err))?;
        let mut cancelled = 0usize;
        for id in pending.into_iter().filter(|id| self.config.is_slot_id(*id)) {
            self.delivery
                .cancel(id)
                .map_err(|err| ReminderError::delivery("cancel", err))?;
            cancelled += 1;
        }
        debug!(cancelled, "previous reminder slots cancelled");
        Ok(())
    }

    fn rollback(&self, armed_ids: &[u32]) {
        for id in armed_ids {
            if let Err(err) = self.delivery.cancel(*id) {
                warn!(id, error = %err, "failed to cancel reminder during rollback");
            }
        }
    }
}
