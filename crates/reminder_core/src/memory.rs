use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{bail, Result};
use parking_lot::RwLock;

use crate::notifications::{ArmRequest, ChannelConfig, DeliveryService, InteractionEvent, Repeat};

/// In-process delivery service with replace-by-id semantics. Nothing ever
/// fires on its own; hosts call [`MemoryDelivery::deliver`] to simulate one.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    armed: RwLock<BTreeMap<u32, ArmRequest>>,
    channels: RwLock<HashSet<String>>,
    rejected_ids: RwLock<HashSet<u32>>,
    permission_granted: AtomicBool,
    grant_on_request: AtomicBool,
    permission_requests: AtomicUsize,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with permission already granted.
    pub fn granted() -> Self {
        let delivery = Self::default();
        delivery.permission_granted.store(true, Ordering::Release);
        delivery
    }

    pub fn set_grant_on_request(&self, grant: bool) {
        self.grant_on_request.store(grant, Ordering::Release);
    }

    /// Makes every later `arm` for `id` fail.
    pub fn reject_id(&self, id: u32) {
        self.rejected_ids.write().insert(id);
    }

    pub fn armed(&self) -> Vec<ArmRequest> {
        self.armed.read().values().cloned().collect()
    }

    pub fn get(&self, id: u32) -> Option<ArmRequest> {
        self.armed.read().get(&id).cloned()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::Acquire)
    }

    /// Fires `id` as the platform would: one-shot entries are consumed,
    /// daily entries roll forward by a day.
    pub fn deliver(&self, id: u32, user_interacted: bool) -> Option<InteractionEvent> {
        let mut armed = self.armed.write();
        let request = armed.get(&id)?.clone();
        match request.repeat {
            Repeat::None => {
                armed.remove(&id);
            }
            Repeat::Daily => {
                if let Some(entry) = armed.get_mut(&id) {
                    entry.fire_at = entry.fire_at + chrono::Duration::days(1);
                }
            }
        }
        Some(InteractionEvent::for_request(&request, user_interacted))
    }
}

impl DeliveryService for MemoryDelivery {
    fn arm(&self, request: ArmRequest) -> Result<()> {
        if self.rejected_ids.read().contains(&request.id) {
            bail!("arm rejected for notification {}", request.id);
        }
        self.armed.write().insert(request.id, request);
        Ok(())
    }

    fn cancel(&self, id: u32) -> Result<()> {
        self.armed.write().remove(&id);
        Ok(())
    }

    fn cancel_all(&self) -> Result<()> {
        self.armed.write().clear();
        Ok(())
    }

    fn pending_ids(&self) -> Result<Vec<u32>> {
        Ok(self.armed.read().keys().copied().collect())
    }

    fn ensure_channel(&self, channel: &ChannelConfig) -> Result<bool> {
        Ok(self.channels.write().insert(channel.id.clone()))
    }

    fn check_permission(&self) -> bool {
        self.permission_granted.load(Ordering::Acquire)
    }

    fn request_permission(&self) -> bool {
        self.permission_requests.fetch_add(1, Ordering::AcqRel);
        if self.grant_on_request.load(Ordering::Acquire) {
            self.permission_granted.store(true, Ordering::Release);
        }
        self.check_permission()
    }
}
