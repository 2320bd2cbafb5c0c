use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::{ReminderError, Result};

/// Screen the reminder prompt opens when the user chooses to talk now.
pub const SPEAK_DESTINATION: &str = "Speak";

/// Anything that can move the UI to a named destination.
pub trait NavigationTarget: Send + Sync {
    fn navigate(&self, destination: &str);
}

impl<F> NavigationTarget for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, destination: &str) {
        self(destination)
    }
}

struct RegisteredHook(Box<dyn NavigationTarget>);

/// Holds the navigation hook of whichever screen host is active.
///
/// Owned by the layer that owns top-level navigation state; the scheduler only
/// keeps a `Weak` back-reference. Registration and delivery may race during a
/// screen transition, so the hook is swapped atomically. Last writer wins.
#[derive(Default)]
pub struct NavigationContext {
    hook: ArcSwapOption<RegisteredHook>,
}

impl NavigationContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, target: impl NavigationTarget + 'static) {
        self.hook
            .store(Some(Arc::new(RegisteredHook(Box::new(target)))));
        tracing::debug!("navigation hook registered");
    }

    pub fn clear(&self) {
        if self.hook.swap(None).is_some() {
            tracing::debug!("navigation hook cleared");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.hook.load().is_some()
    }

    pub fn navigate(&self, destination: &str) -> Result<()> {
        let guard = self.hook.load_full();
        let Some(hook) = guard else {
            tracing::error!(destination, "navigation requested without a registered hook");
            return Err(ReminderError::HookUnavailable);
        };
        tracing::info!(destination, "navigating");
        hook.0.navigate(destination);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn unset_hook_reports_unavailable() {
        let context = NavigationContext::new();
        assert!(!context.is_registered());
        assert!(matches!(
            context.navigate(SPEAK_DESTINATION),
            Err(ReminderError::HookUnavailable)
        ));
    }

    #[test]
    fn last_registration_wins() {
        let context = NavigationContext::new();
        let visits = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&visits);
        context.register(move |dest: &str| first.lock().push(format!("first:{dest}")));
        let second = Arc::clone(&visits);
        context.register(move |dest: &str| second.lock().push(format!("second:{dest}")));

        context.navigate(SPEAK_DESTINATION).unwrap();
        assert_eq!(*visits.lock(), vec!["second:Speak".to_string()]);

        context.clear();
        assert!(context.navigate(SPEAK_DESTINATION).is_err());
    }
}
