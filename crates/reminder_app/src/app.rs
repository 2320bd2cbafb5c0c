use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use parking_lot::Mutex;
use reminder_core::{
    config::ReminderConfig,
    dispatch::DispatchOutcome,
    memory::MemoryDelivery,
    navigation::NavigationContext,
    notifications::{ArmRequest, InteractionEvent},
    ReminderScheduler,
};
use serde_json::json;
use tracing::{info, warn};

use crate::terminal::TerminalPrompt;

/// Installs daily reminder times into an in-memory delivery service.
#[derive(Parser, Debug)]
#[command(name = "reminder_app", version, about)]
pub struct Cli {
    /// Daily reminder times (`HH:MM`), comma separated or repeated.
    #[arg(env = "REMINDER_TIMES", value_delimiter = ',')]
    pub times: Vec<String>,

    /// Replay a touched delivery of the first slot after installing.
    #[arg(long)]
    pub interact: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) reminder: ReminderConfig,
    pub(crate) times: Vec<String>,
    pub(crate) interact: bool,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            reminder: ReminderConfig::from_env(),
            times: cli
                .times
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
            interact: cli.interact,
        }
    }

    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Self::from_cli)
    }
}

/// Screen the host is currently showing; the navigation hook writes it.
#[derive(Debug)]
struct CurrentScreen(Mutex<String>);

impl Default for CurrentScreen {
    fn default() -> Self {
        Self(Mutex::new("Home".to_string()))
    }
}

impl CurrentScreen {
    fn set(&self, screen: &str) {
        *self.0.lock() = screen.to_string();
    }

    fn get(&self) -> String {
        self.0.lock().clone()
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let delivery = Arc::new(MemoryDelivery::new());
    delivery.set_grant_on_request(true);

    let navigation = NavigationContext::new();
    let screen = Arc::new(CurrentScreen::default());
    let scheduler = ReminderScheduler::builder(
        delivery.clone(),
        Arc::new(TerminalPrompt::new(config.reminder.snooze_minutes)),
    )
    .with_config(config.reminder.clone())
    .with_navigation(&navigation)
    .build()
    .context("failed to set up reminder scheduler")?;

    let host_screen = Arc::clone(&screen);
    scheduler
        .register_navigation_hook(move |destination: &str| host_screen.set(destination))
        .context("navigation context unavailable")?;

    if !scheduler.ensure_permission() {
        warn!("notifications are not permitted; nothing scheduled");
        return Ok(());
    }

    scheduler
        .install_schedule(config.times.as_slice())
        .with_context(|| format!("failed to install schedule {:?}", config.times))?;

    for request in delivery.armed() {
        println!(
            "{:>5}  {}  {:?}",
            request.id,
            request.fire_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            request.repeat
        );
    }

    if !config.interact {
        return Ok(());
    }
    let Some(first) = delivery.armed().into_iter().next() else {
        info!("no reminders installed, nothing to replay");
        return Ok(());
    };

    // A shown-but-untouched delivery must not lead anywhere.
    let passive = platform_callback(&first, false)?;
    scheduler.handle_interaction(&passive)?;

    let mut event = platform_callback(&first, true)?;
    loop {
        match scheduler.handle_interaction(&event) {
            Ok(DispatchOutcome::Snoozed(occurrence)) => {
                println!("snoozed until {}", occurrence.fire_at.format("%H:%M"));
                let Some(next) = delivery.deliver(occurrence.id, true) else {
                    break;
                };
                event = next;
            }
            Ok(outcome) => {
                info!(?outcome, screen = %screen.get(), "reminder handled");
                break;
            }
            Err(err) => {
                warn!(error = %err, "reminder interaction failed");
                break;
            }
        }
    }
    Ok(())
}

/// Encodes the request the way a mobile notification library hands it back.
fn platform_callback(request: &ArmRequest, user_interacted: bool) -> Result<InteractionEvent> {
    let raw = json!({
        "id": request.id,
        "userInteraction": user_interacted,
        "data": request.payload,
    });
    InteractionEvent::from_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind;

    #[test]
    fn positional_times_split_on_commas() {
        let config =
            AppConfig::try_from_args(["reminder_app", "08:00, 12:30", "--interact", "20:00"])
                .unwrap();
        assert_eq!(config.times, vec!["08:00", "12:30", "20:00"]);
        assert!(config.interact);
    }

    #[test]
    fn help_and_unknown_flags_are_not_taken_as_times() {
        let help = AppConfig::try_from_args(["reminder_app", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let unknown = AppConfig::try_from_args(["reminder_app", "--bogus", "08:00"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::UnknownArgument);
    }
}
