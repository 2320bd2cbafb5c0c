pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod navigation;
pub mod notifications;
pub mod prompt;
pub mod schedule;
pub mod service;
pub mod time_of_day;

pub use crate::error::{ReminderError, Result};
pub use crate::service::{ReminderScheduler, ReminderSchedulerBuilder};
