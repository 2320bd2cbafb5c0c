use thiserror::Error;

pub type Result<T, E = ReminderError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReminderError {
    /// Rejected before anything was handed to the delivery service.
    #[error("invalid reminder input `{input}`: {reason}")]
    Validation { input: String, reason: String },

    #[error("no navigation hook is registered")]
    HookUnavailable,

    #[error("no future occurrence exists for {time}")]
    Unschedulable { time: String },

    #[error("delivery service rejected {operation}")]
    Delivery {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ReminderError {
    pub(crate) fn validation(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn delivery(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Delivery { operation, source }
    }
}
