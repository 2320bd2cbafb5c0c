use std::io::{self, BufRead, Write};
use std::thread;

use reminder_core::prompt::{CallPrompt, ChoicePrompt, Notice, ReminderChoice};

/// Presents the reminder prompt on stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalPrompt {
    snooze_minutes: u32,
}

impl TerminalPrompt {
    pub fn new(snooze_minutes: u32) -> Self {
        Self { snooze_minutes }
    }
}

impl ChoicePrompt for TerminalPrompt {
    fn choose(&self, prompt: &CallPrompt) -> ReminderChoice {
        if !prompt.delay.is_zero() {
            thread::sleep(prompt.delay);
        }
        println!("\n{}\n{}", prompt.title, prompt.message);
        println!("  [1] Talk now");
        println!("  [2] In {} minutes", self.snooze_minutes);
        println!("  [3] Skip");
        print!("> ");
        if let Err(err) = io::stdout().flush() {
            tracing::debug!(%err, "unable to flush prompt");
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => parse_choice(&line),
            Err(err) => {
                tracing::warn!(%err, "unable to read prompt answer");
                ReminderChoice::Dismiss
            }
        }
    }

    fn notify(&self, notice: &Notice) {
        println!("{}", notice.message());
    }
}

fn parse_choice(line: &str) -> ReminderChoice {
    match line.trim() {
        "1" => ReminderChoice::NavigateNow,
        "2" => ReminderChoice::Snooze,
        _ => ReminderChoice::Dismiss,
    }
}
