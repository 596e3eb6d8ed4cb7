use std::io::{self, BufRead, Write};

use storefront_app::{
    notifications::{NotificationLevel, NotificationQueue},
    stores::Confirm,
};

/// Asks on the terminal. Anything but `y`/`yes` declines.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr();

        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();

        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub(crate) fn print_notifications(queue: &NotificationQueue) {
    for notification in queue.drain() {
        let label = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "note",
            NotificationLevel::Error => "error",
        };

        eprintln!("[{label}] {}", notification.message);
    }
}
