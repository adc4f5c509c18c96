//! Roll notification.
//!
//! The sheet can forward finished rolls to an external channel, a
//! Discord webhook in practice. Delivery is fire and forget: the
//! sheet never waits on or reacts to the outcome, and a failed post
//! only produces a log line.

use serde_json::json;
use tracing::warn;

use crate::model::RollEntry;

/// Sink for roll results. Implementations must not block the caller.
pub trait RollNotifier: Send + Sync {
    fn deliver(&self, entry: &RollEntry);
}

/// Posts rolls to a Discord webhook URL.
///
/// Delivery happens on a spawned task, so a Tokio runtime must be
/// running; without one the entry is dropped with a warning.
pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Read the webhook URL from the DISCORD_WEBHOOK_URL environment
    /// variable.
    pub fn from_env() -> Option<Self> {
        std::env::var("DISCORD_WEBHOOK_URL").ok().map(Self::new)
    }

    /// The message posted for a roll.
    fn format_entry(entry: &RollEntry) -> String {
        format!(
            "**{}**: {} ({})\n{}",
            entry.label, entry.result, entry.dice_type, entry.details
        )
    }
}

impl RollNotifier for DiscordWebhook {
    fn deliver(&self, entry: &RollEntry) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("no async runtime available, dropping roll notification");
                return;
            }
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let content = Self::format_entry(entry);
        handle.spawn(async move {
            let payload = json!({ "content": content });
            match client.post(&url).json(&payload).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "webhook rejected roll notification");
                }
                Ok(_) => {}
                Err(error) => {
                    warn!("failed to deliver roll notification: {error}");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entry() {
        let entry = RollEntry::new("Fireball", 24, "(6 + 5 + 4 + 3) + 6", "d6", true);

        let message = DiscordWebhook::format_entry(&entry);
        assert!(message.starts_with("**Fireball**: 24 (d6)"));
        assert!(message.ends_with("(6 + 5 + 4 + 3) + 6"));
    }
}
