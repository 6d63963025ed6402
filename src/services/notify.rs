use reqwest::Client;
use serde_json::json;

/// Operational chat-webhook messages (window opened/closed, failures).
/// Fire-and-forget: callers drop the result after the primary state
/// transition succeeded; delivery problems are logged here.
pub struct NotificationService {
    client: Client,
    webhook_url: Option<String>,
}

impl NotificationService {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    pub async fn send_operational_message(
        &self,
        title: &str,
        body: &str,
        is_error: bool,
    ) -> anyhow::Result<()> {
        let url = match &self.webhook_url {
            Some(u) => u,
            None => {
                tracing::debug!("Ops webhook not configured, skipping message");
                return Ok(());
            }
        };

        let payload = json!({
            "title": title,
            "body": body,
            "level": if is_error { "error" } else { "info" },
        });

        let response = self.client.post(url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Ops webhook error {}: {}", status, text);
        }

        Ok(())
    }
}
