//! Notification transports for expired watchdog alerts.

use async_trait::async_trait;
use deadman::WatchedAlert;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;

/// Bound on a single transport call, so a stalled transport cannot hold
/// a dispatch task indefinitely.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

const SLACK_API_BASE: &str = "https://slack.com/api";
const PAGERDUTY_EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";

/// Notifier error types
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Slack channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Failed to format alert as JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Notification transport trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an expiry notification for a lost alert
    async fn notify(&self, watched: &WatchedAlert) -> Result<(), NotifyError>;

    /// Get the name of this transport
    fn name(&self) -> &'static str;
}

/// Build the configured transports.
///
/// A transport with no credential configured is skipped; a configured
/// transport that cannot initialize is an error, since it would
/// otherwise silently fail forever.
pub async fn build_notifiers(config: &Config) -> Result<Vec<Arc<dyn Notifier>>, NotifyError> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(token) = &config.slack_token {
        notifiers.push(Arc::new(
            SlackNotifier::connect(token, &config.slack_channel).await?,
        ));
    }
    if let Some(service_key) = &config.pagerduty_token {
        notifiers.push(Arc::new(PagerdutyNotifier::new(service_key)?));
        info!("Pagerduty notifier initialized");
    }

    if notifiers.is_empty() {
        warn!("No notifier transports configured, expired alerts will only be logged");
    }

    Ok(notifiers)
}

/// Slack chat-message transport.
pub struct SlackNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel_id: String,
}

impl SlackNotifier {
    /// Authenticate and resolve the target channel, failing fast on a bad
    /// token or unknown channel.
    pub async fn connect(token: &str, channel: &str) -> Result<Self, NotifyError> {
        Self::connect_to(SLACK_API_BASE, token, channel).await
    }

    /// Connect against an explicit API base URL (test seam).
    pub async fn connect_to(
        api_base: &str,
        token: &str,
        channel: &str,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(NOTIFY_TIMEOUT).build()?;

        let auth: serde_json::Value = client
            .post(format!("{api_base}/auth.test"))
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        if !auth["ok"].as_bool().unwrap_or(false) {
            return Err(NotifyError::Api(format!(
                "auth.test failed: {}",
                auth["error"].as_str().unwrap_or("unknown")
            )));
        }

        let channel_id = Self::resolve_channel(&client, api_base, token, channel).await?;
        info!(channel = %channel, channel_id = %channel_id, "Slack notifier initialized");

        Ok(Self {
            client,
            api_base: api_base.to_string(),
            token: token.to_string(),
            channel_id,
        })
    }

    /// Resolve a channel name to its ID, matching case-insensitively.
    async fn resolve_channel(
        client: &reqwest::Client,
        api_base: &str,
        token: &str,
        channel: &str,
    ) -> Result<String, NotifyError> {
        // TODO: page through conversations.list with response_metadata.next_cursor
        let list: serde_json::Value = client
            .get(format!("{api_base}/conversations.list"))
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        if !list["ok"].as_bool().unwrap_or(false) {
            return Err(NotifyError::Api(format!(
                "conversations.list failed: {}",
                list["error"].as_str().unwrap_or("unknown")
            )));
        }

        list["channels"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|entry| {
                entry["name"]
                    .as_str()
                    .is_some_and(|name| name.eq_ignore_ascii_case(channel))
            })
            .and_then(|entry| entry["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| NotifyError::ChannelNotFound(channel.to_string()))
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, watched: &WatchedAlert) -> Result<(), NotifyError> {
        let alert = &watched.alert;
        let pretty = serde_json::to_string_pretty(alert)?;
        let labels: String = alert
            .labels
            .iter()
            .map(|(name, value)| format!("- {name} = {value}\n"))
            .collect();

        let body = json!({
            "channel": self.channel_id,
            "icon_emoji": ":skull:",
            "blocks": [
                {
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": ":skull: *This is an alert !* :skull: \nA watchdog alert has not been refreshed for too long.\nPlease check monitoring stack status."
                    }
                },
                {
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": format!("*Lost watchdog labels:*\n```{labels}```")
                    }
                }
            ],
            "attachments": [
                {
                    "title": "Lost alert full description",
                    "text": format!("```{pretty}```"),
                    "color": "#a10606"
                }
            ]
        });

        let response: serde_json::Value = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        if !response["ok"].as_bool().unwrap_or(false) {
            return Err(NotifyError::Api(format!(
                "chat.postMessage failed: {}",
                response["error"].as_str().unwrap_or("unknown")
            )));
        }

        debug!(fingerprint = %alert.fingerprint, "Sent Slack notification");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}

/// PagerDuty incident-paging transport (generic events API).
pub struct PagerdutyNotifier {
    client: reqwest::Client,
    events_url: String,
    service_key: String,
}

impl PagerdutyNotifier {
    /// Create a new PagerDuty notifier.
    ///
    /// The service-key events API needs no startup session, so this only
    /// builds the HTTP client.
    pub fn new(service_key: &str) -> Result<Self, NotifyError> {
        Self::with_events_url(PAGERDUTY_EVENTS_URL, service_key)
    }

    /// Create a notifier against an explicit events URL (test seam).
    pub fn with_events_url(events_url: &str, service_key: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(NOTIFY_TIMEOUT).build()?;
        Ok(Self {
            client,
            events_url: events_url.to_string(),
            service_key: service_key.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for PagerdutyNotifier {
    async fn notify(&self, watched: &WatchedAlert) -> Result<(), NotifyError> {
        let alert = &watched.alert;
        let pretty = serde_json::to_string_pretty(alert)?;
        let labels: String = alert
            .labels
            .iter()
            .map(|(name, value)| format!("{name} = {value}\n"))
            .collect();
        let details =
            format!("A MONITORED WATCHDOG ALERT IS MISSING !\n\nAlert labels:\n{labels}\n{pretty}");

        let body = json!({
            "service_key": self.service_key,
            "event_type": "trigger",
            "description": "Watchdog monitored alert is missing for too long",
            "details": details
        });

        let response = self.client.post(&self.events_url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Api(format!(
                "create_event returned {}",
                response.status()
            )));
        }

        debug!(fingerprint = %alert.fingerprint, "Sent Pagerduty event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pagerduty"
    }
}

/// Dispatcher fans evicted alerts out to every configured transport.
///
/// Each (alert, transport) attempt runs as its own task and is
/// best-effort: a failure is logged and dropped, with no retry, no
/// registry reinsertion and no effect on sibling attempts.
pub struct Dispatcher {
    evicted_rx: mpsc::Receiver<WatchedAlert>,
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(evicted_rx: mpsc::Receiver<WatchedAlert>, notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self {
            evicted_rx,
            notifiers,
        }
    }

    /// Run the dispatch loop until the sweeper side closes.
    pub async fn run(mut self) {
        info!(transports = self.notifiers.len(), "Dispatcher task started");

        while let Some(watched) = self.evicted_rx.recv().await {
            let watched = Arc::new(watched);
            for notifier in &self.notifiers {
                let notifier = notifier.clone();
                let watched = watched.clone();
                tokio::spawn(async move {
                    if let Err(e) = notifier.notify(&watched).await {
                        warn!(
                            transport = notifier.name(),
                            fingerprint = %watched.alert.fingerprint,
                            error = %e,
                            "Failed to send expiry notification"
                        );
                    }
                });
            }
        }

        info!("Dispatcher task stopped");
    }
}
