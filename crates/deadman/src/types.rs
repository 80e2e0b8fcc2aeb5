//! Wire types for the Alertmanager webhook payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Batch status value that allows a webhook to be applied to the registry.
pub const STATUS_FIRING: &str = "firing";

/// Label or annotation map.
///
/// A `BTreeMap` keeps iteration sorted by label name, which the
/// notification formatting relies on.
pub type LabelSet = BTreeMap<String, String>;

/// A single alert entry from an Alertmanager webhook payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub status: String,
    pub labels: LabelSet,
    pub annotations: LabelSet,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,

    /// Opaque stable key identifying one logical heartbeat source.
    pub fingerprint: String,
}

/// Top-level Alertmanager webhook message.
///
/// Unknown fields are ignored and absent fields take their defaults, so
/// payloads from different Alertmanager versions parse uniformly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookMessage {
    pub receiver: String,

    /// Batch-level status shared by all contained alerts.
    pub status: String,
    pub alerts: Vec<Alert>,
    pub group_labels: LabelSet,
    pub common_labels: LabelSet,
    pub common_annotations: LabelSet,
    #[serde(rename = "externalURL")]
    pub external_url: String,
}
