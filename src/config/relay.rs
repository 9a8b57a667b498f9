//! Relay configuration structures.
//!
//! Every section has serde defaults, so `{}` is a valid (in-memory, dev)
//! configuration. Secrets are never stored here; only the names of the
//! environment variables that hold them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::notify::{DEFAULT_ACTIVATION_PROBABILITY, DEFAULT_MESSAGES, DEFAULT_TITLE};

/// Shared-store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory map for development/testing.
    InMemory {
        /// Initial key/value entries.
        #[serde(default)]
        entries: HashMap<String, String>,
    },
    /// JSON file holding a flat object of key → value.
    File {
        /// Path to the shared preferences file.
        path: PathBuf,
    },
}

impl Default for StoreBackendConfig {
    fn default() -> Self {
        Self::InMemory {
            entries: HashMap::new(),
        }
    }
}

/// Recipient-store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum RecipientBackendConfig {
    /// In-memory token set.
    InMemory {
        /// Initial tokens.
        #[serde(default)]
        tokens: Vec<String>,
    },
    /// JSON-lines file of `{"token": "..."}` records.
    File {
        /// Path to the JSONL file.
        path: PathBuf,
    },
    /// Firestore collection read over REST.
    Firestore {
        /// Google Cloud project id.
        project_id: String,
        /// Collection holding one document per token.
        #[serde(default = "default_token_collection")]
        collection: String,
        /// Environment variable holding an OAuth access token.
        #[serde(default = "default_access_token_env")]
        access_token_env: String,
    },
}

impl Default for RecipientBackendConfig {
    fn default() -> Self {
        Self::InMemory { tokens: Vec::new() }
    }
}

/// Multicast-sender backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SenderBackendConfig {
    /// Records sends in memory and reports every token delivered.
    #[default]
    InMemory,
    /// Firebase Cloud Messaging HTTP v1.
    Fcm {
        /// Firebase project id.
        project_id: String,
        /// Environment variable holding an OAuth access token.
        #[serde(default = "default_access_token_env")]
        access_token_env: String,
    },
}

/// Snapshot refresh settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Whether the refresher runs.
    pub enabled: bool,
    /// Seconds between refreshes.
    pub refresh_interval_secs: u64,
    /// Wall-clock budget for one store read, in milliseconds.
    pub read_timeout_ms: u64,
    /// Rows the display surface can show.
    pub display_capacity: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval_secs: 15 * 60,
            read_timeout_ms: 5_000,
            display_capacity: 5,
        }
    }
}

impl SnapshotConfig {
    /// Refresh interval as a duration.
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Read timeout as a duration.
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Notification fan-out settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether the scheduler runs.
    pub enabled: bool,
    /// Seconds between ticks.
    pub cadence_secs: u64,
    /// Chance in `[0, 1]` that a tick dispatches.
    pub activation_probability: f64,
    /// Notification title.
    pub title: String,
    /// Message pool.
    pub messages: Vec<String>,
    /// Remove tokens reported dead after a send.
    pub prune_invalid_tokens: bool,
    /// Ticks kept in the in-memory audit trail (0 disables it).
    pub audit_capacity: usize,
    /// Recipient backend.
    pub recipients: RecipientBackendConfig,
    /// Sender backend.
    pub sender: SenderBackendConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cadence_secs: 60 * 60,
            activation_probability: DEFAULT_ACTIVATION_PROBABILITY,
            title: DEFAULT_TITLE.to_string(),
            messages: DEFAULT_MESSAGES.iter().map(|m| (*m).to_string()).collect(),
            prune_invalid_tokens: false,
            audit_capacity: 256,
            recipients: RecipientBackendConfig::default(),
            sender: SenderBackendConfig::default(),
        }
    }
}

impl NotificationConfig {
    /// Cadence as a duration.
    pub const fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_secs)
    }
}

/// Chat-completion proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the HTTP proxy is served.
    pub enabled: bool,
    /// Listen address.
    pub bind: String,
    /// Base URL of an OpenAI-compatible API.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1:8787".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are a concise financial assistant. Give direct, practical \
                            insights about budgeting, spending and saving."
                .to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// Upstream timeout as a duration.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Root relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Shared-store backend.
    pub store: StoreBackendConfig,
    /// Snapshot refresh.
    pub snapshot: SnapshotConfig,
    /// Notification fan-out.
    pub notifications: NotificationConfig,
    /// Chat proxy.
    pub chat: ChatConfig,
}

fn default_token_collection() -> String {
    "fcmTokens".to_string()
}

fn default_access_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

impl SnapshotConfig {
    /// Validate snapshot settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval_secs == 0 {
            return Err("refresh_interval_secs must be greater than 0".into());
        }
        if self.read_timeout_ms == 0 {
            return Err("read_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }
}

impl NotificationConfig {
    /// Validate notification settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.cadence_secs == 0 {
            return Err("cadence_secs must be greater than 0".into());
        }
        if !(0.0..=1.0).contains(&self.activation_probability) {
            return Err("activation_probability must be within [0, 1]".into());
        }
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.messages.is_empty() {
            return Err("messages must not be empty".into());
        }
        match &self.recipients {
            RecipientBackendConfig::File { path } if path.as_os_str().is_empty() => {
                return Err("recipients file path must not be empty".into());
            }
            RecipientBackendConfig::Firestore {
                project_id,
                collection,
                ..
            } => {
                if project_id.trim().is_empty() {
                    return Err("firestore project_id must not be empty".into());
                }
                if collection.trim().is_empty() {
                    return Err("firestore collection must not be empty".into());
                }
            }
            _ => {}
        }
        if let SenderBackendConfig::Fcm { project_id, .. } = &self.sender {
            if project_id.trim().is_empty() {
                return Err("fcm project_id must not be empty".into());
            }
        }
        Ok(())
    }
}

impl ChatConfig {
    /// Validate chat proxy settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("bind `{}` is not a socket address", self.bind));
        }
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".into());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".into());
        }
        Ok(())
    }
}

impl RelayConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        if let StoreBackendConfig::File { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err("store: file path must not be empty".into());
            }
        }
        self.snapshot
            .validate()
            .map_err(|e| format!("snapshot: {e}"))?;
        self.notifications
            .validate()
            .map_err(|e| format!("notifications: {e}"))?;
        self.chat.validate().map_err(|e| format!("chat: {e}"))?;
        Ok(())
    }

    /// Parse relay configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json_str(&text)
    }
}
