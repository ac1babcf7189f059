//! Client configuration.
//!
//! The base URL is the only required setting and has no default. Leaving it
//! unset is not an error at construction time: every operation checks it
//! before attempting a request and fails with `ApiError::Config`.

use std::env;

/// Environment variable holding the API base URL.
pub const ENDPOINT_VAR: &str = "ITEMS_API_ENDPOINT";

/// Environment variable enabling the strict delete acknowledgment check.
pub const DELETE_ACK_VAR: &str = "ITEMS_DELETE_ACK";

/// How a non-204 successful DELETE response is judged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteAckPolicy {
    /// Any 2xx status is success; the body is ignored.
    #[default]
    StatusOnly,
    /// A `message` field in the body, when present, must equal this text.
    Message(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub delete_ack: DeleteAckPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            delete_ack: DeleteAckPolicy::StatusOnly,
        }
    }

    /// A configuration with no base URL. Every call made with it fails.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn with_delete_ack(mut self, message: impl Into<String>) -> Self {
        self.delete_ack = DeleteAckPolicy::Message(message.into());
        self
    }

    /// Read `ITEMS_API_ENDPOINT` and `ITEMS_DELETE_ACK`. Blank values count
    /// as unset.
    pub fn from_env() -> Self {
        let base_url = non_blank(env::var(ENDPOINT_VAR).ok());
        let delete_ack = match non_blank(env::var(DELETE_ACK_VAR).ok()) {
            Some(message) => DeleteAckPolicy::Message(message),
            None => DeleteAckPolicy::StatusOnly,
        };
        tracing::debug!(configured = base_url.is_some(), "loaded client config from environment");
        Self {
            base_url,
            delete_ack,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
