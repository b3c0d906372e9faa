//! Transport abstraction for getting a reply

use async_trait::async_trait;
use hookchat_core::{Message, WebhookClient, WebhookRequest, flatten_context};

/// Sends one user message and resolves to a displayable reply.
///
/// Implementations must not fail: every outcome, including network and HTTP
/// errors, is reported as a string the user can read.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `user_text` with the already-truncated `recent_history` as context.
    async fn send_message(&self, user_text: &str, recent_history: &[Message]) -> String;
}

/// Transport that posts to the configured webhook
pub struct WebhookTransport {
    client: WebhookClient,
}

impl WebhookTransport {
    /// Create a new webhook transport
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }

    /// Create from a URL
    pub fn with_endpoint(endpoint: &str) -> hookchat_core::Result<Self> {
        Ok(Self::new(WebhookClient::new(endpoint)?))
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send_message(&self, user_text: &str, recent_history: &[Message]) -> String {
        let request = WebhookRequest {
            requirements: user_text.to_string(),
            context: flatten_context(recent_history),
        };

        match self.client.post(&request).await {
            Ok(payload) => payload.into_reply(),
            Err(e) => {
                if e.is_status() {
                    tracing::warn!("Webhook rejected request: {}", e);
                } else {
                    tracing::warn!("Webhook unreachable at {}: {}", self.client.endpoint(), e);
                }
                e.diagnostic()
            }
        }
    }
}
