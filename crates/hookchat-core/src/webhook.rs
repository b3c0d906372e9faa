//! HTTP client for the chat webhook

use crate::{
    error::{EMPTY_RESPONSE_MESSAGE, Error, Result},
    extract::extract_reply,
};
use serde::{Deserialize, Serialize};

/// Environment variable holding the webhook URL
pub const WEBHOOK_URL_ENV: &str = "HOOKCHAT_WEBHOOK_URL";

/// Body of the outbound POST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRequest {
    /// The user's message, trimmed
    pub requirements: String,
    /// Flattened recent history
    pub context: String,
}

/// A decoded response body. Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Blank body on a successful status
    Empty,
    /// Body parsed as JSON (any shape)
    Json(serde_json::Value),
    /// Body that is not JSON, trimmed
    Text(String),
}

impl RawPayload {
    /// Classify a response body
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return RawPayload::Empty;
        }
        match serde_json::from_str(body) {
            Ok(value) => RawPayload::Json(value),
            Err(_) => RawPayload::Text(body.trim().to_string()),
        }
    }

    /// Reduce the payload to the string shown as the assistant's reply
    pub fn into_reply(self) -> String {
        match self {
            RawPayload::Empty => EMPTY_RESPONSE_MESSAGE.to_string(),
            RawPayload::Json(value) => extract_reply(&value),
            RawPayload::Text(text) => text,
        }
    }
}

/// Client for a single, preconfigured webhook endpoint
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl WebhookClient {
    /// Create a client for `endpoint`. Only http and https URLs are accepted.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint.trim())
            .map_err(|e| Error::InvalidConfig(format!("webhook URL '{}': {}", endpoint, e)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "webhook URL must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    /// Issue one POST and classify the body. No retries.
    pub async fn post(&self, request: &WebhookRequest) -> Result<RawPayload> {
        tracing::debug!(
            endpoint = %self.endpoint,
            context_len = request.context.len(),
            "posting to webhook"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let payload = RawPayload::from_body(&body);
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "webhook responded");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the request body.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}/webhook", addr), handle)
    }

    /// Read headers plus a Content-Length body, return the body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return String::from_utf8_lossy(&buf[header_end + 4..]).into_owned();
                }
            }
        }
        String::new()
    }

    #[test]
    fn test_from_body_classification() {
        assert_eq!(RawPayload::from_body(""), RawPayload::Empty);
        assert_eq!(RawPayload::from_body(" \n\t"), RawPayload::Empty);
        assert_eq!(
            RawPayload::from_body(r#"{"reply":"hi"}"#),
            RawPayload::Json(json!({"reply": "hi"}))
        );
        assert_eq!(
            RawPayload::from_body("  plain text reply \n"),
            RawPayload::Text("plain text reply".into())
        );
    }

    #[test]
    fn test_json_string_body_is_json() {
        assert_eq!(
            RawPayload::from_body(r#""quoted""#),
            RawPayload::Json(json!("quoted"))
        );
    }

    #[test]
    fn test_into_reply() {
        assert_eq!(RawPayload::Empty.into_reply(), EMPTY_RESPONSE_MESSAGE);
        assert_eq!(
            RawPayload::Json(json!({"output": {"text": "Hello!"}})).into_reply(),
            "Hello!"
        );
        assert_eq!(RawPayload::Text("as is".into()).into_reply(), "as is");
    }

    #[test]
    fn test_json_blank_string_body_reply_is_quoted() {
        let reply = RawPayload::from_body(r#""""#).into_reply();
        assert!(!reply.is_empty());
        assert_eq!(reply, r#""""#);

        let reply = RawPayload::from_body(r#""   ""#).into_reply();
        assert_eq!(reply, r#""   ""#);
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            WebhookClient::new("not a url"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            WebhookClient::new("ftp://example.com/hook"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(WebhookClient::new("https://example.com/webhook/abc").is_ok());
    }

    #[test]
    fn test_request_serializes_expected_fields() {
        let request = WebhookRequest {
            requirements: "Need a site".into(),
            context: "assistant: Hello".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"requirements": "Need a site", "context": "assistant: Hello"})
        );
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (url, server) = serve_once("200 OK", r#"{"reply":"ok"}"#).await;
        let client = WebhookClient::new(&url).unwrap();
        let request = WebhookRequest {
            requirements: "hello".into(),
            context: "".into(),
        };

        let payload = client.post(&request).await.unwrap();
        assert_eq!(payload, RawPayload::Json(json!({"reply": "ok"})));

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent, json!({"requirements": "hello", "context": ""}));
    }

    #[tokio::test]
    async fn test_post_non_success_status() {
        let (url, _server) = serve_once("500 Internal Server Error", "").await;
        let client = WebhookClient::new(&url).unwrap();
        let request = WebhookRequest {
            requirements: "hello".into(),
            context: "".into(),
        };

        let err = client.post(&request).await.unwrap_err();
        assert!(matches!(err, Error::Status(500)));
    }

    #[tokio::test]
    async fn test_post_empty_body() {
        let (url, _server) = serve_once("200 OK", "").await;
        let client = WebhookClient::new(&url).unwrap();
        let request = WebhookRequest {
            requirements: "hello".into(),
            context: "".into(),
        };

        assert_eq!(client.post(&request).await.unwrap(), RawPayload::Empty);
    }

    #[tokio::test]
    async fn test_post_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WebhookClient::new(&format!("http://{}/webhook", addr)).unwrap();
        let request = WebhookRequest {
            requirements: "hello".into(),
            context: "".into(),
        };

        let err = client.post(&request).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
