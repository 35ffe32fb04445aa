//! Fetch collaborator
//!
//! Request/response access to the backend under the `/messages` namespace:
//! peer roster + unseen snapshot, per-conversation history, message send,
//! and the fire-and-forget seen acknowledgment.
//!
//! The [`FetchService`] trait is the seam the session depends on;
//! [`HttpFetch`] is the concrete hyper-based adapter.

use crate::config::ClientConfig;
use crate::protocol::{
    HistoryResponse, Message, MessageBody, Peer, SendResponse, UsersResponse,
};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Directory snapshot returned by the users endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    /// Peer roster
    pub peers: Vec<Peer>,
    /// Unseen counts keyed by peer id
    pub unseen: HashMap<String, u32>,
}

/// Request/response operations the session consumes
#[async_trait]
pub trait FetchService: Send + Sync {
    /// Fetch the peer roster and unseen-count snapshot
    async fn users(&self) -> Result<DirectorySnapshot>;

    /// Fetch ordered message history for a conversation
    async fn history(&self, peer_id: &str) -> Result<Vec<Message>>;

    /// Submit a message to a conversation, returning the stored message
    /// with its server-assigned id
    async fn send(&self, peer_id: &str, body: &MessageBody) -> Result<Message>;

    /// Acknowledge that a message has been observed by the operator
    async fn mark_seen(&self, message_id: &str) -> Result<()>;
}

/// HTTP adapter for the fetch collaborator
#[derive(Clone)]
pub struct HttpFetch {
    /// Backend address (e.g., "127.0.0.1:4000")
    server_addr: String,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client for issuing requests
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpFetch {
    /// Create a fetch adapter from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build_http();
        Self {
            server_addr: config.server_addr.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
            client,
        }
    }

    /// Issue one request and decode the JSON response body
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let url = format!("http://{}{}", self.server_addr, path);

        let req = Request::builder()
            .method(method)
            .uri(&url)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| Error::Transport(format!("Failed to build request: {}", e)))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| Error::Transport(format!("Request to {} timed out", url)))?
            .map_err(|e| Error::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {} failed with status {}", url, status);
            return Err(Error::Transport(format!(
                "Request failed with status {}",
                status
            )));
        }

        let bytes = response
            .collect()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl FetchService for HttpFetch {
    async fn users(&self) -> Result<DirectorySnapshot> {
        let response: UsersResponse = self
            .request_json(Method::GET, "/messages/users", None)
            .await?;

        if !response.success {
            return Err(Error::Rejected(
                response.message.unwrap_or_else(|| "users request rejected".to_string()),
            ));
        }

        info!("Fetched {} peers from directory", response.users.len());
        Ok(DirectorySnapshot {
            peers: response.users,
            unseen: response.unseen_messages,
        })
    }

    async fn history(&self, peer_id: &str) -> Result<Vec<Message>> {
        let response: HistoryResponse = self
            .request_json(Method::GET, &format!("/messages/{}", peer_id), None)
            .await?;

        if !response.success {
            return Err(Error::Rejected(
                response.message.unwrap_or_else(|| "history request rejected".to_string()),
            ));
        }

        info!("Fetched {} messages for {}", response.messages.len(), peer_id);
        Ok(response.messages)
    }

    async fn send(&self, peer_id: &str, body: &MessageBody) -> Result<Message> {
        let payload = serde_json::to_vec(body)?;
        let response: SendResponse = self
            .request_json(Method::POST, &format!("/messages/send/{}", peer_id), Some(payload))
            .await?;

        if !response.success {
            return Err(Error::Rejected(
                response.message.unwrap_or_else(|| "send rejected".to_string()),
            ));
        }

        response.new_message.ok_or_else(|| {
            Error::Transport("Send response carried no stored message".to_string())
        })
    }

    async fn mark_seen(&self, message_id: &str) -> Result<()> {
        // Acknowledgment body is empty; only the status matters.
        let _: serde_json::Value = self
            .request_json(Method::PUT, &format!("/messages/mark/{}", message_id), None)
            .await?;
        Ok(())
    }
}
