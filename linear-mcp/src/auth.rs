//! Session establishment.
//!
//! A [`SessionProvider`] verifies that credentials are available and hands
//! out a request-capable [`Transport`]. Credential storage is not handled
//! here: the API key comes from configuration or the environment.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::LinearConfig;
use crate::error::{LinearError, LinearResult};
use crate::transport::{GraphqlTransport, Transport};

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Verify the current session and return a transport bound to it.
    async fn session(&self) -> LinearResult<Arc<dyn Transport>>;
}

/// Session backed by a personal API key.
pub struct ApiKeySession {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ApiKeySession {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            timeout,
        }
    }

    pub fn from_config(config: &LinearConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.resolve_api_key(),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl SessionProvider for ApiKeySession {
    async fn session(&self) -> LinearResult<Arc<dyn Transport>> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LinearError::Auth("no API key configured".to_string()))?;

        let transport = GraphqlTransport::new(&self.endpoint, api_key, self.timeout)
            .map_err(|e| LinearError::Auth(e.to_string()))?;
        Ok(Arc::new(transport))
    }
}

/// Provider that always returns the same transport. Used when the transport
/// is built up front (and by tests with a mock transport).
pub struct StaticSession {
    transport: Arc<dyn Transport>,
}

impl StaticSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn session(&self) -> LinearResult<Arc<dyn Transport>> {
        Ok(self.transport.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_an_auth_error() {
        let session = ApiKeySession::new("http://localhost/graphql", None, Duration::from_secs(1));
        let err = session.session().await.err().unwrap();
        assert!(matches!(err, LinearError::Auth(_)));
    }

    #[tokio::test]
    async fn blank_key_is_an_auth_error() {
        let session = ApiKeySession::new(
            "http://localhost/graphql",
            Some("  ".to_string()),
            Duration::from_secs(1),
        );
        assert!(session.session().await.is_err());
    }

    #[tokio::test]
    async fn present_key_yields_a_transport() {
        let session = ApiKeySession::new(
            "http://localhost/graphql",
            Some("lin_api_test".to_string()),
            Duration::from_secs(1),
        );
        assert!(session.session().await.is_ok());
    }
}
