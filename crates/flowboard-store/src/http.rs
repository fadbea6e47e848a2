//! Reqwest-based HTTP graph store.

use std::sync::Arc;

use flowboard_graph::GraphDocument;
use reqwest::Client;

use crate::payload::{GraphEnvelope, GraphEnvelopeRef};
use crate::{GraphStore, SaveReceipt, StoreConfig, StoreError, StoreResult, TRACING_TARGET};

struct HttpGraphStoreInner {
    http: Client,
    config: StoreConfig,
}

/// HTTP implementation of [`GraphStore`].
///
/// Loads with `GET <endpoint>` and saves with `POST <endpoint>`, both
/// carrying the full document in a [`GraphEnvelope`]. Cheap to clone;
/// clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpGraphStore {
    inner: Arc<HttpGraphStoreInner>,
}

impl std::fmt::Debug for HttpGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGraphStore")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl HttpGraphStore {
    /// Creates a store client with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %config.endpoint,
            timeout_ms = timeout.as_millis(),
            "creating graph store client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(HttpGraphStoreInner { http, config }),
        }
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    fn http(&self) -> &Client {
        &self.inner.http
    }
}

#[async_trait::async_trait]
impl GraphStore for HttpGraphStore {
    async fn load(&self) -> StoreResult<GraphDocument> {
        let endpoint = self.config().endpoint.clone();
        tracing::debug!(target: TRACING_TARGET, endpoint = %endpoint, "loading graph");

        let response = self.http().get(endpoint).send().await.map_err(StoreError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            });
        }

        // Decoding also validates referential integrity; a dangling
        // edge fails the whole load, never a partial document.
        let envelope: GraphEnvelope = response.json().await.map_err(StoreError::from)?;

        tracing::debug!(
            target: TRACING_TARGET,
            nodes = envelope.data.node_count(),
            edges = envelope.data.edge_count(),
            "graph loaded"
        );
        Ok(envelope.data)
    }

    async fn save(&self, document: &GraphDocument) -> StoreResult<SaveReceipt> {
        let endpoint = self.config().endpoint.clone();
        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            nodes = document.node_count(),
            edges = document.edge_count(),
            "saving graph"
        );

        let response = self
            .http()
            .post(endpoint)
            .json(&GraphEnvelopeRef { data: document })
            .send()
            .await
            .map_err(StoreError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            });
        }

        let receipt = SaveReceipt::new(status.as_u16());
        tracing::debug!(
            target: TRACING_TARGET,
            status = receipt.status,
            "graph saved"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[test]
    fn test_client_creation() {
        let config = StoreConfig::new(Url::parse("https://api.example.com/api/graph").unwrap());
        let store = HttpGraphStore::new(config);
        assert_eq!(store.config().http_timeout, 30);
    }

    #[test]
    fn test_debug_omits_pool_internals() {
        let config = StoreConfig::new(Url::parse("https://api.example.com/api/graph").unwrap());
        let store = HttpGraphStore::new(config);
        let rendered = format!("{store:?}");
        assert!(rendered.contains("HttpGraphStore"));
        assert!(rendered.contains("api.example.com"));
    }
}
